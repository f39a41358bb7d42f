//! Field resolution over the fixture store.
//!
//! Every function here is a pure function of its parent record, its arguments
//! and the store. Forward relationships (`Post.author`, `Comment.author`,
//! `Comment.post`) are single lookups by id; reverse relationships
//! (`User.posts`, `User.comments`, `Post.comments`) are recomputed by scanning
//! the referencing collection for a matching foreign key, in store order.
//!
//! Lookups are linear scans. The collections are small and never change, so
//! no index is built.

use derive_more::Display;

use crate::model::Comment;
use crate::model::Post;
use crate::model::PostId;
use crate::model::User;
use crate::model::UserId;
use crate::store::FixtureStore;

/// The fields that have an explicit resolver, keyed by `(type, field)`.
///
/// Fields that are not listed are read directly off the parent record.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum ResolverKey {
    #[display("Query.users")]
    QueryUsers,
    #[display("Query.posts")]
    QueryPosts,
    #[display("Query.comments")]
    QueryComments,
    #[display("Query.me")]
    QueryMe,
    #[display("Query.post")]
    QueryPost,
    #[display("Post.author")]
    PostAuthor,
    #[display("Post.comments")]
    PostComments,
    #[display("User.posts")]
    UserPosts,
    #[display("User.comments")]
    UserComments,
    #[display("Comment.author")]
    CommentAuthor,
    #[display("Comment.post")]
    CommentPost,
}

impl ResolverKey {
    pub const ALL: [ResolverKey; 11] = [
        ResolverKey::QueryUsers,
        ResolverKey::QueryPosts,
        ResolverKey::QueryComments,
        ResolverKey::QueryMe,
        ResolverKey::QueryPost,
        ResolverKey::PostAuthor,
        ResolverKey::PostComments,
        ResolverKey::UserPosts,
        ResolverKey::UserComments,
        ResolverKey::CommentAuthor,
        ResolverKey::CommentPost,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ResolverKey::QueryUsers
            | ResolverKey::QueryPosts
            | ResolverKey::QueryComments
            | ResolverKey::QueryMe
            | ResolverKey::QueryPost => "Query",
            ResolverKey::PostAuthor | ResolverKey::PostComments => "Post",
            ResolverKey::UserPosts | ResolverKey::UserComments => "User",
            ResolverKey::CommentAuthor | ResolverKey::CommentPost => "Comment",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            ResolverKey::QueryUsers => "users",
            ResolverKey::QueryPosts => "posts",
            ResolverKey::QueryComments | ResolverKey::PostComments | ResolverKey::UserComments => {
                "comments"
            }
            ResolverKey::QueryMe => "me",
            ResolverKey::QueryPost | ResolverKey::CommentPost => "post",
            ResolverKey::PostAuthor | ResolverKey::CommentAuthor => "author",
            ResolverKey::UserPosts => "posts",
        }
    }

    #[cfg(test)]
    fn lookup(type_name: &str, field_name: &str) -> Option<ResolverKey> {
        Self::ALL
            .into_iter()
            .find(|key| key.type_name() == type_name && key.field_name() == field_name)
    }
}

/// An absent or empty search is no search at all.
fn search_term(query: Option<&str>) -> Option<String> {
    query
        .filter(|query| !query.is_empty())
        .map(str::to_lowercase)
}

/// `Query.users`: all users, or those whose name contains `query` ignoring case.
pub fn users<'a>(store: &'a FixtureStore, query: Option<&str>) -> Vec<&'a User> {
    let users: Vec<&User> = match search_term(query) {
        None => store.users().iter().collect(),
        Some(term) => store
            .users()
            .iter()
            .filter(|user| user.name.to_lowercase().contains(&term))
            .collect(),
    };
    tracing::debug!(resolver = %ResolverKey::QueryUsers, ?query, matched = users.len());
    users
}

/// `Query.posts`: all posts, or those whose title or body contains `query`
/// ignoring case.
pub fn posts<'a>(store: &'a FixtureStore, query: Option<&str>) -> Vec<&'a Post> {
    let posts: Vec<&Post> = match search_term(query) {
        None => store.posts().iter().collect(),
        Some(term) => store
            .posts()
            .iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&term) || post.body.to_lowercase().contains(&term)
            })
            .collect(),
    };
    tracing::debug!(resolver = %ResolverKey::QueryPosts, ?query, matched = posts.len());
    posts
}

/// `Query.comments`: every comment, unfiltered.
pub fn comments(store: &FixtureStore) -> &[Comment] {
    store.comments()
}

/// `Query.me`: a fixed user that is not part of the store.
pub fn me() -> User {
    User::builder()
        .id("123")
        .name("Akash")
        .email("akash@email")
        .build()
}

/// `Query.post`: a fixed post that is not part of the store.
///
/// Its author is the `me` user, which the store does not contain, so asking
/// for `post { author }` yields a dangling reference.
pub fn post() -> Post {
    Post::builder()
        .id("abc")
        .title("New Post for GraphQL")
        .body("adadsdadsadadsada")
        .published(true)
        .author(me().id)
        .build()
}

fn find_user<'a>(store: &'a FixtureStore, id: &UserId) -> Option<&'a User> {
    store.users().iter().find(|user| &user.id == id)
}

fn find_post<'a>(store: &'a FixtureStore, id: &PostId) -> Option<&'a Post> {
    store.posts().iter().find(|post| &post.id == id)
}

/// `Post.author`
pub fn post_author<'a>(store: &'a FixtureStore, post: &Post) -> Option<&'a User> {
    let author = find_user(store, &post.author);
    if author.is_none() {
        tracing::warn!(
            resolver = %ResolverKey::PostAuthor,
            post = %post.id,
            author = %post.author,
            "dangling author reference"
        );
    }
    author
}

/// `Post.comments`
pub fn post_comments<'a>(store: &'a FixtureStore, post: &Post) -> Vec<&'a Comment> {
    store
        .comments()
        .iter()
        .filter(|comment| comment.post == post.id)
        .collect()
}

/// `User.posts`
pub fn user_posts<'a>(store: &'a FixtureStore, user: &User) -> Vec<&'a Post> {
    store
        .posts()
        .iter()
        .filter(|post| post.author == user.id)
        .collect()
}

/// `User.comments`
pub fn user_comments<'a>(store: &'a FixtureStore, user: &User) -> Vec<&'a Comment> {
    store
        .comments()
        .iter()
        .filter(|comment| comment.author == user.id)
        .collect()
}

/// `Comment.author`
pub fn comment_author<'a>(store: &'a FixtureStore, comment: &Comment) -> Option<&'a User> {
    let author = find_user(store, &comment.author);
    if author.is_none() {
        tracing::warn!(
            resolver = %ResolverKey::CommentAuthor,
            comment = %comment.id,
            author = %comment.author,
            "dangling author reference"
        );
    }
    author
}

/// `Comment.post`
pub fn comment_post<'a>(store: &'a FixtureStore, comment: &Comment) -> Option<&'a Post> {
    let post = find_post(store, &comment.post);
    if post.is_none() {
        tracing::warn!(
            resolver = %ResolverKey::CommentPost,
            comment = %comment.id,
            post = %comment.post,
            "dangling post reference"
        );
    }
    post
}
