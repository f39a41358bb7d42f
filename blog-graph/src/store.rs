//! In-memory fixture store.
//!
//! The store is a passive holder of three ordered collections. It is built once
//! and handed to the schema, which owns it for the lifetime of the process;
//! there is no way to mutate it afterwards. Filtering and lookups live in
//! [`crate::resolvers`].

use crate::model::Comment;
use crate::model::Post;
use crate::model::User;

/// Users, posts and comments held in process memory.
#[derive(Clone, Debug, Default)]
pub struct FixtureStore {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

#[buildstructor::buildstructor]
impl FixtureStore {
    /// Build a store from caller supplied records.
    ///
    /// Foreign keys are not checked: a post may reference an author that does
    /// not exist, in which case the author resolves to nothing.
    #[builder]
    pub fn new(users: Vec<User>, posts: Vec<Post>, comments: Vec<Comment>) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    /// The demonstration data set served by default.
    pub fn demo() -> Self {
        let users = vec![
            User::builder()
                .id("1")
                .name("Akash")
                .email("akash@gmail.com")
                .age(23)
                .build(),
            User::builder()
                .id("2")
                .name("Sarah")
                .email("Sarah@yahoo.com")
                .build(),
            User::builder()
                .id("3")
                .name("Mike")
                .email("Mike@hotmail.com")
                .build(),
        ];

        let posts = vec![
            Post::builder()
                .id("abc")
                .title("draft post")
                .body("draft post not published")
                .published(false)
                .author("1")
                .build(),
            Post::builder()
                .id("bcd")
                .title("one new post")
                .body("Hello new post")
                .published(true)
                .author("1")
                .build(),
            Post::builder()
                .id("cde")
                .title("one more post")
                .body("no description")
                .published(true)
                .author("2")
                .build(),
        ];

        let comments = vec![
            Comment::builder()
                .id("a")
                .text("First Comment")
                .author("1")
                .post("abc")
                .build(),
            Comment::builder()
                .id("b")
                .text("Second Comment")
                .author("1")
                .post("abc")
                .build(),
            Comment::builder()
                .id("c")
                .text("Third Comment")
                .author("3")
                .post("bcd")
                .build(),
            Comment::builder()
                .id("d")
                .text("Fourth Comment")
                .author("2")
                .post("bcd")
                .build(),
        ];

        Self {
            users,
            posts,
            comments,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}
