//! Records served by the graph.
//!
//! Relationships are foreign keys stored on the "many" side only: a [`Post`]
//! knows its author, a [`Comment`] knows its author and post. The reverse
//! directions are derived by the resolvers on demand.

use derive_more::Display;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`User`].
    UserId
);
entity_id!(
    /// Identifier of a [`Post`].
    PostId
);
entity_id!(
    /// Identifier of a [`Comment`].
    CommentId
);

/*
  type User {
    id: ID!
    name: String!
    email: String!
    age: Int
    posts: [Post!]!
    comments: [Comment!]!
  }
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

#[buildstructor::buildstructor]
impl User {
    #[builder]
    pub fn new(id: UserId, name: String, email: String, age: Option<i32>) -> Self {
        Self {
            id,
            name,
            email,
            age,
        }
    }
}

/*
  type Post {
    id: ID!
    title: String!
    body: String!
    published: Boolean!
    author: User!
    comments: [Comment!]!
  }
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub author: UserId,
}

#[buildstructor::buildstructor]
impl Post {
    #[builder]
    pub fn new(id: PostId, title: String, body: String, published: bool, author: UserId) -> Self {
        Self {
            id,
            title,
            body,
            published,
            author,
        }
    }
}

/*
  type Comment {
    id: ID!
    text: String!
    author: User!
    post: Post!
  }
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: UserId,
    pub post: PostId,
}

#[buildstructor::buildstructor]
impl Comment {
    #[builder]
    pub fn new(id: CommentId, text: String, author: UserId, post: PostId) -> Self {
        Self {
            id,
            text,
            author,
            post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_exact_string() {
        assert_eq!(UserId::from("1"), UserId::from("1".to_string()));
        assert_ne!(UserId::from("abc"), UserId::from("ABC"));
        assert_ne!(UserId::from("1"), UserId::from(" 1"));
    }

    #[test]
    fn id_displays_as_its_raw_value() {
        let id = PostId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn builders_fill_optional_fields() {
        let user = User::builder()
            .id("2")
            .name("Sarah")
            .email("Sarah@yahoo.com")
            .build();
        assert_eq!(user.age, None);

        let user = User::builder()
            .id("1")
            .name("Akash")
            .email("akash@gmail.com")
            .age(23)
            .build();
        assert_eq!(user.age, Some(23));
    }
}
