//! GraphQL schema over the fixture store.
//!
//! Each object type delegates its relationship fields to [`crate::resolvers`];
//! scalar fields are read straight off the record. Dispatch from
//! `(type, field)` to resolver is generated at compile time by the
//! `#[Object]` derive, there is no lookup by name at request time.

use async_graphql::Context;
use async_graphql::EmptyMutation;
use async_graphql::EmptySubscription;
use async_graphql::ErrorExtensions;
use async_graphql::ID;
use async_graphql::Object;
use async_graphql::Result;
use async_graphql::Schema;
use async_graphql::extensions::Tracing;

use crate::configuration::Configuration;
use crate::error::ResolveError;
use crate::model::Comment;
use crate::model::Post;
use crate::model::User;
use crate::resolvers;
use crate::resolvers::ResolverKey;
use crate::store::FixtureStore;

/// The executable schema served over HTTP.
pub type BlogSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Build the schema, handing it ownership of the store.
pub fn build_schema(store: FixtureStore, configuration: &Configuration) -> BlogSchema {
    let mut builder = Schema::build(Query, EmptyMutation, EmptySubscription)
        .data(store)
        .extension(Tracing);

    if !configuration.graphql().introspection() {
        builder = builder.disable_introspection();
    }
    if let Some(depth) = configuration.limits().max_depth() {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = configuration.limits().max_complexity() {
        builder = builder.limit_complexity(complexity);
    }

    builder.finish()
}

fn store<'a>(ctx: &Context<'a>) -> Result<&'a FixtureStore> {
    ctx.data::<FixtureStore>()
}

fn dangling(field: ResolverKey, target: &'static str, id: impl ToString) -> async_graphql::Error {
    ResolveError::DanglingReference {
        field,
        target,
        id: id.to_string(),
    }
    .extend()
}

/*
  type Query {
    users(query: String): [User!]!
    posts(query: String): [Post!]!
    comments: [Comment!]!
    me: User!
    post: Post!
  }
*/
pub struct Query;

#[Object]
impl Query {
    async fn users(&self, ctx: &Context<'_>, query: Option<String>) -> Result<Vec<User>> {
        let store = store(ctx)?;
        Ok(resolvers::users(store, query.as_deref())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn posts(&self, ctx: &Context<'_>, query: Option<String>) -> Result<Vec<Post>> {
        let store = store(ctx)?;
        Ok(resolvers::posts(store, query.as_deref())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        Ok(resolvers::comments(store(ctx)?).to_vec())
    }

    async fn me(&self) -> User {
        resolvers::me()
    }

    async fn post(&self) -> Post {
        resolvers::post()
    }
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        &self.email
    }

    async fn age(&self) -> Option<i32> {
        self.age
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        Ok(resolvers::user_posts(store(ctx)?, self)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        Ok(resolvers::user_comments(store(ctx)?, self)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[Object]
impl Post {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn body(&self) -> &str {
        &self.body
    }

    async fn published(&self) -> bool {
        self.published
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        resolvers::post_author(store(ctx)?, self)
            .cloned()
            .ok_or_else(|| dangling(ResolverKey::PostAuthor, "User", &self.author))
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        Ok(resolvers::post_comments(store(ctx)?, self)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[Object]
impl Comment {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn text(&self) -> &str {
        &self.text
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        resolvers::comment_author(store(ctx)?, self)
            .cloned()
            .ok_or_else(|| dangling(ResolverKey::CommentAuthor, "User", &self.author))
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<Post> {
        resolvers::comment_post(store(ctx)?, self)
            .cloned()
            .ok_or_else(|| dangling(ResolverKey::CommentPost, "Post", &self.post))
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::Request;
    use async_graphql::Variables;
    use serde_json::json;

    use super::*;

    fn demo_schema() -> BlogSchema {
        build_schema(FixtureStore::demo(), &Configuration::default())
    }

    async fn data(schema: &BlogSchema, query: &str) -> serde_json::Value {
        let response = schema.execute(query).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    #[test]
    fn sdl_declares_every_field() {
        let sdl = demo_schema().sdl();
        for line in [
            "users(query: String): [User!]!",
            "posts(query: String): [Post!]!",
            "comments: [Comment!]!",
            "me: User!",
            "post: Post!",
            "id: ID!",
            "email: String!",
            "age: Int",
            "published: Boolean!",
            "author: User!",
            "text: String!",
        ] {
            assert!(sdl.contains(line), "missing `{line}` in\n{sdl}");
        }
        for type_name in ["type Query", "type User", "type Post", "type Comment"] {
            assert!(sdl.contains(type_name), "missing `{type_name}` in\n{sdl}");
        }
        assert!(!sdl.contains("type Mutation"));
    }

    #[test]
    fn every_resolver_key_is_a_schema_field() {
        let sdl = demo_schema().sdl();
        for key in ResolverKey::ALL {
            let header = format!("type {} {{", key.type_name());
            let start = sdl
                .find(&header)
                .unwrap_or_else(|| panic!("{} is not a type", key.type_name()));
            let body = &sdl[start..];
            let body = &body[..body.find('}').unwrap_or(body.len())];
            assert!(
                body.lines().any(|line| {
                    let line = line.trim();
                    line.starts_with(&format!("{}:", key.field_name()))
                        || line.starts_with(&format!("{}(", key.field_name()))
                }),
                "{key} is not a field"
            );
        }
    }

    #[tokio::test]
    async fn users_filter_by_name() {
        let schema = demo_schema();
        assert_eq!(
            data(&schema, r#"{ users(query: "AK") { id name age } }"#).await,
            json!({ "users": [{ "id": "1", "name": "Akash", "age": 23 }] })
        );
        assert_eq!(
            data(&schema, r#"{ users(query: "") { name } }"#).await,
            json!({ "users": [{ "name": "Akash" }, { "name": "Sarah" }, { "name": "Mike" }] })
        );
    }

    #[tokio::test]
    async fn query_argument_can_come_from_variables() {
        let schema = demo_schema();
        let request = Request::new("query Search($q: String) { posts(query: $q) { id } }")
            .variables(Variables::from_json(json!({ "q": "HELLO" })));
        let response = schema.execute(request).await;
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "posts": [{ "id": "bcd" }] })
        );
    }

    #[tokio::test]
    async fn nested_relationships_resolve() {
        let schema = demo_schema();
        assert_eq!(
            data(
                &schema,
                r#"{ comments { id author { name } post { title author { id } } } }"#
            )
            .await,
            json!({
                "comments": [
                    { "id": "a", "author": { "name": "Akash" }, "post": { "title": "draft post", "author": { "id": "1" } } },
                    { "id": "b", "author": { "name": "Akash" }, "post": { "title": "draft post", "author": { "id": "1" } } },
                    { "id": "c", "author": { "name": "Mike" }, "post": { "title": "one new post", "author": { "id": "1" } } },
                    { "id": "d", "author": { "name": "Sarah" }, "post": { "title": "one new post", "author": { "id": "1" } } }
                ]
            })
        );
    }

    #[tokio::test]
    async fn comments_rejects_arguments() {
        let schema = demo_schema();
        let response = schema.execute(r#"{ comments(query: "a") { id } }"#).await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("query"));
    }

    #[tokio::test]
    async fn dangling_author_is_a_field_error() {
        let store = FixtureStore::builder()
            .post(
                Post::builder()
                    .id("orphan")
                    .title("t")
                    .body("b")
                    .published(true)
                    .author("99")
                    .build(),
            )
            .build();
        let schema = build_schema(store, &Configuration::default());

        let response = schema.execute("{ posts { id author { name } } }").await;
        assert_eq!(response.errors.len(), 1);
        let error = &response.errors[0];
        assert_eq!(
            error.message,
            "cannot return null for non-nullable field Post.author: no User with id '99'"
        );
        assert_eq!(
            serde_json::to_value(&error.extensions).unwrap(),
            json!({ "code": "DANGLING_REFERENCE", "id": "99" })
        );

        // the rest of the store is still served
        assert_eq!(
            data(&schema, "{ posts { id title } }").await,
            json!({ "posts": [{ "id": "orphan", "title": "t" }] })
        );
    }

    #[tokio::test]
    async fn stub_post_has_no_author_in_the_store() {
        let schema = demo_schema();
        assert_eq!(
            data(&schema, "{ me { id name email age posts { id } } }").await,
            json!({ "me": { "id": "123", "name": "Akash", "email": "akash@email", "age": null, "posts": [] } })
        );

        let response = schema.execute("{ post { id author { id } } }").await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("no User with id '123'"));
    }

    #[tokio::test]
    async fn introspection_can_be_disabled() {
        let configuration = Configuration::builder()
            .graphql(
                crate::configuration::GraphQL::builder()
                    .introspection(false)
                    .build(),
            )
            .build();
        let schema = build_schema(FixtureStore::demo(), &configuration);
        let response = schema.execute("{ __schema { queryType { name } } }").await;
        assert!(!response.errors.is_empty());

        let schema = demo_schema();
        assert_eq!(
            data(&schema, "{ __schema { queryType { name } } }").await,
            json!({ "__schema": { "queryType": { "name": "Query" } } })
        );
    }

    #[tokio::test]
    async fn depth_limit_is_enforced() {
        let configuration = Configuration::builder()
            .limits(crate::configuration::Limits::builder().max_depth(2).build())
            .build();
        let schema = build_schema(FixtureStore::demo(), &configuration);

        let response = schema.execute("{ users { posts { id } } }").await;
        assert!(!response.errors.is_empty());

        let response = schema.execute("{ users { id } }").await;
        assert!(response.errors.is_empty());
    }
}
