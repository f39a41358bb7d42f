//! Serves a small blog graph of users, posts and comments over GraphQL.
//!
//! The data lives in an immutable [`FixtureStore`] built at startup. The
//! schema in [`schema`] resolves relationship fields by scanning the store
//! through the functions in [`resolvers`].

#![warn(unreachable_pub)]

mod axum_factory;
pub mod configuration;
pub mod error;
mod executable;
pub mod model;
pub mod resolvers;
mod router;
pub mod schema;
pub mod store;

pub use crate::axum_factory::main_router;
pub use crate::configuration::Configuration;
pub use crate::executable::Executable;
pub use crate::executable::main;
pub use crate::router::BlogGraphServer;
pub use crate::router::ListeningServer;
pub use crate::router::ShutdownSource;
pub use crate::schema::BlogSchema;
pub use crate::schema::build_schema;
pub use crate::store::FixtureStore;
