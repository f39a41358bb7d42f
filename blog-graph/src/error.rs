//! Server errors.
use async_graphql::ErrorExtensions;
use displaydoc::Display;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;
use crate::resolvers::ResolverKey;

/// Errors raised while resolving a field.
///
/// These are not returned to the client as is, but converted into GraphQL
/// errors carrying an `extensions.code`.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// cannot return null for non-nullable field {field}: no {target} with id '{id}'
    DanglingReference {
        /// The relationship field being resolved.
        field: ResolverKey,
        /// The type the foreign key points at.
        target: &'static str,
        /// The foreign key that matched nothing.
        id: String,
    },
}

impl ResolveError {
    pub(crate) fn extension_code(&self) -> &'static str {
        match self {
            ResolveError::DanglingReference { .. } => "DANGLING_REFERENCE",
        }
    }
}

impl ErrorExtensions for ResolveError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| {
            extensions.set("code", self.extension_code());
            if let ResolveError::DanglingReference { id, .. } = self {
                extensions.set("id", id.as_str());
            }
        })
    }
}

/// Errors raised while running the HTTP server.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ServerError {
    /// invalid configuration: {0}
    Configuration(#[from] ConfigurationError),

    /// could not bind to {address}: {source}
    Bind {
        /// The address we tried to listen on.
        address: std::net::SocketAddr,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// http server failed: {0}
    Serve(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_reference_message_names_the_field() {
        let error = ResolveError::DanglingReference {
            field: ResolverKey::PostAuthor,
            target: "User",
            id: "99".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "cannot return null for non-nullable field Post.author: no User with id '99'"
        );
    }

    #[test]
    fn dangling_reference_carries_a_code() {
        let error = ResolveError::DanglingReference {
            field: ResolverKey::CommentPost,
            target: "Post",
            id: "gone".to_string(),
        }
        .extend();
        let extensions = serde_json::to_value(error.extensions).unwrap();
        assert_eq!(
            extensions,
            serde_json::json!({ "code": "DANGLING_REFERENCE", "id": "gone" })
        );
    }
}
