//! Cross Origin Resource Sharing (CORS configuration)

use http::HeaderValue;
use http::Method;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;

/// Cross origin request configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct Cors {
    /// Set to true to allow any origin.
    ///
    /// Defaults to false
    /// Having this set to true is the only way to allow Origin: null.
    pub(crate) allow_any_origin: bool,

    /// Set to true to add the `Access-Control-Allow-Credentials` header.
    pub(crate) allow_credentials: bool,

    /// The origin(s) to allow requests from.
    /// Defaults to `https://studio.apollographql.com/` for Apollo Studio.
    pub(crate) origins: Vec<String>,

    /// Allowed request methods. Defaults to GET, POST, OPTIONS.
    pub(crate) methods: Vec<String>,
}

impl Default for Cors {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_origins() -> Vec<String> {
    vec!["https://studio.apollographql.com".into()]
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".into(), "POST".into(), "OPTIONS".into()]
}

#[buildstructor::buildstructor]
impl Cors {
    #[builder]
    pub fn new(
        allow_any_origin: Option<bool>,
        allow_credentials: Option<bool>,
        origins: Option<Vec<String>>,
        methods: Option<Vec<String>>,
    ) -> Self {
        Self {
            allow_any_origin: allow_any_origin.unwrap_or_default(),
            allow_credentials: allow_credentials.unwrap_or_default(),
            origins: origins.unwrap_or_else(default_origins),
            methods: methods.unwrap_or_else(default_cors_methods),
        }
    }
}

impl Cors {
    pub(crate) fn into_layer(self) -> Result<CorsLayer, String> {
        self.ensure_usable_cors_rules()?;

        // wildcard headers cannot be combined with credentials
        let headers = if self.allow_credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        };

        let cors = CorsLayer::new()
            .allow_credentials(self.allow_credentials)
            .allow_headers(headers)
            .allow_methods(self.parse_methods()?);

        Ok(if self.allow_any_origin {
            cors.allow_origin(AllowOrigin::any())
        } else {
            cors.allow_origin(AllowOrigin::list(self.parse_origins()?))
        })
    }

    fn parse_methods(&self) -> Result<Vec<Method>, String> {
        self.methods
            .iter()
            .map(|method| {
                method
                    .parse::<Method>()
                    .map_err(|_| format!("method '{method}' is not valid"))
            })
            .collect()
    }

    fn parse_origins(&self) -> Result<Vec<HeaderValue>, String> {
        self.origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| format!("origin '{origin}' is not valid"))
            })
            .collect()
    }

    // tower-http panics on unusable CORS rules. We don't want the server to
    // panic in such cases, so this returns an error describing the problem.
    pub(crate) fn ensure_usable_cors_rules(&self) -> Result<(), String> {
        if self.origins.iter().any(|x| x == "*") {
            return Err(
                "Invalid CORS configuration: use `allow_any_origin: true` to set `Access-Control-Allow-Origin: *`"
                    .to_string(),
            );
        }
        if self.allow_credentials && self.allow_any_origin {
            return Err(
                "Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` \
                with `allow_any_origin: true`"
                    .to_string(),
            );
        }
        if self.methods.iter().any(|x| x == "*") {
            return Err(
                "Invalid CORS configuration: list methods explicitly instead of `*`".to_string(),
            );
        }
        self.parse_methods()?;
        self.parse_origins()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cors_layer_builds() {
        assert!(Cors::default().into_layer().is_ok());
    }

    #[test]
    fn any_origin_layer_builds() {
        let cors = Cors::builder().allow_any_origin(true).build();
        assert!(cors.into_layer().is_ok());
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let cors = Cors::builder().origins(vec!["*".to_string()]).build();
        assert_eq!(
            cors.into_layer().unwrap_err(),
            "Invalid CORS configuration: use `allow_any_origin: true` to set `Access-Control-Allow-Origin: *`"
        );
    }

    #[test]
    fn credentials_with_any_origin_is_rejected() {
        let cors = Cors::builder()
            .allow_any_origin(true)
            .allow_credentials(true)
            .build();
        assert!(cors.ensure_usable_cors_rules().is_err());
    }

    #[test]
    fn credentials_with_listed_origins_builds() {
        let cors = Cors::builder()
            .allow_credentials(true)
            .origins(vec!["https://trusted.com".into()])
            .build();
        assert!(cors.into_layer().is_ok());
    }

    #[test]
    fn bad_method_is_rejected() {
        let cors = Cors::builder().methods(vec!["GE T".to_string()]).build();
        assert_eq!(cors.into_layer().unwrap_err(), "method 'GE T' is not valid");
    }

    #[test]
    fn bad_origin_is_rejected() {
        let cors = Cors::builder()
            .origins(vec![String::from("bad\norigin")])
            .build();
        assert_eq!(
            cors.into_layer().unwrap_err(),
            "origin 'bad\norigin' is not valid"
        );
    }
}
