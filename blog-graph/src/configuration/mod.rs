//! Logic for loading configuration in to an object model
mod cors;

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use self::cors::Cors;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not read configuration file {path}: {error}
    CannotReadFile {
        path: String,
        error: std::io::Error,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}

/// The configuration for the server.
///
/// Can be created through `serde::Deserialize` from various formats,
/// or inline in Rust code with `serde_json::json!` and `serde_json::from_value`.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// GraphQL endpoint configuration.
    pub(crate) graphql: GraphQL,

    /// Interactive query explorer.
    pub(crate) explorer: Explorer,

    /// Health check endpoint.
    pub(crate) health_check: HealthCheck,

    /// Query limits enforced by the execution engine.
    pub(crate) limits: Limits,

    /// Cross origin request headers.
    pub(crate) cors: Cors,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(
        graphql: Option<GraphQL>,
        explorer: Option<Explorer>,
        health_check: Option<HealthCheck>,
        limits: Option<Limits>,
        cors: Option<Cors>,
    ) -> Self {
        Self {
            graphql: graphql.unwrap_or_default(),
            explorer: explorer.unwrap_or_default(),
            health_check: health_check.unwrap_or_default(),
            limits: limits.unwrap_or_default(),
            cors: cors.unwrap_or_default(),
        }
    }

    /// Read and validate a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content =
            std::fs::read_to_string(path).map_err(|error| ConfigurationError::CannotReadFile {
                path: path.display().to_string(),
                error,
            })?;
        let configuration: Configuration = content.parse()?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// Check the invariants that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_route_path(&self.graphql.path).map_err(|error| {
            ConfigurationError::InvalidConfiguration {
                message: "invalid 'graphql.path' configuration",
                error,
            }
        })?;

        if self.health_check.enabled {
            ensure_route_path(&self.health_check.path).map_err(|error| {
                ConfigurationError::InvalidConfiguration {
                    message: "invalid 'health_check.path' configuration",
                    error,
                }
            })?;
            if self.health_check.path == self.graphql.path {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "invalid 'health_check.path' configuration",
                    error: format!(
                        "'{}' is already used by the graphql endpoint",
                        self.health_check.path
                    ),
                });
            }
        }

        for (name, limit) in [
            ("limits.max_depth", self.limits.max_depth),
            ("limits.max_complexity", self.limits.max_complexity),
        ] {
            if limit == Some(0) {
                return Err(ConfigurationError::InvalidConfiguration {
                    message: "invalid limit",
                    error: format!("'{name}' must be greater than zero"),
                });
            }
        }

        self.cors
            .ensure_usable_cors_rules()
            .map_err(|error| ConfigurationError::InvalidConfiguration {
                message: "invalid 'cors' configuration",
                error,
            })
    }

    pub fn graphql(&self) -> &GraphQL {
        &self.graphql
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn health_check(&self) -> &HealthCheck {
        &self.health_check
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn cors(&self) -> &Cors {
        &self.cors
    }

    /// Replace the address the server listens on.
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.graphql.listen = listen;
        self
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // An empty file is an empty mapping.
        if s.trim().is_empty() {
            return Ok(Configuration::default());
        }
        serde_yaml::from_str(s).map_err(ConfigurationError::DeserializeConfigError)
    }
}

/// Endpoint paths are literal routes: axum would panic on a capture or a
/// wildcard when the router is built.
fn ensure_route_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!("'{path}' must start with '/'"));
    }
    if path.split('/').any(|segment| segment.starts_with(':')) {
        return Err(format!("'{path}' must not contain a segment starting with ':'"));
    }
    if path.contains(['{', '}', '*']) {
        return Err(format!("'{path}' must not contain '{{', '}}' or '*'"));
    }
    Ok(())
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4000))
}

fn default_graphql_path() -> String {
    String::from("/")
}

fn default_health_check_path() -> String {
    String::from("/health")
}

fn default_true() -> bool {
    true
}

/// Configuration options pertaining to the GraphQL endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct GraphQL {
    /// The socket address to listen on, defaults to 127.0.0.1:4000
    #[schemars(with = "String")]
    pub(crate) listen: SocketAddr,

    /// The HTTP path on which GraphQL requests will be served.
    /// default: "/"
    pub(crate) path: String,

    /// Enable introspection
    /// Default: true
    pub(crate) introspection: bool,
}

#[buildstructor::buildstructor]
impl GraphQL {
    #[builder]
    pub fn new(
        listen: Option<SocketAddr>,
        path: Option<String>,
        introspection: Option<bool>,
    ) -> Self {
        Self {
            listen: listen.unwrap_or_else(default_listen),
            path: path.unwrap_or_else(default_graphql_path),
            introspection: introspection.unwrap_or_else(default_true),
        }
    }
}

impl GraphQL {
    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn introspection(&self) -> bool {
        self.introspection
    }
}

impl Default for GraphQL {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration options pertaining to the GraphiQL explorer.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Explorer {
    /// Set to false to disable the explorer
    pub(crate) enabled: bool,
}

#[buildstructor::buildstructor]
impl Explorer {
    #[builder]
    pub fn new(enabled: Option<bool>) -> Self {
        Self {
            enabled: enabled.unwrap_or_else(default_true),
        }
    }
}

impl Explorer {
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration options pertaining to the health check endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct HealthCheck {
    /// Set to false to disable the health check
    pub(crate) enabled: bool,

    /// The HTTP path on which the health check is served.
    /// default: "/health"
    pub(crate) path: String,
}

#[buildstructor::buildstructor]
impl HealthCheck {
    #[builder]
    pub fn new(enabled: Option<bool>, path: Option<String>) -> Self {
        Self {
            enabled: enabled.unwrap_or_else(default_true),
            path: path.unwrap_or_else(default_health_check_path),
        }
    }
}

impl HealthCheck {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Limits applied to incoming operations before execution.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Limits {
    /// Maximum nesting depth of an operation. Unlimited when absent.
    pub(crate) max_depth: Option<usize>,

    /// Maximum complexity score of an operation. Unlimited when absent.
    pub(crate) max_complexity: Option<usize>,
}

#[buildstructor::buildstructor]
impl Limits {
    #[builder]
    pub fn new(max_depth: Option<usize>, max_complexity: Option<usize>) -> Self {
        Self {
            max_depth,
            max_complexity,
        }
    }
}

impl Limits {
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_complexity(&self) -> Option<usize> {
        self.max_complexity
    }
}

/// Generate the JSON Schema describing the configuration file.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    settings
        .into_generator()
        .into_root_schema_for::<Configuration>()
}
