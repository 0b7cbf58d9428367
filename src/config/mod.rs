//! Configuration loading and management
//!
//! Configuration is read from YAML, then selected values can be overridden
//! from the environment:
//!
//! | Variable        | Overrides               |
//! |-----------------|-------------------------|
//! | `APP_SECRET`    | `auth.secret`           |
//! | `DATABASE_URL`  | `storage.url`           |
//! | `LINKFEED_PORT` | `server.port`           |

use crate::core::entity::NewUser;
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret
    #[serde(default)]
    pub secret: String,

    /// Reject tokens that carry no `exp` claim
    #[serde(default)]
    pub require_expiry: bool,
}

/// Which store backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Connection URL, required for `postgres`
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Serve the GraphQL playground on `GET /graphql`
    #[serde(default = "default_true")]
    pub playground: bool,

    /// Maximum query depth accepted by the schema
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: true,
            max_depth: default_max_depth(),
        }
    }
}

/// Users inserted at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<NewUser>,
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub graphql: GraphQLConfig,

    #[serde(default)]
    pub seed: SeedConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_max_connections() -> u32 {
    5
}

fn default_max_depth() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(secret) = get("APP_SECRET") {
            self.auth.secret = secret;
        }

        if let Some(url) = get("DATABASE_URL") {
            self.storage.url = Some(url);
        }

        if let Some(port) = get("LINKFEED_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "LINKFEED_PORT".to_string(),
                value: port.clone(),
                message: "expected a port number".to_string(),
            })?;
        }

        Ok(self)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.secret".to_string(),
                context: "configuration (or set APP_SECRET)".to_string(),
            });
        }

        if self.graphql.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "graphql.max_depth".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.storage.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.storage.backend == StorageBackend::Postgres
            && self.storage.url.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::MissingField {
                field: "storage.url".to_string(),
                context: "postgres storage (or set DATABASE_URL)".to_string(),
            });
        }

        Ok(())
    }

    /// Create a default configuration for development and testing
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig {
                secret: "development-secret".to_string(),
                require_expiry: false,
            },
            storage: StorageConfig::default(),
            graphql: GraphQLConfig::default(),
            seed: SeedConfig {
                users: vec![
                    NewUser {
                        name: "Alice".to_string(),
                        email: "alice@example.com".to_string(),
                    },
                    NewUser {
                        name: "Bob".to_string(),
                        email: "bob@example.com".to_string(),
                    },
                ],
            },
        }
    }
}
