//! Typed error handling for linkfeed
//!
//! Every failure a resolver can report maps to one stable error code so that
//! clients can branch on the category instead of parsing messages.
//!
//! # Error Categories
//!
//! - [`AuthError`]: missing or unusable identity (`UNAUTHENTICATED`)
//! - [`ValidationError`]: bad feed arguments (`INVALID_ARGUMENT`)
//! - [`StorageError`]: any failure reaching the store (`STORE_UNAVAILABLE`)
//! - [`ConfigError`]: configuration loading and validation (`CONFIG_ERROR`)
//!
//! A missing entity on a single lookup is not an error: resolvers return
//! `None` for it.
//!
//! # Example
//!
//! ```rust,ignore
//! match resolvers::post(&ctx, description, url).await {
//!     Ok(link) => println!("created {}", link.id),
//!     Err(LinkFeedError::Auth(AuthError::Unauthenticated { .. })) => {
//!         println!("log in first");
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use async_graphql::ErrorExtensions;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for linkfeed
#[derive(Debug)]
pub enum LinkFeedError {
    /// Authentication errors
    Auth(AuthError),

    /// Argument validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for LinkFeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFeedError::Auth(e) => write!(f, "{}", e),
            LinkFeedError::Validation(e) => write!(f, "{}", e),
            LinkFeedError::Storage(e) => write!(f, "{}", e),
            LinkFeedError::Config(e) => write!(f, "{}", e),
            LinkFeedError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for LinkFeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkFeedError::Auth(e) => Some(e),
            LinkFeedError::Validation(e) => Some(e),
            LinkFeedError::Storage(e) => Some(e),
            LinkFeedError::Config(e) => Some(e),
            LinkFeedError::Internal(_) => None,
        }
    }
}

/// Error body for plain HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LinkFeedError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkFeedError::Auth(e) => e.status_code(),
            LinkFeedError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkFeedError::Storage(e) => e.status_code(),
            LinkFeedError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LinkFeedError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code, also exposed as `extensions.code` in GraphQL errors
    pub fn error_code(&self) -> &'static str {
        match self {
            LinkFeedError::Auth(e) => e.error_code(),
            LinkFeedError::Validation(_) => "INVALID_ARGUMENT",
            LinkFeedError::Storage(_) => "STORE_UNAVAILABLE",
            LinkFeedError::Config(_) => "CONFIG_ERROR",
            LinkFeedError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for the error returned when a write has no usable identity
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        LinkFeedError::Auth(AuthError::Unauthenticated {
            message: message.into(),
        })
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            LinkFeedError::Validation(ValidationError::NegativeArgument { argument, value }) => {
                Some(serde_json::json!({ "argument": argument, "value": value }))
            }
            LinkFeedError::Validation(ValidationError::InvalidOrderBy { index, .. }) => {
                Some(serde_json::json!({ "argument": "orderBy", "index": index }))
            }
            LinkFeedError::Validation(ValidationError::NulCharacter { argument }) => {
                Some(serde_json::json!({ "argument": argument }))
            }
            LinkFeedError::Storage(e) => Some(serde_json::json!({ "backend": e.backend() })),
            _ => None,
        }
    }
}

impl IntoResponse for LinkFeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl ErrorExtensions for LinkFeedError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.error_code());
            if let LinkFeedError::Validation(
                ValidationError::NegativeArgument { argument, .. }
                | ValidationError::NulCharacter { argument },
            ) = self
            {
                ext.set("argument", argument.as_str());
            }
        })
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors related to request identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A write was attempted without a usable identity
    Unauthenticated { message: String },

    /// A bearer token could not be decoded
    ///
    /// Only the token decoder produces this; the context builder turns it
    /// into "no identity".
    InvalidToken { message: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated { message } => write!(f, "Unauthenticated: {}", message),
            AuthError::InvalidToken { message } => write!(f, "Invalid token: {}", message),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated { .. } => "UNAUTHENTICATED",
            AuthError::InvalidToken { .. } => "INVALID_TOKEN",
        }
    }
}

impl From<AuthError> for LinkFeedError {
    fn from(err: AuthError) -> Self {
        LinkFeedError::Auth(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to feed argument validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `skip` or `take` was negative
    NegativeArgument { argument: String, value: i64 },

    /// An `orderBy` entry did not name exactly one field
    InvalidOrderBy { index: usize, message: String },

    /// A string argument contained a NUL character, which no backend can store
    NulCharacter { argument: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NegativeArgument { argument, value } => {
                write!(
                    f,
                    "Invalid argument '{}': must not be negative (got {})",
                    argument, value
                )
            }
            ValidationError::InvalidOrderBy { index, message } => {
                write!(f, "Invalid argument 'orderBy[{}]': {}", index, message)
            }
            ValidationError::NulCharacter { argument } => {
                write!(
                    f,
                    "Invalid argument '{}': must not contain NUL characters",
                    argument
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Reject string arguments containing `\0`, which PostgreSQL text cannot hold
    pub fn check_text(argument: &str, value: &str) -> Result<(), ValidationError> {
        if value.contains('\0') {
            return Err(ValidationError::NulCharacter {
                argument: argument.to_string(),
            });
        }
        Ok(())
    }
}

impl From<ValidationError> for LinkFeedError {
    fn from(err: ValidationError) -> Self {
        LinkFeedError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached
    Unavailable { backend: String, message: String },

    /// The backend was reached but the query failed
    QueryFailed { backend: String, message: String },

    /// A write violated a relational constraint (e.g. unknown author)
    IntegrityViolation { backend: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { backend, message } => {
                write!(f, "Storage backend '{}' is unavailable: {}", backend, message)
            }
            StorageError::QueryFailed { backend, message } => {
                write!(f, "{} query failed: {}", backend, message)
            }
            StorageError::IntegrityViolation { backend, message } => {
                write!(f, "{} integrity violation: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn backend(&self) -> &str {
        match self {
            StorageError::Unavailable { backend, .. }
            | StorageError::QueryFailed { backend, .. }
            | StorageError::IntegrityViolation { backend, .. } => backend,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::QueryFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            StorageError::IntegrityViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for LinkFeedError {
    fn from(err: StorageError) -> Self {
        LinkFeedError::Storage(err)
    }
}

/// Result type returned by the data access layer
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required value
    MissingField { field: String, context: String },

    /// Invalid value
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::MissingField { field, context } => {
                write!(f, "Missing required field '{}' in {}", field, context)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { path, message } => {
                write!(f, "Failed to read config file '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for LinkFeedError {
    fn from(err: ConfigError) -> Self {
        LinkFeedError::Config(err)
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for resolver operations
pub type LinkFeedResult<T> = Result<T, LinkFeedError>;
