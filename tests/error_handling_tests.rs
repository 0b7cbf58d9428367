//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes and stable error codes
//! - Error responses are properly formatted
//! - GraphQL errors carry `extensions.code`
//! - Error matching allows clients to handle specific cases

use async_graphql::ErrorExtensions;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use linkfeed::core::error::{AuthError, ConfigError, ValidationError};
use linkfeed::prelude::*;

fn unavailable() -> StorageError {
    StorageError::Unavailable {
        backend: "postgres".to_string(),
        message: "connection refused".to_string(),
    }
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_unauthenticated_returns_401() {
        let err = LinkFeedError::unauthenticated("Cannot post without logging in.");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_validation_error_returns_400() {
        let err = LinkFeedError::Validation(ValidationError::NegativeArgument {
            argument: "take".to_string(),
            value: -1,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unavailable_store_returns_503() {
        let err = LinkFeedError::Storage(unavailable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_failed_query_returns_500() {
        let err = LinkFeedError::Storage(StorageError::QueryFailed {
            backend: "postgres".to_string(),
            message: "syntax error".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_returns_500() {
        let err = LinkFeedError::Internal("boom".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_codes_per_category() {
        assert_eq!(
            LinkFeedError::unauthenticated("x").error_code(),
            "UNAUTHENTICATED"
        );
        assert_eq!(
            LinkFeedError::Validation(ValidationError::InvalidOrderBy {
                index: 0,
                message: "x".to_string()
            })
            .error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            LinkFeedError::Storage(unavailable()).error_code(),
            "STORE_UNAVAILABLE"
        );
        assert_eq!(
            LinkFeedError::Storage(StorageError::IntegrityViolation {
                backend: "in-memory".to_string(),
                message: "x".to_string()
            })
            .error_code(),
            "STORE_UNAVAILABLE"
        );
        assert_eq!(
            LinkFeedError::Config(ConfigError::MissingField {
                field: "auth.secret".to_string(),
                context: "config".to_string()
            })
            .error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            LinkFeedError::Internal("x".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_invalid_token_code() {
        let err = AuthError::InvalidToken {
            message: "bad signature".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let response = LinkFeedError::unauthenticated("user no longer exists").to_response();

        assert_eq!(response.code, "UNAUTHENTICATED");
        assert!(response.message.contains("user no longer exists"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_negative_argument_details() {
        let response = LinkFeedError::Validation(ValidationError::NegativeArgument {
            argument: "skip".to_string(),
            value: -4,
        })
        .to_response();

        let details = response.details.expect("details expected");
        assert_eq!(details["argument"], "skip");
        assert_eq!(details["value"], -4);
    }

    #[test]
    fn test_order_by_details() {
        let response = LinkFeedError::Validation(ValidationError::InvalidOrderBy {
            index: 2,
            message: "two fields".to_string(),
        })
        .to_response();

        let details = response.details.expect("details expected");
        assert_eq!(details["argument"], "orderBy");
        assert_eq!(details["index"], 2);
        assert!(response.message.contains("orderBy[2]"));
    }

    #[test]
    fn test_storage_details_name_backend() {
        let response = LinkFeedError::Storage(unavailable()).to_response();
        assert_eq!(response.details.expect("details expected")["backend"], "postgres");
    }
}

// =============================================================================
// GraphQL Extension Tests
// =============================================================================

mod graphql_extension_tests {
    use super::*;

    #[test]
    fn test_extension_code_is_set() {
        let gql = LinkFeedError::Storage(unavailable()).extend();
        let ext = gql.extensions.expect("extensions expected");

        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::from("STORE_UNAVAILABLE"))
        );
    }

    #[test]
    fn test_negative_argument_names_argument() {
        let gql = LinkFeedError::Validation(ValidationError::NegativeArgument {
            argument: "take".to_string(),
            value: -1,
        })
        .extend();
        let ext = gql.extensions.expect("extensions expected");

        assert_eq!(ext.get("argument"), Some(&async_graphql::Value::from("take")));
        assert!(gql.message.contains("take"));
    }
}

// =============================================================================
// Error Conversion and Matching Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_storage_error_converts() {
        let err: LinkFeedError = unavailable().into();
        assert!(matches!(err, LinkFeedError::Storage(StorageError::Unavailable { .. })));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: LinkFeedError = ValidationError::NegativeArgument {
            argument: "skip".to_string(),
            value: -1,
        }
        .into();
        assert!(matches!(err, LinkFeedError::Validation(_)));
    }

    #[test]
    fn test_error_source_is_category() {
        use std::error::Error;

        let err: LinkFeedError = unavailable().into();
        let source = err.source().expect("source expected");
        assert!(source.to_string().contains("connection refused"));
    }

    #[test]
    fn test_storage_backend_accessor() {
        assert_eq!(unavailable().backend(), "postgres");
    }
}

mod into_response_tests {
    use super::*;

    #[test]
    fn test_into_response_status() {
        let response = LinkFeedError::unauthenticated("nope").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_storage_into_response_status() {
        let response = LinkFeedError::Storage(unavailable()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
