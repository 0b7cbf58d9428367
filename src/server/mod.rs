//! Server module for building the HTTP server
//!
//! [`ServerBuilder`] assembles a [`ServerHost`] from configuration and a
//! store, then mounts the GraphQL and health routes on one axum router.

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::{GraphQLExposure, RestExposure};
pub use host::ServerHost;
