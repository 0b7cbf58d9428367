//! Plain HTTP routes that live beside the GraphQL endpoint
//!
//! Only liveness checks: every data operation goes through GraphQL.

use super::super::host::ServerHost;
use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with:
    /// - `GET /health`
    /// - `GET /healthz`
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
            .layer(Extension(host))
    }

    /// Health check endpoint handler
    async fn health_check(Extension(host): Extension<Arc<ServerHost>>) -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "linkfeed",
            "storage": host.store.backend(),
        }))
    }
}
