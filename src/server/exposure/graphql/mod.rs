//! GraphQL API exposure
//!
//! Routes:
//! - `POST /graphql`: queries and mutations
//! - `GET /graphql`: GraphQL Playground (when `graphql.playground` is enabled)
//! - `GET /graphql/schema`: SDL export

pub mod error_codes;
pub mod schema;

use crate::server::host::ServerHost;
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::Extension,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;

pub use schema::{LinkFeedSchema, build_schema};

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = Arc::new(builder.build_host()?);
    /// let graphql_app = GraphQLExposure::build_router(host);
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let endpoint = if host.config.graphql.playground {
            get(graphql_playground).post(graphql_handler)
        } else {
            post(graphql_handler)
        };

        Router::new()
            .route("/graphql", endpoint)
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(host))
    }
}

/// Handler for GraphQL queries and mutations
async fn graphql_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = host.request_context(&headers);
    host.schema.execute(request.into_inner().data(ctx)).await.into()
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        host.schema.sdl(),
    )
}
