//! ServerBuilder for fluent API to build the HTTP server

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::auth::{JwtTokenDecoder, TokenDecoder};
use crate::core::service::LinkStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the linkfeed HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(AppConfig::default_config())
///     .with_store(InMemoryLinkStore::new())
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn LinkStore>>,
    decoder: Option<Arc<dyn TokenDecoder>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            decoder: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the application configuration (required)
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the store (required)
    pub fn with_store(mut self, store: impl LinkStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared store
    pub fn with_shared_store(mut self, store: Arc<dyn LinkStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the token decoder.
    ///
    /// Defaults to an HS256 [`JwtTokenDecoder`] built from `auth` config.
    pub fn with_token_decoder(mut self, decoder: impl TokenDecoder + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Fails when the configuration or the store is missing, or when the
    /// configuration does not validate.
    pub fn build_host(&mut self) -> Result<ServerHost> {
        let config = self
            .config
            .take()
            .ok_or_else(|| anyhow::anyhow!("AppConfig is required. Call .with_config()"))?;
        config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("LinkStore is required. Call .with_store()"))?;

        let decoder = self.decoder.take().unwrap_or_else(|| {
            Arc::new(JwtTokenDecoder::new(
                &config.auth.secret,
                config.auth.require_expiry,
            ))
        });

        Ok(ServerHost::new(config, store, decoder))
    }

    /// Build the final router for an existing host
    pub fn router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
        let mut app = RestExposure::build_router(host.clone())
            .merge(GraphQLExposure::build_router(host));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app.layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Build the host and its router
    pub fn build(mut self) -> Result<(Arc<ServerHost>, Router)> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let app = Self::router(host.clone(), custom_routes);
        Ok((host, app))
    }

    /// Seed the store and serve with graceful shutdown
    ///
    /// This will:
    /// - Insert the configured seed users
    /// - Bind to `server.host:server.port`
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let (host, app) = self.build()?;

        let seeded = host.seed().await?;
        if seeded > 0 {
            tracing::info!(users = seeded, "store seeded");
        }

        let addr = host.config.server.bind_address();
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(
            storage = host.store.backend(),
            playground = host.config.graphql.playground,
            "Server listening on {}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
