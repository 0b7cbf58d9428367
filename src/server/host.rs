//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds all state an exposure needs: the configuration, the
//! store, the per-request context builder and the GraphQL schema. Exposures
//! take it behind an `Arc` and never mutate it.

use crate::config::AppConfig;
use crate::core::auth::TokenDecoder;
use crate::core::context::{ContextBuilder, RequestContext};
use crate::core::error::{LinkFeedResult, StorageError};
use crate::core::service::LinkStore;
use crate::server::exposure::graphql::schema::{LinkFeedSchema, build_schema};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Host context containing all server state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(config, store, decoder));
/// host.seed().await?;
///
/// let app = RestExposure::build_router(host.clone())
///     .merge(GraphQLExposure::build_router(host));
/// ```
pub struct ServerHost {
    /// Validated application configuration
    pub config: Arc<AppConfig>,

    /// Shared data access handle
    pub store: Arc<dyn LinkStore>,

    /// Builds a fresh context for every request
    pub context_builder: ContextBuilder,

    /// Executable GraphQL schema
    pub schema: LinkFeedSchema,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn LinkStore>,
        decoder: Arc<dyn TokenDecoder>,
    ) -> Self {
        let schema = build_schema(config.graphql.max_depth);
        let context_builder = ContextBuilder::new(store.clone(), decoder);

        Self {
            config: Arc::new(config),
            store,
            context_builder,
            schema,
        }
    }

    /// Build the context for one request
    pub fn request_context(&self, headers: &HeaderMap) -> RequestContext {
        self.context_builder.from_headers(headers)
    }

    /// Insert the configured seed users.
    ///
    /// Users whose email already exists are skipped, so seeding a persistent
    /// store on every start is harmless. Returns the number of users created.
    pub async fn seed(&self) -> LinkFeedResult<usize> {
        let mut created = 0;

        for user in &self.config.seed.users {
            match self.store.create_user(user.clone()).await {
                Ok(user) => {
                    tracing::info!(user_id = user.id, email = %user.email, "seeded user");
                    created += 1;
                }
                Err(StorageError::IntegrityViolation { .. }) => {
                    tracing::debug!(email = %user.email, "seed user already exists");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::JwtTokenDecoder;
    use crate::storage::InMemoryLinkStore;

    fn host() -> ServerHost {
        let config = AppConfig::default_config();
        let decoder = Arc::new(JwtTokenDecoder::new(&config.auth.secret, false));
        ServerHost::new(config, Arc::new(InMemoryLinkStore::new()), decoder)
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let host = host();

        assert_eq!(host.seed().await.unwrap(), 2);
        assert_eq!(host.seed().await.unwrap(), 0);

        let alice = host.store.get_user(1).await.unwrap().unwrap();
        assert_eq!(alice.email, "alice@example.com");
    }

    #[test]
    fn test_request_context_without_authorization() {
        let ctx = host().request_context(&HeaderMap::new());
        assert_eq!(ctx.user_id(), None);
    }
}
