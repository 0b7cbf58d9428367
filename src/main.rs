use anyhow::Result;
use linkfeed::config::{AppConfig, StorageBackend};
use linkfeed::core::service::LinkStore;
use linkfeed::server::ServerBuilder;
use linkfeed::storage::InMemoryLinkStore;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linkfeed=info,tower_http=info")),
        )
        .init();

    let config = load_config()?;
    let store = open_store(&config).await?;

    ServerBuilder::new()
        .with_config(config)
        .with_shared_store(store)
        .serve()
        .await
}

/// Config path comes from the first argument, then `LINKFEED_CONFIG`.
/// Without either, the development defaults are used.
fn load_config() -> Result<AppConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LINKFEED_CONFIG").ok());

    let config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::from_yaml_file(&path)?
        }
        None => {
            tracing::warn!("No configuration file given, using development defaults");
            AppConfig::default_config()
        }
    };

    let config = config.apply_env()?;
    config.validate()?;
    Ok(config)
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn LinkStore>> {
    match config.storage.backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryLinkStore::new())),
        StorageBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &AppConfig) -> Result<Arc<dyn LinkStore>> {
    use anyhow::Context;
    use linkfeed::storage::PostgresLinkStore;

    let url = config
        .storage
        .url
        .as_deref()
        .context("storage.url is required for the postgres backend")?;

    let store = PostgresLinkStore::connect(url, config.storage.max_connections).await?;
    store.migrate().await?;
    tracing::info!("Connected to PostgreSQL, migrations applied");

    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &AppConfig) -> Result<Arc<dyn LinkStore>> {
    anyhow::bail!("PostgreSQL support is not enabled. Rebuild with the 'postgres' feature.")
}
