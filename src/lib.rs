//! # linkfeed
//!
//! A GraphQL API for a shared feed of links, in the style of a small
//! news aggregator: users post links, vote on them, and browse a feed that
//! can be filtered, ordered and paginated.
//!
//! ## Features
//!
//! - **Feed query**: case-sensitive substring filter, multi-key ordering with
//!   a stable `id` tiebreak, `skip`/`take` pagination and a total count
//! - **Bearer token identity**: HS256 JWTs carrying a `userId` claim
//! - **Typed errors**: every failure carries a stable `extensions.code`
//! - **Pluggable storage**: in-memory (always) and PostgreSQL (`postgres` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkfeed::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(AppConfig::default_config())
//!         .with_store(InMemoryLinkStore::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod resolvers;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthTokenPayload, JwtTokenDecoder, TokenDecoder},
        context::{ContextBuilder, RequestContext},
        entity::{Link, NewLink, NewUser, User, Vote},
        error::{LinkFeedError, LinkFeedResult, StorageError, StorageResult},
        query::{Feed, FeedArgs, FeedQuery, LinkOrderByInput, Sort},
        service::LinkStore,
    };

    // === Storage ===
    pub use crate::storage::InMemoryLinkStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresLinkStore;

    // === Config ===
    pub use crate::config::{AppConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
