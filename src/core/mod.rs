//! Core module containing the domain types, request context and data access traits

pub mod auth;
pub mod context;
pub mod entity;
pub mod error;
pub mod query;
pub mod service;

pub use auth::{AuthTokenPayload, JwtTokenDecoder, TokenDecoder};
pub use context::{ContextBuilder, RequestContext};
pub use entity::{Link, NewLink, NewUser, User, Vote};
pub use error::{LinkFeedError, LinkFeedResult, StorageError, StorageResult};
pub use query::{Feed, FeedArgs, FeedQuery, LinkOrder, LinkOrderByInput, OrderField, Sort};
pub use service::LinkStore;
