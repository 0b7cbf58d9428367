//! Per-request context handed to every resolver

use crate::core::auth::{TokenDecoder, decode_auth_header};
use crate::core::error::{LinkFeedError, LinkFeedResult};
use crate::core::service::LinkStore;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use std::sync::Arc;

/// Immutable context for a single request: the store handle plus the
/// caller's identity, if one could be decoded.
#[derive(Clone)]
pub struct RequestContext {
    store: Arc<dyn LinkStore>,
    user_id: Option<i32>,
}

impl RequestContext {
    pub fn new(store: Arc<dyn LinkStore>, user_id: Option<i32>) -> Self {
        Self { store, user_id }
    }

    /// Context without an identity
    pub fn anonymous(store: Arc<dyn LinkStore>) -> Self {
        Self::new(store, None)
    }

    pub fn store(&self) -> &dyn LinkStore {
        self.store.as_ref()
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    /// Return the caller's id or fail with `Unauthenticated`.
    pub fn require_user(&self, message: &str) -> LinkFeedResult<i32> {
        self.user_id.ok_or_else(|| LinkFeedError::unauthenticated(message))
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("backend", &self.store.backend())
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Builds a fresh [`RequestContext`] for every inbound request
#[derive(Clone)]
pub struct ContextBuilder {
    store: Arc<dyn LinkStore>,
    decoder: Arc<dyn TokenDecoder>,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn LinkStore>, decoder: Arc<dyn TokenDecoder>) -> Self {
        Self { store, decoder }
    }

    /// Build a context from an optional raw `Authorization` value
    pub fn build(&self, authorization: Option<&str>) -> RequestContext {
        let user_id = decode_auth_header(self.decoder.as_ref(), authorization);
        RequestContext::new(self.store.clone(), user_id)
    }

    /// Build a context from request headers
    ///
    /// A non-UTF-8 `Authorization` value is treated as absent.
    pub fn from_headers(&self, headers: &HeaderMap) -> RequestContext {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        self.build(authorization)
    }
}
