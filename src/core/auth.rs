//! Bearer token decoding
//!
//! The decoder turns an inbound `Authorization` header into an optional
//! identity. Malformed or missing credentials never fail a request on their
//! own: they yield "no identity", and only operations that require a user
//! (see [`RequestContext::require_user`](crate::core::context::RequestContext::require_user))
//! reject the request.

use crate::core::error::AuthError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Payload carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokenPayload {
    #[serde(rename = "userId")]
    pub user_id: i32,

    /// Expiration (seconds since epoch), validated when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Trait for token decoders
///
/// Implementations validate a raw token (without the `Bearer ` scheme) and
/// return its payload.
pub trait TokenDecoder: Send + Sync {
    fn decode_token(&self, token: &str) -> Result<AuthTokenPayload, AuthError>;
}

/// HS256 JWT decoder using a shared secret
#[derive(Clone)]
pub struct JwtTokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenDecoder {
    /// Create a decoder for tokens signed with `secret`.
    ///
    /// When `require_expiry` is false, tokens without an `exp` claim are
    /// accepted; an `exp` that is present is always checked.
    pub fn new(secret: &str, require_expiry: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if !require_expiry {
            validation.required_spec_claims.clear();
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtTokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenDecoder")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenDecoder for JwtTokenDecoder {
    fn decode_token(&self, token: &str) -> Result<AuthTokenPayload, AuthError> {
        decode::<AuthTokenPayload>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken {
                message: e.to_string(),
            })
    }
}

/// Extract the raw token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme matched case-insensitively) and falls
/// back to treating the whole value as the token.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => header,
    };

    if token.is_empty() { None } else { Some(token) }
}

/// Decode an optional `Authorization` header into a user id.
///
/// Every failure resolves to `None`.
pub fn decode_auth_header(decoder: &dyn TokenDecoder, header: Option<&str>) -> Option<i32> {
    let token = extract_bearer_token(header?)?;

    match decoder.decode_token(token) {
        Ok(payload) => Some(payload.user_id),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable authorization header");
            None
        }
    }
}
