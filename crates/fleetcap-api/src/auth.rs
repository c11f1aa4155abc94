//! Shared-secret request verification.

use axum::http::HeaderMap;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Header carrying the token for callers that cannot send it as a field.
pub const TOKEN_HEADER: &str = "x-verification-token";

/// Checks caller tokens against the configured secret.
#[derive(Clone)]
pub struct RequestAuthenticator {
    secret: String,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Accept only a token equal to the secret. An empty secret accepts
    /// nothing.
    pub fn verify(&self, token: Option<&str>) -> ApiResult<()> {
        let accepted = match token {
            Some(token) if !self.secret.is_empty() => {
                constant_time_eq(token.as_bytes(), self.secret.as_bytes())
            }
            _ => false,
        };

        if accepted {
            Ok(())
        } else {
            warn!(token_present = token.is_some(), "request rejected: bad verification token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Token from the request field, else from [`TOKEN_HEADER`].
pub fn extract_token<'a>(field: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    field.or_else(|| headers.get(TOKEN_HEADER)?.to_str().ok())
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
