//! Request authorization guard
//!
//! Private routes call [`authorize`] before anything else. The resulting
//! [`AuthUser`] is passed explicitly into every service call that acts on
//! behalf of the caller.

use hyper::header::{HeaderMap, AUTHORIZATION};
use tracing::debug;

use super::jwt::{extract_token_from_header, JwtValidator};
use crate::types::{EntityId, PeerlinkError, Result};

/// Legacy header used by older browser builds
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Identity of an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: EntityId,
}

/// Resolve the bearer credential on a request to a user.
///
/// - no credential: `Unauthenticated`
/// - credential that fails verification or names no valid user id: `InvalidCredential`
pub fn authorize(headers: &HeaderMap, jwt: &JwtValidator) -> Result<AuthUser> {
    let token = credential(headers).ok_or(PeerlinkError::Unauthenticated)?;

    let result = jwt.verify_token(token);
    let claims = match result.claims {
        Some(claims) if result.valid => claims,
        _ => {
            debug!(
                "Rejected token: {}",
                result.error.as_deref().unwrap_or("invalid")
            );
            return Err(PeerlinkError::InvalidCredential);
        }
    };

    let id = EntityId::parse(&claims.sub).map_err(|_| PeerlinkError::InvalidCredential)?;
    Ok(AuthUser { id })
}

fn credential(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(token) = extract_token_from_header(bearer) {
        return Some(token);
    }

    headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
