//! Bearer-token authentication for HTTP handlers.
//!
//! The interceptor chain is explicit: handlers call [`authenticate`] first,
//! then the authorization gate, then the lifecycle operation. Nothing here
//! touches the octocat store.

use actix_web::HttpRequest;
use actix_web::http::header;

use crate::auth::TOKEN_BLACKLISTED_MESSAGE;
use crate::domain::{ApiResult, AuthenticatedIdentity, Error};

use super::state::HttpState;

/// Message returned when the Authorization header is absent or malformed.
pub const MISSING_TOKEN_MESSAGE: &str = "Bearer token missing from Authorization header.";

/// Resolve the caller identity from the request's bearer token.
///
/// Verifies the token signature and expiry, then consults the revocation
/// list. Every failure maps to `401 Unauthorized` with a stable message.
///
/// # Errors
/// `Unauthorized` when the header is missing or malformed, the token is
/// invalid or expired, the blacklist rejects it, or the blacklist backend
/// is unreachable (reported as an internal error).
pub async fn authenticate(
    req: &HttpRequest,
    state: &HttpState,
) -> ApiResult<AuthenticatedIdentity> {
    let token = bearer_token(req)?;
    let identity = state.tokens.verify(token)?;
    let revoked = state
        .blacklist
        .is_revoked(identity.token_id)
        .await
        .map_err(|err| Error::internal(format!("blacklist lookup failed: {err}")))?;
    if revoked {
        return Err(Error::unauthorized(TOKEN_BLACKLISTED_MESSAGE));
    }
    Ok(identity)
}

fn bearer_token(req: &HttpRequest) -> ApiResult<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized(MISSING_TOKEN_MESSAGE))
}
