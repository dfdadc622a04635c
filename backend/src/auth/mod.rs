//! Access-token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the identity's public id, role flag, and
//! a `jti` used for revocation. The blacklist lookup itself lives behind the
//! [`crate::domain::ports::TokenBlacklist`] port; this module only encodes
//! and decodes.

pub mod password;

pub use password::{PasswordHashError, hash_password, verify_password};

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AuthenticatedIdentity, Error, Identity};

/// Message returned when a presented token has expired.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Access token expired. Please log in again.";

/// Message returned when a presented token is malformed or badly signed.
pub const TOKEN_INVALID_MESSAGE: &str = "Invalid token. Please log in again.";

/// Message returned when a presented token has been revoked.
pub const TOKEN_BLACKLISTED_MESSAGE: &str = "Token blacklisted. Please log in again.";

/// JWT claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Identity's stable public identifier.
    sub: Uuid,
    /// Whether the identity held the admin role at issuance.
    admin: bool,
    /// Issued-at timestamp (seconds since epoch).
    iat: i64,
    /// Expiration timestamp (seconds since epoch).
    exp: i64,
    /// Token identifier for revocation.
    jti: Uuid,
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub token: String,
    /// Seconds until expiry, for the login response body.
    pub expires_in: i64,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Create a service signing with `secret` and issuing tokens valid for
    /// `ttl`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            validation,
        }
    }

    /// Issue a token for `identity`.
    ///
    /// # Errors
    /// Returns an internal error if encoding fails, which indicates a
    /// misconfigured signing key rather than a caller mistake.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, Error> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: identity.public_id,
            admin: identity.admin,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token encoding failed: {err}")))?;
        Ok(IssuedToken {
            token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Verify `token` and derive the caller identity from its claims.
    ///
    /// # Errors
    /// `Unauthorized` with [`TOKEN_EXPIRED_MESSAGE`] for expired tokens and
    /// [`TOKEN_INVALID_MESSAGE`] for anything else the decoder rejects.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => Error::unauthorized(TOKEN_EXPIRED_MESSAGE),
                _ => Error::unauthorized(TOKEN_INVALID_MESSAGE),
            }
        })?;
        Ok(AuthenticatedIdentity {
            public_id: data.claims.sub,
            admin: data.claims.admin,
            token_id: data.claims.jti,
            expires_at: timestamp_to_datetime(data.claims.exp),
        })
    }
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}
