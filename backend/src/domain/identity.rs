//! Identity data model.
//!
//! Identities are created by the registration flow (or the `add-user` CLI)
//! and are immutable with respect to role here: lifecycle operations read
//! the admin flag, they never change it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Validation failures for identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityValidationError {
    /// Email was empty.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not have the shape `local@domain`.
    #[error("'{value}' is not a valid email address")]
    InvalidEmail {
        /// The rejected value.
        value: String,
    },
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Unique email address identifying a registered identity.
///
/// # Examples
/// ```
/// use octocat_api::domain::Email;
///
/// assert!(Email::parse("admin@test.com").is_ok());
/// assert!(Email::parse("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and construct an email address.
    ///
    /// The check is deliberately shallow: one `@`, a non-empty local part,
    /// and a domain containing a dot. Deliverability is not our concern.
    ///
    /// # Errors
    /// Returns [`IdentityValidationError`] for empty or malformed input.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(IdentityValidationError::InvalidEmail { value });
        };
        let domain_ok = domain.contains('.')
            && !domain.contains('@')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
            return Err(IdentityValidationError::InvalidEmail { value });
        }
        Ok(Self(value))
    }

    /// Borrow the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A registered identity as exposed to the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Stable public identifier.
    pub public_id: Uuid,
    /// Unique email address.
    pub email: Email,
    /// Whether the identity holds the administrator role.
    pub admin: bool,
    /// Registration timestamp.
    pub registered_on: DateTime<Utc>,
}

/// An identity together with its password hash, as held by the store.
///
/// The hash never leaves the persistence and authentication layers.
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    /// The public identity fields.
    pub identity: Identity,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}

/// Attributes required to register an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Validated email address.
    pub email: Email,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Whether the identity holds the administrator role.
    pub admin: bool,
}

/// The caller identity derived from a verified access token.
///
/// Carries only what the authorization gate and lifecycle operations need;
/// the full [`Identity`] is loaded from the store when a representation is
/// required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Stable public identifier (the token's `sub` claim).
    pub public_id: Uuid,
    /// Whether the token was issued to an administrator.
    pub admin: bool,
    /// Token identifier (`jti`), used for revocation.
    pub token_id: Uuid,
    /// Token expiry, recorded alongside blacklist entries.
    pub expires_at: DateTime<Utc>,
}
