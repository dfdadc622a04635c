//! Authorization gate for lifecycle operations.
//!
//! A pure function of `(identity, operation)`: no resource state is
//! consulted, so the gate runs before any store access. Denials carry one
//! fixed message so responses never leak whether a resource exists.

use super::error::Error;
use super::identity::AuthenticatedIdentity;

/// Fixed denial message returned for every authorization failure.
pub const FORBIDDEN_MESSAGE: &str = "You are not authorized to perform this action.";

/// A lifecycle operation on the octocat collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a new octocat.
    Create,
    /// Read a single octocat.
    Retrieve,
    /// Read a page of the collection.
    List,
    /// Replace mutable attributes of an octocat.
    Update,
    /// Permanently remove an octocat.
    Delete,
}

impl Operation {
    /// Whether the operation mutates the collection.
    #[must_use]
    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

/// Check whether `identity` may perform `operation`.
///
/// Mutating operations require the administrator role; reads succeed for any
/// authenticated identity.
///
/// # Errors
/// Returns a [`Error::forbidden`] with [`FORBIDDEN_MESSAGE`] when the gate
/// denies the operation.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use octocat_api::domain::{authorize, AuthenticatedIdentity, Operation};
/// use uuid::Uuid;
///
/// let member = AuthenticatedIdentity {
///     public_id: Uuid::new_v4(),
///     admin: false,
///     token_id: Uuid::new_v4(),
///     expires_at: Utc::now(),
/// };
/// assert!(authorize(&member, Operation::Retrieve).is_ok());
/// assert!(authorize(&member, Operation::Create).is_err());
/// ```
pub fn authorize(identity: &AuthenticatedIdentity, operation: Operation) -> Result<(), Error> {
    if operation.requires_admin() && !identity.admin {
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    Ok(())
}
