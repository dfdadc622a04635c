//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store and the token blacklist). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of stringly-typed results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::identity::{Email, NewIdentity, StoredIdentity};
use super::octocat::{NewOctocat, Octocat, OctocatChanges, OctocatName};

/// Errors surfaced by the octocat persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OctocatRepositoryError {
    /// Database connectivity or pool checkout failures.
    #[error("octocat store connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query construction or execution failures.
    #[error("octocat store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// The unique-name constraint rejected an insert.
    #[error("octocat name '{name}' already exists")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
    /// No octocat with the given name exists.
    #[error("octocat '{name}' not found")]
    NotFound {
        /// The missing name.
        name: String,
    },
}

impl OctocatRepositoryError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-name violations.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Helper for missing rows.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

/// Durable store of octocats in stable creation order.
///
/// Uniqueness of `name` is enforced at the storage layer (a unique
/// constraint), so a concurrent check-then-insert cannot race: the second
/// insert fails with [`OctocatRepositoryError::DuplicateName`]. Every
/// mutation is durable before the call returns.
#[async_trait]
pub trait OctocatRepository: Send + Sync {
    /// Look up an octocat by its unique name.
    async fn find_by_name(
        &self,
        name: &OctocatName,
    ) -> Result<Option<Octocat>, OctocatRepositoryError>;

    /// Insert a new octocat, failing on a duplicate name.
    async fn insert(&self, new: NewOctocat) -> Result<Octocat, OctocatRepositoryError>;

    /// Apply the supplied mutable attributes to an existing octocat.
    async fn update(
        &self,
        name: &OctocatName,
        changes: OctocatChanges,
    ) -> Result<Octocat, OctocatRepositoryError>;

    /// Permanently remove an octocat.
    async fn delete(&self, name: &OctocatName) -> Result<(), OctocatRepositoryError>;

    /// Return one window of the collection in creation order, plus the
    /// total number of octocats.
    async fn list(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Octocat>, u64), OctocatRepositoryError>;
}

/// Errors surfaced by the identity persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityRepositoryError {
    /// Database connectivity or pool checkout failures.
    #[error("identity store connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query construction or execution failures.
    #[error("identity store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// The unique-email constraint rejected an insert.
    #[error("email '{email}' is already registered")]
    DuplicateEmail {
        /// The conflicting address.
        email: String,
    },
}

impl IdentityRepositoryError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-email violations.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Durable store of registered identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Look up an identity by its unique email address.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError>;

    /// Look up an identity by its stable public identifier.
    async fn find_by_public_id(
        &self,
        public_id: Uuid,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError>;

    /// Register a new identity, failing on a duplicate email.
    async fn insert(&self, new: NewIdentity) -> Result<StoredIdentity, IdentityRepositoryError>;
}

/// Errors surfaced by the token blacklist adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenBlacklistError {
    /// Backend connectivity failures.
    #[error("token blacklist unavailable: {message}")]
    Backend {
        /// Adapter-level failure description.
        message: String,
    },
}

impl TokenBlacklistError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Revocation list keyed by token identifier (`jti`).
///
/// Entries outlive the tokens they revoke only until `expires_at`, after
/// which the token would be rejected as expired anyway.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Record a token identifier as revoked.
    async fn revoke(
        &self,
        token_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError>;

    /// Whether a token identifier has been revoked.
    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenBlacklistError>;
}
