//! In-memory port implementations.
//!
//! Used when the server starts without a configured database and by the
//! integration tests, which drive the full HTTP surface without I/O. The
//! adapters enforce the same contracts as their Diesel counterparts:
//! unique names and emails, stable creation order, permanent deletes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    IdentityRepository, IdentityRepositoryError, OctocatRepository, OctocatRepositoryError,
    TokenBlacklist, TokenBlacklistError,
};
use crate::domain::{
    Email, Identity, NewIdentity, NewOctocat, Octocat, OctocatChanges, OctocatName, Owner,
    StoredIdentity,
};

fn read_lock<T>(lock: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory identity store keyed by email and public id.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    rows: Mutex<Vec<StoredIdentity>>,
}

impl InMemoryIdentityRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed identity, bypassing registration defaults.
    ///
    /// Intended for seeding fixtures with a fixed public id or admin role.
    pub fn seed(&self, identity: StoredIdentity) {
        read_lock(&self.rows).push(identity);
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError> {
        Ok(read_lock(&self.rows)
            .iter()
            .find(|row| row.identity.email == *email)
            .cloned())
    }

    async fn find_by_public_id(
        &self,
        public_id: Uuid,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError> {
        Ok(read_lock(&self.rows)
            .iter()
            .find(|row| row.identity.public_id == public_id)
            .cloned())
    }

    async fn insert(&self, new: NewIdentity) -> Result<StoredIdentity, IdentityRepositoryError> {
        let mut rows = read_lock(&self.rows);
        if rows.iter().any(|row| row.identity.email == new.email) {
            return Err(IdentityRepositoryError::duplicate_email(
                new.email.as_str(),
            ));
        }
        let stored = StoredIdentity {
            identity: Identity {
                public_id: Uuid::new_v4(),
                email: new.email,
                admin: new.admin,
                registered_on: Utc::now(),
            },
            password_hash: new.password_hash,
        };
        rows.push(stored.clone());
        Ok(stored)
    }
}

/// In-memory octocat store preserving insertion order.
///
/// Owner emails are resolved through the identity repository, mirroring the
/// foreign-key join performed by the Diesel adapter.
pub struct InMemoryOctocatRepository {
    identities: Arc<dyn IdentityRepository>,
    rows: Mutex<Vec<Octocat>>,
}

impl InMemoryOctocatRepository {
    /// Create an empty store resolving owners through `identities`.
    #[must_use]
    pub fn new(identities: Arc<dyn IdentityRepository>) -> Self {
        Self {
            identities,
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Create a store pre-seeded with a single known owner.
    ///
    /// Convenience for unit tests that do not exercise registration.
    #[must_use]
    pub fn with_owner(public_id: Uuid, email: Email) -> Self {
        let identities = InMemoryIdentityRepository::new();
        identities.seed(StoredIdentity {
            identity: Identity {
                public_id,
                email,
                admin: true,
                registered_on: Utc::now(),
            },
            password_hash: String::new(),
        });
        Self::new(Arc::new(identities))
    }
}

#[async_trait]
impl OctocatRepository for InMemoryOctocatRepository {
    async fn find_by_name(
        &self,
        name: &OctocatName,
    ) -> Result<Option<Octocat>, OctocatRepositoryError> {
        Ok(read_lock(&self.rows)
            .iter()
            .find(|row| row.name == *name)
            .cloned())
    }

    async fn insert(&self, new: NewOctocat) -> Result<Octocat, OctocatRepositoryError> {
        let owner = self
            .identities
            .find_by_public_id(new.owner_id)
            .await
            .map_err(|err| OctocatRepositoryError::query(err.to_string()))?
            .ok_or_else(|| {
                OctocatRepositoryError::query(format!("owner {} is not registered", new.owner_id))
            })?;

        let mut rows = read_lock(&self.rows);
        if rows.iter().any(|row| row.name == new.name) {
            return Err(OctocatRepositoryError::duplicate_name(new.name.as_str()));
        }
        let created = Octocat {
            name: new.name,
            url: new.url,
            deadline: new.deadline.as_datetime(),
            owner: Owner {
                email: owner.identity.email,
                public_id: owner.identity.public_id,
            },
            created_at: Utc::now(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        name: &OctocatName,
        changes: OctocatChanges,
    ) -> Result<Octocat, OctocatRepositoryError> {
        let mut rows = read_lock(&self.rows);
        let row = rows
            .iter_mut()
            .find(|row| row.name == *name)
            .ok_or_else(|| OctocatRepositoryError::not_found(name.as_str()))?;
        if let Some(url) = changes.url {
            row.url = url;
        }
        if let Some(deadline) = changes.deadline {
            row.deadline = deadline.as_datetime();
        }
        Ok(row.clone())
    }

    async fn delete(&self, name: &OctocatName) -> Result<(), OctocatRepositoryError> {
        let mut rows = read_lock(&self.rows);
        let position = rows
            .iter()
            .position(|row| row.name == *name)
            .ok_or_else(|| OctocatRepositoryError::not_found(name.as_str()))?;
        rows.remove(position);
        Ok(())
    }

    async fn list(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Octocat>, u64), OctocatRepositoryError> {
        let rows = read_lock(&self.rows);
        let total = rows.len() as u64;
        let items = rows
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }
}

/// In-memory revocation list.
#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    revoked: Mutex<HashSet<Uuid>>,
}

impl InMemoryTokenBlacklist {
    /// Create an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(
        &self,
        token_id: Uuid,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError> {
        read_lock(&self.revoked).insert(token_id);
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenBlacklistError> {
        Ok(read_lock(&self.revoked).contains(&token_id))
    }
}
