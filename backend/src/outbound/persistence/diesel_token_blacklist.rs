//! PostgreSQL-backed [`TokenBlacklist`] implementation.
//!
//! Revocations are keyed by `jti`; re-revoking is a no-op. Rows whose
//! `expires_at` has passed are dead weight only, since expired tokens are
//! rejected by signature validation before the blacklist is consulted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TokenBlacklist, TokenBlacklistError};

use super::models::NewBlacklistedTokenRow;
use super::pool::DbPool;
use super::schema::blacklisted_tokens;

/// Diesel adapter for the token revocation list.
#[derive(Clone)]
pub struct DieselTokenBlacklist {
    pool: DbPool,
}

impl DieselTokenBlacklist {
    /// Create an adapter over `pool`.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for DieselTokenBlacklist {
    async fn revoke(
        &self,
        token_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| TokenBlacklistError::backend(err.to_string()))?;
        diesel::insert_into(blacklisted_tokens::table)
            .values(&NewBlacklistedTokenRow {
                jti: token_id,
                expires_at,
            })
            .on_conflict(blacklisted_tokens::jti)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| TokenBlacklistError::backend(err.to_string()))?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenBlacklistError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| TokenBlacklistError::backend(err.to_string()))?;
        diesel::select(exists(
            blacklisted_tokens::table.filter(blacklisted_tokens::jti.eq(token_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| TokenBlacklistError::backend(err.to_string()))
    }
}
