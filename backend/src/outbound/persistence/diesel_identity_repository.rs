//! PostgreSQL-backed [`IdentityRepository`] implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{IdentityRepository, IdentityRepositoryError};
use crate::domain::{Email, Identity, NewIdentity, StoredIdentity};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel adapter for the identity store.
#[derive(Clone)]
pub struct DieselIdentityRepository {
    pool: DbPool,
}

impl DieselIdentityRepository {
    /// Create an adapter over `pool`.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdentityRepositoryError {
    IdentityRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: DieselError) -> IdentityRepositoryError {
    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            IdentityRepositoryError::connection("database connection error")
        }
        other => IdentityRepositoryError::query(other.to_string()),
    }
}

fn row_to_identity(row: UserRow) -> Result<StoredIdentity, IdentityRepositoryError> {
    let email = Email::parse(row.email)
        .map_err(|err| IdentityRepositoryError::query(format!("invalid row: {err}")))?;
    Ok(StoredIdentity {
        identity: Identity {
            public_id: row.id,
            email,
            admin: row.is_admin,
            registered_on: row.registered_on,
        },
        password_hash: row.password_hash,
    })
}

#[async_trait]
impl IdentityRepository for DieselIdentityRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        result.map(row_to_identity).transpose()
    }

    async fn find_by_public_id(
        &self,
        public_id: Uuid,
    ) -> Result<Option<StoredIdentity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Option<UserRow> = users::table
            .filter(users::id.eq(public_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        result.map(row_to_identity).transpose()
    }

    async fn insert(&self, new: NewIdentity) -> Result<StoredIdentity, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: new.email.as_str(),
            password_hash: &new.password_hash,
            is_admin: new.admin,
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    IdentityRepositoryError::duplicate_email(new.email.as_str())
                }
                other => map_diesel_error(other),
            })?;
        row_to_identity(inserted)
    }
}
