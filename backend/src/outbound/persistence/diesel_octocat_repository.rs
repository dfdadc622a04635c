//! PostgreSQL-backed [`OctocatRepository`] implementation.
//!
//! A thin adapter: it translates between Diesel rows and domain types and
//! maps database failures to the port's error variants. The unique index on
//! `octocats.name` is what enforces name uniqueness; the adapter only
//! recognises the violation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{OctocatRepository, OctocatRepositoryError};
use crate::domain::{Email, InfoUrl, NewOctocat, Octocat, OctocatChanges, OctocatName, Owner};

use super::models::{NewOctocatRow, OctocatChangesRow, OctocatRow};
use super::pool::{DbPool, PoolError};
use super::schema::{octocats, users};

/// Diesel adapter for the octocat store.
#[derive(Clone)]
pub struct DieselOctocatRepository {
    pool: DbPool,
}

impl DieselOctocatRepository {
    /// Create an adapter over `pool`.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OctocatRepositoryError {
    OctocatRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: DieselError) -> OctocatRepositoryError {
    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            OctocatRepositoryError::connection("database connection error")
        }
        other => OctocatRepositoryError::query(other.to_string()),
    }
}

/// Stored rows were validated on the way in, so a conversion failure means
/// the row was tampered with outside the application.
fn row_to_octocat(row: OctocatRow, owner_email: String) -> Result<Octocat, OctocatRepositoryError> {
    let invalid =
        |err: &dyn std::fmt::Display| OctocatRepositoryError::query(format!("invalid row: {err}"));
    let name = OctocatName::new(row.name).map_err(|err| invalid(&err))?;
    let url = InfoUrl::parse(row.url).map_err(|err| invalid(&err))?;
    let email = Email::parse(owner_email).map_err(|err| invalid(&err))?;
    Ok(Octocat {
        name,
        url,
        deadline: row.deadline,
        owner: Owner {
            email,
            public_id: row.owner_id,
        },
        created_at: row.created_at,
    })
}

#[async_trait]
impl OctocatRepository for DieselOctocatRepository {
    async fn find_by_name(
        &self,
        name: &OctocatName,
    ) -> Result<Option<Octocat>, OctocatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Option<(OctocatRow, String)> = octocats::table
            .inner_join(users::table)
            .filter(octocats::name.eq(name.as_str()))
            .select((OctocatRow::as_select(), users::email))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        result
            .map(|(row, email)| row_to_octocat(row, email))
            .transpose()
    }

    async fn insert(&self, new: NewOctocat) -> Result<Octocat, OctocatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewOctocatRow {
            name: new.name.as_str(),
            url: new.url.as_str(),
            deadline: new.deadline.as_datetime(),
            owner_id: new.owner_id,
        };
        let inserted: OctocatRow = diesel::insert_into(octocats::table)
            .values(&row)
            .returning(OctocatRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    OctocatRepositoryError::duplicate_name(new.name.as_str())
                }
                other => map_diesel_error(other),
            })?;
        let owner_email: String = users::table
            .filter(users::id.eq(inserted.owner_id))
            .select(users::email)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_octocat(inserted, owner_email)
    }

    async fn update(
        &self,
        name: &OctocatName,
        changes: OctocatChanges,
    ) -> Result<Octocat, OctocatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes_row = OctocatChangesRow {
            url: changes.url.map(|url| url.as_str().to_owned()),
            deadline: changes.deadline.map(|deadline| deadline.as_datetime()),
        };
        let updated = diesel::update(octocats::table.filter(octocats::name.eq(name.as_str())))
            .set(&changes_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(OctocatRepositoryError::not_found(name.as_str()));
        }
        drop(conn);
        self.find_by_name(name)
            .await?
            .ok_or_else(|| OctocatRepositoryError::not_found(name.as_str()))
    }

    async fn delete(&self, name: &OctocatName) -> Result<(), OctocatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(octocats::table.filter(octocats::name.eq(name.as_str())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(OctocatRepositoryError::not_found(name.as_str()));
        }
        Ok(())
    }

    async fn list(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Octocat>, u64), OctocatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = octocats::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(OctocatRow, String)> = octocats::table
            .inner_join(users::table)
            .order(octocats::id.asc())
            .offset(i64::try_from(offset).unwrap_or(i64::MAX))
            .limit(i64::from(limit))
            .select((OctocatRow::as_select(), users::email))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(|(row, email)| row_to_octocat(row, email))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, u64::try_from(total).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::Checkout {
            message: "connection refused".to_owned(),
        });
        assert!(matches!(err, OctocatRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, OctocatRepositoryError::Query { .. }));
    }

    #[rstest]
    fn valid_rows_convert_to_domain_octocats() {
        let row = OctocatRow {
            id: 1,
            name: "octocat1".to_owned(),
            url: "http://www.one.com".to_owned(),
            deadline: Utc::now(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let octocat = row_to_octocat(row, "admin@test.com".to_owned()).expect("row converts");
        assert_eq!(octocat.name.as_str(), "octocat1");
        assert_eq!(octocat.owner.email.as_str(), "admin@test.com");
    }

    #[rstest]
    fn corrupted_rows_surface_as_query_errors() {
        let row = OctocatRow {
            id: 1,
            name: "has space".to_owned(),
            url: "http://www.one.com".to_owned(),
            deadline: Utc::now(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let err =
            row_to_octocat(row, "admin@test.com".to_owned()).expect_err("invalid name rejected");
        assert!(matches!(err, OctocatRepositoryError::Query { .. }));
    }
}
