//! PostgreSQL persistence adapters using Diesel.
//!
//! Thin adapters over the domain ports: Diesel rows and schema definitions
//! stay internal, and every database failure is mapped to the port's error
//! type. Connections come from a bb8 pool via `diesel-async`.

mod diesel_identity_repository;
mod diesel_octocat_repository;
mod diesel_token_blacklist;
mod models;
mod pool;
mod schema;

pub use diesel_identity_repository::DieselIdentityRepository;
pub use diesel_octocat_repository::DieselOctocatRepository;
pub use diesel_token_blacklist::DieselTokenBlacklist;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures while applying embedded migrations.
#[derive(Debug, Error)]
#[error("migration failed: {message}")]
pub struct MigrationError {
    message: String,
}

/// Apply any pending embedded migrations.
///
/// Runs over a dedicated synchronous connection at startup, before the pool
/// is built.
///
/// # Errors
/// [`MigrationError`] when the connection cannot be established or a
/// migration fails to apply.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError {
        message: err.to_string(),
    })?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError {
            message: err.to_string(),
        })?;
    Ok(())
}
