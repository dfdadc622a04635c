//! Diesel row structs, internal to the persistence adapters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{blacklisted_tokens, octocats, users};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub registered_on: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(super) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = octocats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct OctocatRow {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub deadline: DateTime<Utc>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = octocats)]
pub(super) struct NewOctocatRow<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub deadline: DateTime<Utc>,
    pub owner_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = octocats)]
pub(super) struct OctocatChangesRow {
    pub url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blacklisted_tokens)]
pub(super) struct NewBlacklistedTokenRow {
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}
