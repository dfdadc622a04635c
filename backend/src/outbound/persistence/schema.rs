//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the embedded migrations exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered identities.
    users (id) {
        /// Stable public identifier (UUID v4).
        id -> Uuid,
        /// Unique email address.
        email -> Varchar,
        /// Argon2 PHC-format password hash.
        password_hash -> Text,
        /// Whether the identity holds the administrator role.
        is_admin -> Bool,
        /// Registration timestamp.
        registered_on -> Timestamptz,
    }
}

diesel::table! {
    /// The octocat collection.
    ///
    /// The serial primary key fixes creation order for listing; `name` is
    /// the resource's stable key and carries a unique constraint.
    octocats (id) {
        /// Serial primary key, also the listing order.
        id -> Int8,
        /// Unique resource name.
        name -> Varchar,
        /// Informational URL.
        url -> Text,
        /// End-of-day UTC deadline.
        deadline -> Timestamptz,
        /// Creating identity.
        owner_id -> Uuid,
        /// Server-assigned creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Revoked access tokens, keyed by `jti`.
    blacklisted_tokens (jti) {
        /// Token identifier from the revoked JWT.
        jti -> Uuid,
        /// Expiry of the revoked token; rows older than this are prunable.
        expires_at -> Timestamptz,
        /// When the token was revoked.
        blacklisted_on -> Timestamptz,
    }
}

diesel::joinable!(octocats -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(users, octocats);
