//! Fixtures for HTTP-level tests.
//!
//! Builds an [`HttpState`] over the in-memory adapters with one admin and
//! one non-admin identity seeded, plus helpers for minting their bearer
//! tokens. Enabled for the crate's own tests and, via the `test-support`
//! feature, for the integration tests under `tests/`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{TokenService, hash_password};
use crate::domain::{Email, Identity, StoredIdentity};
use crate::inbound::http::HttpState;
use crate::outbound::memory::{
    InMemoryIdentityRepository, InMemoryOctocatRepository, InMemoryTokenBlacklist,
};

/// Email of the seeded administrator.
pub const ADMIN_EMAIL: &str = "admin@test.com";
/// Password of the seeded administrator.
pub const ADMIN_PASSWORD: &str = "admin-password";
/// Email of the seeded non-admin identity.
pub const MEMBER_EMAIL: &str = "member@test.com";
/// Password of the seeded non-admin identity.
pub const MEMBER_PASSWORD: &str = "member-password";

const TEST_SECRET: &[u8] = b"test-signing-secret";

/// Seeded application state plus the identities it was seeded with.
pub struct TestHarness {
    /// Handler state over in-memory adapters.
    pub state: HttpState,
    /// The seeded administrator.
    pub admin: Identity,
    /// The seeded non-admin identity.
    pub member: Identity,
}

impl TestHarness {
    /// Build a harness with a one-hour token lifetime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_token_ttl(Duration::hours(1))
    }

    /// Build a harness issuing tokens valid for `ttl`.
    ///
    /// A non-positive `ttl` produces already-expired tokens, which is how
    /// the expiry paths are tested.
    #[must_use]
    pub fn with_token_ttl(ttl: Duration) -> Self {
        let identities = Arc::new(InMemoryIdentityRepository::new());
        let admin = seed_identity(&identities, ADMIN_EMAIL, ADMIN_PASSWORD, true);
        let member = seed_identity(&identities, MEMBER_EMAIL, MEMBER_PASSWORD, false);
        let octocats = Arc::new(InMemoryOctocatRepository::new(identities.clone()));
        let blacklist = Arc::new(InMemoryTokenBlacklist::new());
        let state = HttpState::new(
            octocats,
            identities,
            blacklist,
            TokenService::new(TEST_SECRET, ttl),
        );
        Self {
            state,
            admin,
            member,
        }
    }

    /// Mint a bearer token for the seeded administrator.
    #[must_use]
    pub fn admin_token(&self) -> String {
        self.mint(&self.admin)
    }

    /// Mint a bearer token for the seeded non-admin identity.
    #[must_use]
    pub fn member_token(&self) -> String {
        self.mint(&self.member)
    }

    fn mint(&self, identity: &Identity) -> String {
        #[expect(clippy::expect_used, reason = "fixture signing key is always valid")]
        let issued = self
            .state
            .tokens
            .issue(identity)
            .expect("token issuance succeeds for fixtures");
        issued.token
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_identity(
    repo: &InMemoryIdentityRepository,
    email: &str,
    password: &str,
    admin: bool,
) -> Identity {
    #[expect(clippy::expect_used, reason = "fixture values are well formed")]
    let identity = Identity {
        public_id: Uuid::new_v4(),
        email: Email::parse(email).expect("fixture email is valid"),
        admin,
        registered_on: Utc::now(),
    };
    #[expect(clippy::expect_used, reason = "fixture values are well formed")]
    let password_hash = hash_password(password).expect("fixture password hashes");
    repo.seed(StoredIdentity {
        identity: identity.clone(),
        password_hash,
    });
    identity
}
