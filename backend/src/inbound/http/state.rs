//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! the domain service, the ports, and the token service, and stay testable
//! without a database.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::TokenService;
use crate::domain::OctocatCatalogue;
use crate::domain::ports::{IdentityRepository, OctocatRepository, TokenBlacklist};
use crate::outbound::memory::{
    InMemoryIdentityRepository, InMemoryOctocatRepository, InMemoryTokenBlacklist,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Octocat lifecycle service.
    pub catalogue: OctocatCatalogue,
    /// Identity store.
    pub identities: Arc<dyn IdentityRepository>,
    /// Token revocation list.
    pub blacklist: Arc<dyn TokenBlacklist>,
    /// Access-token issuance and verification.
    pub tokens: TokenService,
}

impl HttpState {
    /// Assemble state from explicit port implementations.
    #[must_use]
    pub fn new(
        octocats: Arc<dyn OctocatRepository>,
        identities: Arc<dyn IdentityRepository>,
        blacklist: Arc<dyn TokenBlacklist>,
        tokens: TokenService,
    ) -> Self {
        Self {
            catalogue: OctocatCatalogue::new(octocats),
            identities,
            blacklist,
            tokens,
        }
    }

    /// Assemble state over the in-memory adapters.
    ///
    /// Used when the server starts without a configured database, and by
    /// the integration tests.
    #[must_use]
    pub fn in_memory(secret: &[u8], token_ttl: Duration) -> Self {
        let identities: Arc<InMemoryIdentityRepository> =
            Arc::new(InMemoryIdentityRepository::new());
        let octocats = Arc::new(InMemoryOctocatRepository::new(identities.clone()));
        let blacklist = Arc::new(InMemoryTokenBlacklist::new());
        Self::new(
            octocats,
            identities,
            blacklist,
            TokenService::new(secret, token_ttl),
        )
    }
}
