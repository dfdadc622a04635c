//! HTTP server configuration object.

use std::net::SocketAddr;

use chrono::Duration;

use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Vec<u8>,
    pub(crate) token_ttl: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration with no database pool attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Vec<u8>, token_ttl: Duration) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// With a pool, the server uses the Diesel adapters; without one it
    /// falls back to the in-memory adapters (development and tests).
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
