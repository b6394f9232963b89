//! HTTP server configuration object and helpers.

use std::net::{AddrParseError, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tasting_backend::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Startup settings loaded from CLI flags, `TASTING_*` variables and an
/// optional configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TASTING")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Cap on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply pending migrations before binding.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Trust the identity headers forwarded by the fronting proxy.
    #[ortho_config(default = false)]
    pub trust_identity_headers: bool,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    /// Pool settings when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url).with_max_size(
                self.db_max_connections
                    .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            )
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) trust_identity_headers: bool,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr`.
    ///
    /// Without a pool the server runs over the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            trust_identity_headers: false,
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Set whether identity proxy headers are trusted.
    #[must_use]
    pub fn with_trusted_identity_headers(mut self, trusted: bool) -> Self {
        self.trust_identity_headers = trusted;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(
            dead_code,
            reason = "Exercised by integration tests; retained for fixture access"
        )
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
