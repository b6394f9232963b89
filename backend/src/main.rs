//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API with its OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use tasting_backend::inbound::http::health::HealthState;
use tasting_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    if let Err(e) = color_eyre::install() {
        warn!(error = %e, "error report hook install failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load configuration: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::other(format!("invalid bind address: {e}")))?;

    let mut config = ServerConfig::new(bind_addr)
        .with_trusted_identity_headers(settings.trust_identity_headers);
    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations {
            migrate(&pool_config).await?;
        }
        let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}

/// Apply pending migrations on a blocking thread before the server binds.
async fn migrate(pool_config: &PoolConfig) -> io::Result<()> {
    let database_url = pool_config.database_url().to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;
    info!(applied, "database schema is current");
    Ok(())
}
