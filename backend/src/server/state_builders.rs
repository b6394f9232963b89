//! Builders for the HTTP state over the configured storage adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use tasting_backend::domain::{JoinCodeSource, RandomJoinCodeSource};
use tasting_backend::inbound::http::state::{HttpState, HttpStatePorts, Repositories};
use tasting_backend::outbound::memory::MemoryStore;
use tasting_backend::outbound::persistence::{
    DbPool, DieselBeerRepository, DieselEventRepository, DieselFavoriteRepository,
    DieselParticipantRepository, DieselReviewRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Build the service ports over a pool when one is configured, otherwise over
/// a fresh in-memory store.
fn build_ports_with_pool<Pool>(
    pool: &Option<Pool>,
    make_ports: impl FnOnce(&Pool, Arc<dyn JoinCodeSource>, Arc<dyn Clock>) -> HttpStatePorts,
    codes: Arc<dyn JoinCodeSource>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts {
    match pool {
        Some(pool) => make_ports(pool, codes, clock),
        None => {
            warn!("no database configured; state lives in memory and is lost on restart");
            Repositories::shared(Arc::new(MemoryStore::new())).into_ports(codes, clock)
        }
    }
}

fn diesel_ports(
    pool: &DbPool,
    codes: Arc<dyn JoinCodeSource>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        participants: Arc::new(DieselParticipantRepository::new(pool.clone())),
        beers: Arc::new(DieselBeerRepository::new(pool.clone())),
        favorites: Arc::new(DieselFavoriteRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
    }
    .into_ports(codes, clock)
}

/// Build the shared HTTP state from the configured storage.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = build_ports_with_pool(
        &config.db_pool,
        diesel_ports,
        Arc::new(RandomJoinCodeSource::new()),
        Arc::new(DefaultClock),
    );
    web::Data::new(HttpState::new(ports).trusting_identity_headers(config.trust_identity_headers))
}
