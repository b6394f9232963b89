//! PostgreSQL adapters built on Diesel, `diesel-async` and bb8.
//!
//! Each repository translates between Diesel rows and domain types and maps
//! database failures onto its port error. Rows and the table DSL stay private
//! to this module. Unique indexes and foreign keys in the migrations are the
//! constraints the services rely on for race safety.
//!
//! # Example
//!
//! ```no_run
//! use tasting_backend::outbound::persistence::{DbPool, DieselEventRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tasting")).await?;
//! let events = DieselEventRepository::new(pool);
//! # let _ = events;
//! # Ok(())
//! # }
//! ```

mod diesel_beer_repository;
mod diesel_event_repository;
mod diesel_favorite_repository;
pub(crate) mod diesel_helpers;
mod diesel_participant_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_beer_repository::DieselBeerRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_favorite_repository::DieselFavoriteRepository;
pub use diesel_participant_repository::DieselParticipantRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
