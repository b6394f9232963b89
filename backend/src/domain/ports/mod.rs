//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by the outbound adapters.
//! Driving ports (`IdentityResolver` and the ledgers) are implemented by the
//! domain services and consumed by the HTTP handlers.

mod macros;
pub(crate) use macros::define_port_error;

mod beer_catalog;
mod beer_repository;
mod event_lifecycle;
mod event_repository;
mod favorite_ledger;
mod favorite_repository;
mod identity_resolver;
mod membership_ledger;
mod participant_repository;
mod review_ledger;
mod review_repository;
mod user_repository;

#[cfg(test)]
pub use beer_catalog::MockBeerCatalog;
pub use beer_catalog::{AddBeerRequest, BeerCatalog};
#[cfg(test)]
pub use beer_repository::MockBeerRepository;
pub use beer_repository::{BeerPersistenceError, BeerRepository};
#[cfg(test)]
pub use event_lifecycle::MockEventLifecycle;
pub use event_lifecycle::{CreateEventRequest, EventDetails, EventLifecycle, ViewerRole};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventPersistenceError, EventRepository};
#[cfg(test)]
pub use favorite_ledger::MockFavoriteLedger;
pub use favorite_ledger::FavoriteLedger;
#[cfg(test)]
pub use favorite_repository::MockFavoriteRepository;
pub use favorite_repository::{FavoritePersistenceError, FavoriteRepository};
#[cfg(test)]
pub use identity_resolver::MockIdentityResolver;
pub use identity_resolver::IdentityResolver;
#[cfg(test)]
pub use membership_ledger::MockMembershipLedger;
pub use membership_ledger::{JoinOutcome, MembershipLedger};
#[cfg(test)]
pub use participant_repository::MockParticipantRepository;
pub use participant_repository::{ParticipantPersistenceError, ParticipantRepository};
#[cfg(test)]
pub use review_ledger::MockReviewLedger;
pub use review_ledger::ReviewLedger;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewPersistenceError, ReviewRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
