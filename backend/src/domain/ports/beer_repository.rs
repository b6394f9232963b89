//! Port abstraction for beers within an event.
use async_trait::async_trait;

use crate::domain::{Beer, BeerId, EventId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by beer repository adapters.
    pub enum BeerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "beer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "beer repository query failed: {message}",
    }
}

/// Storage for beers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeerRepository: Send + Sync {
    /// Insert a beer.
    async fn insert(&self, beer: &Beer) -> Result<(), BeerPersistenceError>;

    /// Fetch a beer only if it belongs to `event_id`.
    async fn find_in_event(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Option<Beer>, BeerPersistenceError>;

    /// Beers of an event, oldest first.
    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Beer>, BeerPersistenceError>;
}
