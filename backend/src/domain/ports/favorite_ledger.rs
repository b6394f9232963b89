//! Driving port for favourites.

use async_trait::async_trait;

use crate::domain::{BeerId, Caller, Error, EventId, FavoriteSummary};

/// Favourite use cases; add and remove are idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteLedger: Send + Sync {
    /// Mark a beer as a favourite.
    async fn add(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<(), Error>;

    /// Clear a favourite mark.
    async fn remove(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<(), Error>;

    /// Beers the caller favourited in one event.
    async fn list_mine(&self, caller: &Caller, event_id: &EventId) -> Result<Vec<BeerId>, Error>;

    /// The caller's favourites across every event they can still access.
    async fn list_all_mine(&self, caller: &Caller) -> Result<Vec<FavoriteSummary>, Error>;
}
