//! Favorite Ledger: idempotent add and remove plus access-scoped listings.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::ledger_support::{beer_not_found, load_guarded, map_beer_error, map_favorite_error};
use super::ports::{
    BeerRepository, EventRepository, FavoriteLedger, FavoritePersistenceError, FavoriteRepository,
    ParticipantRepository,
};
use super::{BeerId, Caller, Error, EventId, Favorite, FavoriteSummary};

/// Favourite service implementing [`FavoriteLedger`].
pub struct FavoriteService<E, P, B, F> {
    events: Arc<E>,
    participants: Arc<P>,
    beers: Arc<B>,
    favorites: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<E, P, B, F> FavoriteService<E, P, B, F> {
    /// Create a service over its repositories.
    pub fn new(
        events: Arc<E>,
        participants: Arc<P>,
        beers: Arc<B>,
        favorites: Arc<F>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            participants,
            beers,
            favorites,
            clock,
        }
    }
}

impl<E, P, B, F> FavoriteService<E, P, B, F>
where
    E: EventRepository,
    P: ParticipantRepository,
    B: BeerRepository,
    F: FavoriteRepository,
{
    /// Guard the event, then check the beer belongs to it.
    async fn authorise(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<(), Error> {
        load_guarded(self.events.as_ref(), self.participants.as_ref(), caller, event_id)
            .await?
            .access
            .require_granted()?;
        self.beers
            .find_in_event(event_id, beer_id)
            .await
            .map_err(map_beer_error)?
            .map(|_| ())
            .ok_or_else(|| beer_not_found(beer_id))
    }
}

#[async_trait]
impl<E, P, B, F> FavoriteLedger for FavoriteService<E, P, B, F>
where
    E: EventRepository,
    P: ParticipantRepository,
    B: BeerRepository,
    F: FavoriteRepository,
{
    async fn add(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<(), Error> {
        self.authorise(caller, event_id, beer_id).await?;
        let favorite = Favorite::new(*event_id, *beer_id, caller.user_id, self.clock.utc());
        match self.favorites.insert(&favorite).await {
            Ok(()) => Ok(()),
            Err(FavoritePersistenceError::DuplicateKey { .. }) => {
                debug!(beer_id = %beer_id, user_id = %caller.user_id, "favorite already present");
                Ok(())
            }
            Err(other) => Err(map_favorite_error(other)),
        }
    }

    async fn remove(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<(), Error> {
        self.authorise(caller, event_id, beer_id).await?;
        let removed = self
            .favorites
            .delete(event_id, beer_id, &caller.user_id)
            .await
            .map_err(map_favorite_error)?;
        if !removed {
            debug!(beer_id = %beer_id, user_id = %caller.user_id, "favorite already absent");
        }
        Ok(())
    }

    async fn list_mine(&self, caller: &Caller, event_id: &EventId) -> Result<Vec<BeerId>, Error> {
        load_guarded(self.events.as_ref(), self.participants.as_ref(), caller, event_id)
            .await?
            .access
            .require_granted()?;
        self.favorites
            .list_beer_ids(event_id, &caller.user_id)
            .await
            .map_err(map_favorite_error)
    }

    async fn list_all_mine(&self, caller: &Caller) -> Result<Vec<FavoriteSummary>, Error> {
        self.favorites
            .list_accessible(&caller.user_id)
            .await
            .map_err(map_favorite_error)
    }
}

#[cfg(test)]
#[path = "favorite_service_tests.rs"]
mod tests;
