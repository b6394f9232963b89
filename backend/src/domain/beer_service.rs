//! Beer catalogue for an event.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ledger_support::{load_guarded, map_beer_error};
use super::ports::{
    AddBeerRequest, BeerCatalog, BeerRepository, EventRepository, ParticipantRepository,
};
use super::{Beer, BeerDraft, Caller, Error, EventId};

/// Beer service implementing [`BeerCatalog`].
pub struct BeerService<E, P, B> {
    events: Arc<E>,
    participants: Arc<P>,
    beers: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<E, P, B> BeerService<E, P, B> {
    /// Create a service over the event, participant and beer repositories.
    pub fn new(
        events: Arc<E>,
        participants: Arc<P>,
        beers: Arc<B>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            participants,
            beers,
            clock,
        }
    }
}

#[async_trait]
impl<E, P, B> BeerCatalog for BeerService<E, P, B>
where
    E: EventRepository,
    P: ParticipantRepository,
    B: BeerRepository,
{
    async fn add(
        &self,
        caller: &Caller,
        event_id: &EventId,
        request: AddBeerRequest,
    ) -> Result<Beer, Error> {
        load_guarded(self.events.as_ref(), self.participants.as_ref(), caller, event_id)
            .await?
            .access
            .require_granted()?;
        let draft = BeerDraft::new(
            &request.name,
            request.brewery.as_deref(),
            request.style.as_deref(),
            request.abv,
        )?;
        let beer = draft.into_beer(*event_id, self.clock.utc());
        self.beers.insert(&beer).await.map_err(map_beer_error)?;
        Ok(beer)
    }

    async fn list(&self, caller: &Caller, event_id: &EventId) -> Result<Vec<Beer>, Error> {
        load_guarded(self.events.as_ref(), self.participants.as_ref(), caller, event_id)
            .await?
            .access
            .require_granted()?;
        self.beers
            .list_for_event(event_id)
            .await
            .map_err(map_beer_error)
    }
}
