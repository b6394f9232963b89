//! Review Ledger: one review per (event, beer, user), frozen for non-managers
//! while the event is closed.
//!
//! Updates are compare-and-swap on the review version. A lost race surfaces as
//! a conflict instead of silently overwriting the concurrent write.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use super::ledger_support::{
    GuardedEvent, beer_not_found, load_guarded, map_beer_error, map_review_error,
};
use super::ports::{
    BeerRepository, EventRepository, ParticipantRepository, ReviewLedger, ReviewPersistenceError,
    ReviewRepository,
};
use super::{
    BeerId, Caller, Error, EventId, EventStatus, Review, ReviewDraft, ReviewInput, ReviewPatch,
};

/// Review service implementing [`ReviewLedger`].
pub struct ReviewService<E, P, B, R> {
    events: Arc<E>,
    participants: Arc<P>,
    beers: Arc<B>,
    reviews: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<E, P, B, R> ReviewService<E, P, B, R> {
    /// Create a service over its repositories.
    pub fn new(
        events: Arc<E>,
        participants: Arc<P>,
        beers: Arc<B>,
        reviews: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            participants,
            beers,
            reviews,
            clock,
        }
    }
}

fn review_not_found() -> Error {
    Error::not_found("you have not reviewed this beer")
}

fn closed_event_gate(guarded: &GuardedEvent) -> Result<(), Error> {
    if guarded.event.status == EventStatus::Closed && !guarded.access.is_manager() {
        return Err(Error::conflict("review updates are blocked while the event is closed"));
    }
    Ok(())
}

fn version_conflict(expected: u32, actual: u32) -> Error {
    Error::conflict("review was changed by another request").with_details(json!({
        "code": "review_version_conflict",
        "expectedVersion": expected,
        "actualVersion": actual,
    }))
}

impl<E, P, B, R> ReviewService<E, P, B, R>
where
    E: EventRepository,
    P: ParticipantRepository,
    B: BeerRepository,
    R: ReviewRepository,
{
    async fn guarded(&self, caller: &Caller, event_id: &EventId) -> Result<GuardedEvent, Error> {
        let guarded = load_guarded(
            self.events.as_ref(),
            self.participants.as_ref(),
            caller,
            event_id,
        )
        .await?;
        guarded.access.require_granted()?;
        Ok(guarded)
    }

    async fn require_beer(&self, event_id: &EventId, beer_id: &BeerId) -> Result<(), Error> {
        self.beers
            .find_in_event(event_id, beer_id)
            .await
            .map_err(map_beer_error)?
            .map(|_| ())
            .ok_or_else(|| beer_not_found(beer_id))
    }

    async fn existing(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Review, Error> {
        self.reviews
            .find(event_id, beer_id, &caller.user_id)
            .await
            .map_err(map_review_error)?
            .ok_or_else(review_not_found)
    }
}

#[async_trait]
impl<E, P, B, R> ReviewLedger for ReviewService<E, P, B, R>
where
    E: EventRepository,
    P: ParticipantRepository,
    B: BeerRepository,
    R: ReviewRepository,
{
    async fn create(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
        input: ReviewInput,
    ) -> Result<Review, Error> {
        let guarded = self.guarded(caller, event_id).await?;
        closed_event_gate(&guarded)?;
        let draft = ReviewDraft::new(&input)?;
        self.require_beer(event_id, beer_id).await?;

        let review = draft.into_review(*event_id, *beer_id, caller.user_id, self.clock.utc());
        match self.reviews.insert(&review).await {
            Ok(()) => Ok(review),
            Err(ReviewPersistenceError::DuplicateKey { message }) => {
                debug!(%message, beer_id = %beer_id, user_id = %caller.user_id, "review already exists");
                Err(Error::conflict("you have already reviewed this beer")
                    .with_details(json!({ "code": "review_exists" })))
            }
            Err(other) => Err(map_review_error(other)),
        }
    }

    async fn get(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Review, Error> {
        self.guarded(caller, event_id).await?;
        self.require_beer(event_id, beer_id).await?;
        self.existing(caller, event_id, beer_id).await
    }

    async fn update(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
        input: ReviewInput,
    ) -> Result<Review, Error> {
        let guarded = self.guarded(caller, event_id).await?;
        closed_event_gate(&guarded)?;
        let patch = ReviewPatch::new(&input)?;
        self.require_beer(event_id, beer_id).await?;
        let current = self.existing(caller, event_id, beer_id).await?;

        let Some(updated) = current.apply(&patch, self.clock.utc()) else {
            debug!(review_id = %current.id, "review patch changed nothing; no write");
            return Ok(current);
        };
        match self.reviews.update(&updated, current.version).await {
            Ok(()) => Ok(updated),
            Err(ReviewPersistenceError::VersionMismatch { expected, actual }) => {
                warn!(review_id = %current.id, expected, actual, "review version conflict");
                Err(version_conflict(expected, actual))
            }
            Err(ReviewPersistenceError::NotFound) => Err(review_not_found()),
            Err(other) => Err(map_review_error(other)),
        }
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
