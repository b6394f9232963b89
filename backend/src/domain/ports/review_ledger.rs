//! Driving port for reviews.

use async_trait::async_trait;

use crate::domain::{BeerId, Caller, Error, EventId, Review, ReviewInput};

/// Review use cases.
///
/// While an event is closed only managers may create or update reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewLedger: Send + Sync {
    /// Create the caller's review; a second create is a conflict.
    async fn create(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
        input: ReviewInput,
    ) -> Result<Review, Error>;

    /// The caller's review of a beer.
    async fn get(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Review, Error>;

    /// Apply the supplied fields to the caller's review.
    async fn update(
        &self,
        caller: &Caller,
        event_id: &EventId,
        beer_id: &BeerId,
        input: ReviewInput,
    ) -> Result<Review, Error>;
}
