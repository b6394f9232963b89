//! Port abstraction for event persistence.
//!
//! Creation writes the event and its owner participant together, and deletion
//! removes everything hanging off the event, so both are single operations on
//! the port rather than sequences the service would have to roll back.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, EventStatus, JoinCode, Participant, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by event repository adapters.
    pub enum EventPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
        /// The join code is already used by another event.
        DuplicateKey { message: String } => "event conflicts with an existing row: {message}",
    }
}

/// Storage for tasting events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert `event` and its `owner` participant atomically.
    async fn insert_with_owner(
        &self,
        event: &Event,
        owner: &Participant,
    ) -> Result<(), EventPersistenceError>;

    /// Fetch an event by identifier.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError>;

    /// True when any event already uses `code`.
    async fn join_code_exists(&self, code: &JoinCode) -> Result<bool, EventPersistenceError>;

    /// Events the user owns or actively participates in, newest first.
    async fn list_for_member(&self, user_id: &UserId) -> Result<Vec<Event>, EventPersistenceError>;

    /// Open, publicly visible, listed events, newest first, excluding those
    /// the user has been removed from.
    async fn list_discoverable(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventPersistenceError>;

    /// Set the status and bump `updated_at`.
    async fn update_status(
        &self,
        id: &EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> Result<(), EventPersistenceError>;

    /// Delete favourites, reviews, beers, participants and the event in one
    /// transaction. Returns `false` when the event did not exist.
    async fn delete_cascade(&self, id: &EventId) -> Result<bool, EventPersistenceError>;
}
