//! Port abstraction for event membership rows.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EventId, Participant, ParticipantView, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by participant repository adapters.
    pub enum ParticipantPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "participant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "participant repository query failed: {message}",
        /// A row for the (event, user) pair already exists.
        DuplicateKey { message: String } => "participant already exists: {message}",
    }
}

/// Storage for (event, user) membership rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Fetch the row for one user in one event.
    async fn find(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Option<Participant>, ParticipantPersistenceError>;

    /// All rows for an event with member nicknames, oldest join first.
    async fn list_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<ParticipantView>, ParticipantPersistenceError>;

    /// Insert a row; an existing pair yields `DuplicateKey`.
    async fn insert(&self, participant: &Participant) -> Result<(), ParticipantPersistenceError>;

    /// Persist status and removal time, bumping the event's `updated_at`.
    async fn update_status(
        &self,
        participant: &Participant,
        now: DateTime<Utc>,
    ) -> Result<(), ParticipantPersistenceError>;
}
