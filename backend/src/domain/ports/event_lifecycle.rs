//! Driving port for creating, reading and managing events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Caller, Error, Event, EventId, ParticipantView, TargetStatus, Visibility,
};

/// Request to create an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventRequest {
    /// Raw name; trimmed and bounded by the service.
    pub name: String,
    /// Requested visibility.
    pub visibility: Visibility,
    /// Whether to list the event publicly.
    pub is_listed: bool,
}

/// How the caller relates to an event they can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// Owns the event.
    Owner,
    /// Active participant.
    Member,
    /// Admin without ownership.
    Admin,
}

/// Event with its participants, as seen by one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    /// The event.
    pub event: Event,
    /// Caller's relation to it.
    pub viewer_role: ViewerRole,
    /// Every participant row, oldest join first.
    pub participants: Vec<ParticipantView>,
}

/// Use cases over the event aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLifecycle: Send + Sync {
    /// Create an event owned by the caller.
    async fn create(
        &self,
        caller: &Caller,
        request: CreateEventRequest,
    ) -> Result<EventDetails, Error>;

    /// Event details; requires access.
    async fn details(&self, caller: &Caller, event_id: &EventId) -> Result<EventDetails, Error>;

    /// Events the caller owns or actively participates in.
    async fn list_mine(&self, caller: &Caller) -> Result<Vec<Event>, Error>;

    /// Discoverable open events.
    async fn list_open(&self, caller: &Caller) -> Result<Vec<Event>, Error>;

    /// Move between open and closed; managers only.
    async fn change_status(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: TargetStatus,
    ) -> Result<Event, Error>;

    /// Delete the event and everything attached to it; managers only.
    async fn delete(&self, caller: &Caller, event_id: &EventId) -> Result<(), Error>;
}
