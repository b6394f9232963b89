//! Tasting events and their status state machine.
//!
//! Only `Open` and `Closed` are driven by the public API. `Draft` and
//! `Archived` exist so stored rows round-trip, but no transition leads into or
//! out of them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{TextError, required_text};
use super::{EventId, JoinCode, UserId};

/// Maximum event name length in characters.
pub const EVENT_NAME_MAX_CHARS: usize = 200;

/// Error returned when a stored enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownLabel {
    kind: &'static str,
    value: String,
}

impl UnknownLabel {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being prepared; not reachable through the API.
    Draft,
    /// Accepting joins and reviews.
    Open,
    /// Reviews frozen for non-managers.
    Closed,
    /// Retired; not reachable through the API.
    Archived,
}

impl EventStatus {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for EventStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "archived" => Ok(Self::Archived),
            other => Err(UnknownLabel::new("event status", other)),
        }
    }
}

/// Target of a public status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// Reopen the event.
    Open,
    /// Close the event.
    Closed,
}

impl From<TargetStatus> for EventStatus {
    fn from(value: TargetStatus) -> Self {
        match value {
            TargetStatus::Open => Self::Open,
            TargetStatus::Closed => Self::Closed,
        }
    }
}

impl FromStr for TargetStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(UnknownLabel::new("status", s)),
        }
    }
}

/// Who can discover an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Join code holders only.
    #[default]
    Private,
    /// Discoverable when also listed.
    Open,
}

impl Visibility {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Open => "open",
        }
    }
}

impl FromStr for Visibility {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "open" => Ok(Self::Open),
            other => Err(UnknownLabel::new("visibility", other)),
        }
    }
}

/// Validation failures for event creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    /// Blank name.
    #[error("name must not be empty")]
    EmptyName,
    /// Name longer than [`EVENT_NAME_MAX_CHARS`].
    #[error("name must be at most {EVENT_NAME_MAX_CHARS} characters")]
    NameTooLong,
    /// A private event asked to be listed.
    #[error("private events cannot be listed")]
    PrivateEventListed,
}

/// Trimmed event name of 1..=200 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventName(String);

impl EventName {
    /// Validate and construct a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EventValidationError> {
        required_text(raw.as_ref(), EVENT_NAME_MAX_CHARS)
            .map(Self)
            .map_err(|err| match err {
                TextError::Empty => EventValidationError::EmptyName,
                TextError::TooLong { .. } => EventValidationError::NameTooLong,
            })
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Visibility and listing flag, with `Private ⇒ unlisted` enforced.
///
/// # Examples
/// ```
/// use tasting_backend::domain::{EventListing, Visibility};
///
/// assert!(EventListing::new(Visibility::Open, true).is_ok());
/// assert!(EventListing::new(Visibility::Private, true).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventListing {
    visibility: Visibility,
    is_listed: bool,
}

impl EventListing {
    /// Validate the pair.
    pub fn new(visibility: Visibility, is_listed: bool) -> Result<Self, EventValidationError> {
        if visibility == Visibility::Private && is_listed {
            return Err(EventValidationError::PrivateEventListed);
        }
        Ok(Self {
            visibility,
            is_listed,
        })
    }

    /// Visibility.
    #[must_use]
    pub const fn visibility(self) -> Visibility {
        self.visibility
    }

    /// Listing flag.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        self.is_listed
    }
}

/// A tasting event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Identifier.
    pub id: EventId,
    /// Owning user.
    pub owner_user_id: UserId,
    /// Display name.
    pub name: EventName,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Visibility and listing.
    pub listing: EventListing,
    /// Code required to join.
    pub join_code: JoinCode,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of planning a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Already in the requested state; nothing to write.
    Unchanged,
    /// Move to the given state.
    Changed(EventStatus),
}

/// The current state is not driven by the public state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event status {current:?} cannot be changed through this endpoint")]
pub struct StatusChangeError {
    /// State the event is in.
    pub current: EventStatus,
}

impl Event {
    /// A new event, born `Open`.
    #[must_use]
    pub fn create(
        owner_user_id: UserId,
        name: EventName,
        listing: EventListing,
        join_code: JoinCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::random(),
            owner_user_id,
            name,
            status: EventStatus::Open,
            listing,
            join_code,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decide what a request to move to `target` means for this event.
    pub fn plan_status_change(
        &self,
        target: TargetStatus,
    ) -> Result<StatusTransition, StatusChangeError> {
        let target = EventStatus::from(target);
        match self.status {
            EventStatus::Open | EventStatus::Closed if self.status == target => {
                Ok(StatusTransition::Unchanged)
            }
            EventStatus::Open | EventStatus::Closed => Ok(StatusTransition::Changed(target)),
            current => Err(StatusChangeError { current }),
        }
    }

    /// True when the event is owned by `user_id`.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_user_id == user_id
    }
}
