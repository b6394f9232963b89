//! Event membership records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::event::UnknownLabel;
use super::{EventId, Nickname, UserId};

/// Role a participant holds in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creator; one per event, never removed.
    Owner,
    /// Joined through the code.
    Member,
}

impl Role {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(UnknownLabel::new("participant role", other)),
        }
    }
}

/// Membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Reserved; nothing creates it.
    Invited,
    /// Full participant.
    Active,
    /// Removed by a manager; retains no access.
    Removed,
}

impl ParticipantStatus {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }
}

impl FromStr for ParticipantStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "active" => Ok(Self::Active),
            "removed" => Ok(Self::Removed),
            other => Err(UnknownLabel::new("participant status", other)),
        }
    }
}

/// One user's membership in one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Event joined.
    pub event_id: EventId,
    /// Member.
    pub user_id: UserId,
    /// Role held.
    pub role: Role,
    /// Current status.
    pub status: ParticipantStatus,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
    /// Set while the status is `Removed`.
    pub removed_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Active owner row written alongside a new event.
    #[must_use]
    pub fn owner(event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id,
            role: Role::Owner,
            status: ParticipantStatus::Active,
            joined_at: now,
            removed_at: None,
        }
    }

    /// Active member row written on a successful join.
    #[must_use]
    pub fn member(event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            role: Role::Member,
            ..Self::owner(event_id, user_id, now)
        }
    }

    /// True for an active membership.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }

    /// Copy marked removed at `now`.
    #[must_use]
    pub fn removed(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: ParticipantStatus::Removed,
            removed_at: Some(now),
            ..self.clone()
        }
    }

    /// Copy made active with no removal timestamp.
    #[must_use]
    pub fn activated(&self) -> Self {
        Self {
            status: ParticipantStatus::Active,
            removed_at: None,
            ..self.clone()
        }
    }

    /// Copy reactivated after a removal.
    #[must_use]
    pub fn restored(&self) -> Self {
        self.activated()
    }
}

/// Participant joined with the member's nickname for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    /// Membership row.
    pub participant: Participant,
    /// Member's nickname, if set.
    pub nickname: Option<Nickname>,
}
