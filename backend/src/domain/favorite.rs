//! Favourite markers and their cross-event read model.

use chrono::{DateTime, Utc};

use super::{BeerId, EventId, EventStatus, UserId};

/// One user's favourite mark on one beer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    /// Event the beer belongs to.
    pub event_id: EventId,
    /// Favourited beer.
    pub beer_id: BeerId,
    /// Owner of the mark.
    pub user_id: UserId,
    /// When the mark was made.
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// New mark made at `now`.
    #[must_use]
    pub const fn new(event_id: EventId, beer_id: BeerId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            event_id,
            beer_id,
            user_id,
            created_at: now,
        }
    }
}

/// Favourite joined with its beer and event for the global listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteSummary {
    /// Event id.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Event status at read time.
    pub event_status: EventStatus,
    /// Beer id.
    pub beer_id: BeerId,
    /// Beer name.
    pub beer_name: String,
    /// Brewery.
    pub brewery: Option<String>,
    /// Style.
    pub style: Option<String>,
    /// Alcohol by volume.
    pub abv: Option<f64>,
    /// When the favourite was made.
    pub favorited_at: DateTime<Utc>,
}
