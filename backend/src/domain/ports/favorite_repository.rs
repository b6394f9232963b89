//! Port abstraction for favourite marks.
use async_trait::async_trait;

use crate::domain::{BeerId, EventId, Favorite, FavoriteSummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by favourite repository adapters.
    pub enum FavoritePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "favorite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "favorite repository query failed: {message}",
        /// The user already favourited the beer.
        DuplicateKey { message: String } => "favorite already exists: {message}",
    }
}

/// Storage for favourites, unique per (user, beer).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert a mark; an existing one yields `DuplicateKey`.
    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError>;

    /// Delete a mark, returning whether a row was removed.
    async fn delete(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<bool, FavoritePersistenceError>;

    /// Beers the user favourited in one event.
    async fn list_beer_ids(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Vec<BeerId>, FavoritePersistenceError>;

    /// The user's favourites across events where they are owner or an active
    /// participant, newest first.
    async fn list_accessible(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FavoriteSummary>, FavoritePersistenceError>;
}
