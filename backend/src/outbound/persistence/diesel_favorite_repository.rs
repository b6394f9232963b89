//! PostgreSQL-backed `FavoriteRepository`.
//!
//! The cross-event listing filters on current access at read time. Rows for
//! events the user has been removed from stay in place but are not returned.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FavoritePersistenceError, FavoriteRepository};
use crate::domain::{BeerId, EventId, Favorite, FavoriteSummary, ParticipantStatus, UserId};

use super::diesel_helpers::{convert_rows, map_diesel_error, map_pool_error};
use super::models::{BeerRow, EventRow, FavoriteRow, favorite_summary};
use super::pool::DbPool;
use super::schema::{beer_favorites, event_beers, event_participants, events};

/// Diesel implementation of [`FavoriteRepository`].
#[derive(Clone)]
pub struct DieselFavoriteRepository {
    pool: DbPool,
}

impl DieselFavoriteRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for DieselFavoriteRepository {
    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(beer_favorites::table)
            .values(FavoriteRow::from(favorite))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            beer_favorites::table
                .filter(beer_favorites::user_id.eq(user_id.as_uuid()))
                .filter(beer_favorites::beer_id.eq(beer_id.as_uuid()))
                .filter(beer_favorites::event_id.eq(event_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_beer_ids(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Vec<BeerId>, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<uuid::Uuid> = beer_favorites::table
            .filter(beer_favorites::event_id.eq(event_id.as_uuid()))
            .filter(beer_favorites::user_id.eq(user_id.as_uuid()))
            .select(beer_favorites::beer_id)
            .order_by(beer_favorites::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(BeerId::from_uuid).collect())
    }

    async fn list_accessible(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FavoriteSummary>, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let active_memberships = event_participants::table
            .filter(event_participants::user_id.eq(user_id.as_uuid()))
            .filter(event_participants::status.eq(ParticipantStatus::Active.as_str()))
            .select(event_participants::event_id);
        let rows: Vec<(FavoriteRow, BeerRow, EventRow)> = beer_favorites::table
            .inner_join(event_beers::table.inner_join(events::table))
            .filter(beer_favorites::user_id.eq(user_id.as_uuid()))
            .filter(
                events::owner_user_id
                    .eq(user_id.as_uuid())
                    .or(events::id.eq_any(active_memberships)),
            )
            .select((
                FavoriteRow::as_select(),
                BeerRow::as_select(),
                EventRow::as_select(),
            ))
            .order_by(beer_favorites::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, favorite_summary)
    }
}
