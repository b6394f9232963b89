//! PostgreSQL-backed `BeerRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BeerPersistenceError, BeerRepository};
use crate::domain::{Beer, BeerId, EventId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::BeerRow;
use super::pool::DbPool;
use super::schema::event_beers;

/// Diesel implementation of [`BeerRepository`].
#[derive(Clone)]
pub struct DieselBeerRepository {
    pool: DbPool,
}

impl DieselBeerRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BeerRepository for DieselBeerRepository {
    async fn insert(&self, beer: &Beer) -> Result<(), BeerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(event_beers::table)
            .values(BeerRow::from(beer))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_in_event(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Option<Beer>, BeerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BeerRow> = event_beers::table
            .filter(event_beers::id.eq(beer_id.as_uuid()))
            .filter(event_beers::event_id.eq(event_id.as_uuid()))
            .select(BeerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Beer::from))
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Beer>, BeerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BeerRow> = event_beers::table
            .filter(event_beers::event_id.eq(event_id.as_uuid()))
            .select(BeerRow::as_select())
            .order_by((event_beers::created_at.asc(), event_beers::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Beer::from).collect())
    }
}
