//! PostgreSQL-backed `ReviewRepository` with version compare-and-swap.
//!
//! Updates are written with `WHERE version = expected`. When no row matches,
//! the current row is re-read on the same connection to tell a concurrent
//! write apart from a deleted review.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{BeerId, EventId, Review, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{ReviewRow, ReviewUpdate, version_for_db, version_from_db};
use super::pool::DbPool;
use super::schema::beer_reviews;

/// Diesel implementation of [`ReviewRepository`].
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Explain an update that matched no row.
async fn explain_lost_swap(
    conn: &mut AsyncPgConnection,
    review: &Review,
    expected_version: u32,
) -> ReviewPersistenceError {
    let current: Result<Option<i32>, ReviewPersistenceError> = beer_reviews::table
        .find(review.id.as_uuid())
        .select(beer_reviews::version)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error);
    match current {
        Ok(Some(actual)) => match version_from_db(actual) {
            Ok(actual) => ReviewPersistenceError::version_mismatch(expected_version, actual),
            Err(message) => ReviewPersistenceError::query(message),
        },
        Ok(None) => ReviewPersistenceError::not_found(),
        Err(err) => err,
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn find(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReviewRow> = beer_reviews::table
            .filter(beer_reviews::event_id.eq(event_id.as_uuid()))
            .filter(beer_reviews::beer_id.eq(beer_id.as_uuid()))
            .filter(beer_reviews::user_id.eq(user_id.as_uuid()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Review::try_from)
            .transpose()
            .map_err(ReviewPersistenceError::query)
    }

    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let row = ReviewRow::try_from(review).map_err(ReviewPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(beer_reviews::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        review: &Review,
        expected_version: u32,
    ) -> Result<(), ReviewPersistenceError> {
        let changes = ReviewUpdate::from_review(review).map_err(ReviewPersistenceError::query)?;
        let expected = version_for_db(expected_version).map_err(ReviewPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            beer_reviews::table
                .find(review.id.as_uuid())
                .filter(beer_reviews::version.eq(expected)),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(explain_lost_swap(&mut conn, review, expected_version).await);
        }
        Ok(())
    }
}
