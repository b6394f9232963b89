//! PostgreSQL-backed `EventRepository`.
//!
//! Event creation and deletion are the two multi-statement writes in the
//! service; both run inside a single transaction so a cancelled request
//! leaves nothing behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{EventPersistenceError, EventRepository};
use crate::domain::{
    Event, EventId, EventStatus, JoinCode, Participant, ParticipantStatus, UserId, Visibility,
};

use super::diesel_helpers::{convert_rows, map_diesel_error, map_pool_error};
use super::models::{EventRow, ParticipantRow};
use super::pool::DbPool;
use super::schema::{beer_favorites, beer_reviews, event_beers, event_participants, events};

/// Diesel implementation of [`EventRepository`].
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_event(row: EventRow) -> Result<Event, EventPersistenceError> {
    Event::try_from(row).map_err(EventPersistenceError::query)
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert_with_owner(
        &self,
        event: &Event,
        owner: &Participant,
    ) -> Result<(), EventPersistenceError> {
        let event_row = EventRow::from(event);
        let owner_row = ParticipantRow::from(owner);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::insert_into(events::table)
                    .values(&event_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(event_participants::table)
                    .values(&owner_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_event).transpose()
    }

    async fn join_code_exists(&self, code: &JoinCode) -> Result<bool, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            events::table.filter(events::join_code.eq(code.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let active_memberships = event_participants::table
            .filter(event_participants::user_id.eq(user_id.as_uuid()))
            .filter(event_participants::status.eq(ParticipantStatus::Active.as_str()))
            .select(event_participants::event_id);
        let rows: Vec<EventRow> = events::table
            .filter(
                events::owner_user_id
                    .eq(user_id.as_uuid())
                    .or(events::id.eq_any(active_memberships)),
            )
            .select(EventRow::as_select())
            .order_by(events::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, Event::try_from)
    }

    async fn list_discoverable(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed_from = event_participants::table
            .filter(event_participants::user_id.eq(user_id.as_uuid()))
            .filter(event_participants::status.eq(ParticipantStatus::Removed.as_str()))
            .select(event_participants::event_id);
        let rows: Vec<EventRow> = events::table
            .filter(events::status.eq(EventStatus::Open.as_str()))
            .filter(events::visibility.eq(Visibility::Open.as_str()))
            .filter(events::is_listed.eq(true))
            .filter(not(events::id.eq_any(removed_from)))
            .select(EventRow::as_select())
            .order_by(events::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, Event::try_from)
    }

    async fn update_status(
        &self,
        id: &EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> Result<(), EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(events::table.find(id.as_uuid()))
            .set((
                events::status.eq(status.as_str()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(EventPersistenceError::query(format!("event {id} missing")));
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: &EventId) -> Result<bool, EventPersistenceError> {
        let event_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::delete(beer_favorites::table.filter(beer_favorites::event_id.eq(event_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(beer_reviews::table.filter(beer_reviews::event_id.eq(event_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(event_beers::table.filter(event_beers::event_id.eq(event_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(
                    event_participants::table.filter(event_participants::event_id.eq(event_id)),
                )
                .execute(conn)
                .await?;
                let deleted = diesel::delete(events::table.find(event_id))
                    .execute(conn)
                    .await?;
                Ok(deleted > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
