//! PostgreSQL-backed `ParticipantRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ParticipantPersistenceError, ParticipantRepository};
use crate::domain::{EventId, Participant, ParticipantView, UserId};

use super::diesel_helpers::{convert_rows, map_diesel_error, map_pool_error};
use super::models::{ParticipantRow, participant_view};
use super::pool::DbPool;
use super::schema::{app_users, event_participants, events};

/// Diesel implementation of [`ParticipantRepository`].
///
/// The composite primary key on `(event_id, user_id)` is what makes
/// concurrent joins collapse into one row.
#[derive(Clone)]
pub struct DieselParticipantRepository {
    pool: DbPool,
}

impl DieselParticipantRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for DieselParticipantRepository {
    async fn find(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Option<Participant>, ParticipantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ParticipantRow> = event_participants::table
            .find((event_id.as_uuid(), user_id.as_uuid()))
            .select(ParticipantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Participant::try_from)
            .transpose()
            .map_err(ParticipantPersistenceError::query)
    }

    async fn list_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<ParticipantView>, ParticipantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ParticipantRow, Option<String>)> = event_participants::table
            .inner_join(app_users::table)
            .filter(event_participants::event_id.eq(event_id.as_uuid()))
            .select((ParticipantRow::as_select(), app_users::nickname))
            .order_by((
                event_participants::joined_at.asc(),
                event_participants::user_id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, participant_view)
    }

    async fn insert(&self, participant: &Participant) -> Result<(), ParticipantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(event_participants::table)
            .values(ParticipantRow::from(participant))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_status(
        &self,
        participant: &Participant,
        now: DateTime<Utc>,
    ) -> Result<(), ParticipantPersistenceError> {
        let row = ParticipantRow::from(participant);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let updated = diesel::update(
                        event_participants::table.find((row.event_id, row.user_id)),
                    )
                    .set((
                        event_participants::status.eq(&row.status),
                        event_participants::removed_at.eq(row.removed_at),
                    ))
                    .execute(conn)
                    .await?;
                    diesel::update(events::table.find(row.event_id))
                        .set(events::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ParticipantPersistenceError::query("participant missing"));
        }
        Ok(())
    }
}
