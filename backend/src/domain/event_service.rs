//! Event Lifecycle: creation, reads, the open/closed state machine, deletion.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use super::ledger_support::{
    event_not_found, load_guarded, map_event_error, map_participant_error,
};
use super::ports::{
    CreateEventRequest, EventDetails, EventLifecycle, EventPersistenceError, EventRepository,
    ParticipantRepository, ViewerRole,
};
use super::validation::FieldErrors;
use super::{
    Caller, Error, Event, EventId, EventListing, EventName, JoinCodeIssuer, JoinCodeSource,
    Participant, StatusTransition, TargetStatus,
};

/// Event service implementing [`EventLifecycle`].
pub struct EventService<E, P> {
    events: Arc<E>,
    participants: Arc<P>,
    issuer: JoinCodeIssuer<E>,
    clock: Arc<dyn Clock>,
}

impl<E, P> EventService<E, P>
where
    E: EventRepository,
{
    /// Create a service; `codes` supplies join code candidates.
    pub fn new(
        events: Arc<E>,
        participants: Arc<P>,
        codes: Arc<dyn JoinCodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = JoinCodeIssuer::new(Arc::clone(&events), codes);
        Self {
            events,
            participants,
            issuer,
            clock,
        }
    }
}

fn validate_create(request: &CreateEventRequest) -> Result<(EventName, EventListing), Error> {
    let mut errors = FieldErrors::new();
    let name = errors.capture("name", EventName::new(&request.name));
    let listing = errors.capture(
        "isListed",
        EventListing::new(request.visibility, request.is_listed),
    );
    match (name, listing) {
        (Some(name), Some(listing)) if errors.is_empty() => Ok((name, listing)),
        _ => Err(errors.into_error("event is invalid")),
    }
}

fn viewer_role(caller: &Caller, event: &Event) -> ViewerRole {
    if event.is_owned_by(caller.user_id) {
        ViewerRole::Owner
    } else if caller.is_admin {
        ViewerRole::Admin
    } else {
        ViewerRole::Member
    }
}

impl<E, P> EventService<E, P>
where
    E: EventRepository,
    P: ParticipantRepository,
{
    async fn details_for(&self, caller: &Caller, event: Event) -> Result<EventDetails, Error> {
        let participants = self
            .participants
            .list_for_event(&event.id)
            .await
            .map_err(map_participant_error)?;
        Ok(EventDetails {
            viewer_role: viewer_role(caller, &event),
            event,
            participants,
        })
    }
}

#[async_trait]
impl<E, P> EventLifecycle for EventService<E, P>
where
    E: EventRepository,
    P: ParticipantRepository,
{
    async fn create(
        &self,
        caller: &Caller,
        request: CreateEventRequest,
    ) -> Result<EventDetails, Error> {
        let (name, listing) = validate_create(&request)?;
        let join_code = self.issuer.issue().await?;
        let now = self.clock.utc();
        let event = Event::create(caller.user_id, name, listing, join_code, now);
        let owner = Participant::owner(event.id, caller.user_id, now);

        match self.events.insert_with_owner(&event, &owner).await {
            Ok(()) => {}
            Err(EventPersistenceError::DuplicateKey { message }) => {
                error!(%message, event_id = %event.id, "join code collided after uniqueness probe");
                return Err(Error::internal("could not allocate a unique join code"));
            }
            Err(other) => return Err(map_event_error(other)),
        }
        info!(event_id = %event.id, owner = %caller.user_id, "event created");
        self.details_for(caller, event).await
    }

    async fn details(&self, caller: &Caller, event_id: &EventId) -> Result<EventDetails, Error> {
        let guarded = load_guarded(
            self.events.as_ref(),
            self.participants.as_ref(),
            caller,
            event_id,
        )
        .await?;
        guarded.access.require_granted()?;
        self.details_for(caller, guarded.event).await
    }

    async fn list_mine(&self, caller: &Caller) -> Result<Vec<Event>, Error> {
        self.events
            .list_for_member(&caller.user_id)
            .await
            .map_err(map_event_error)
    }

    async fn list_open(&self, caller: &Caller) -> Result<Vec<Event>, Error> {
        self.events
            .list_discoverable(&caller.user_id)
            .await
            .map_err(map_event_error)
    }

    async fn change_status(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: TargetStatus,
    ) -> Result<Event, Error> {
        let guarded = load_guarded(
            self.events.as_ref(),
            self.participants.as_ref(),
            caller,
            event_id,
        )
        .await?;
        guarded.access.require_manager()?;
        let mut event = guarded.event;
        match event.plan_status_change(target) {
            Ok(StatusTransition::Unchanged) => {
                debug!(event_id = %event_id, ?target, "status already current; no write");
                Ok(event)
            }
            Ok(StatusTransition::Changed(status)) => {
                let now = self.clock.utc();
                self.events
                    .update_status(event_id, status, now)
                    .await
                    .map_err(map_event_error)?;
                event.status = status;
                event.updated_at = now;
                Ok(event)
            }
            Err(err) => Err(Error::conflict(err.to_string())),
        }
    }

    async fn delete(&self, caller: &Caller, event_id: &EventId) -> Result<(), Error> {
        let guarded = load_guarded(
            self.events.as_ref(),
            self.participants.as_ref(),
            caller,
            event_id,
        )
        .await?;
        guarded.access.require_manager()?;
        let deleted = self
            .events
            .delete_cascade(event_id)
            .await
            .map_err(map_event_error)?;
        if !deleted {
            return Err(event_not_found(event_id));
        }
        info!(event_id = %event_id, by = %caller.user_id, "event deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
