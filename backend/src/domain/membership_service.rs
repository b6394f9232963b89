//! Membership Ledger: joining by code, removal and restoration.
//!
//! A join races safely with itself: the insert is attempted and a duplicate
//! key is reconciled by re-reading the row rather than retried.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ledger_support::{GuardedEvent, load_guarded, map_participant_error};
use super::ports::{
    EventRepository, JoinOutcome, MembershipLedger, ParticipantPersistenceError,
    ParticipantRepository,
};
use super::{Caller, Error, EventId, EventStatus, Participant, ParticipantStatus, Role, UserId};

/// Membership service implementing [`MembershipLedger`].
pub struct MembershipService<E, P> {
    events: Arc<E>,
    participants: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<E, P> MembershipService<E, P> {
    /// Create a service over the event and participant repositories.
    pub fn new(events: Arc<E>, participants: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            participants,
            clock,
        }
    }
}

fn removed_participant() -> Error {
    Error::forbidden("you have been removed from this event")
}

fn joined(caller: &Caller, event_id: &EventId, joined: bool) -> JoinOutcome {
    JoinOutcome {
        event_id: *event_id,
        user_id: caller.user_id,
        joined,
    }
}

impl<E, P> MembershipService<E, P>
where
    E: EventRepository,
    P: ParticipantRepository,
{
    async fn guarded(&self, caller: &Caller, event_id: &EventId) -> Result<GuardedEvent, Error> {
        load_guarded(
            self.events.as_ref(),
            self.participants.as_ref(),
            caller,
            event_id,
        )
        .await
    }

    /// Shared preconditions of remove and restore: manager caller, existing
    /// non-owner target.
    async fn managed_target(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: &UserId,
    ) -> Result<Participant, Error> {
        let guarded = self.guarded(caller, event_id).await?;
        guarded.access.require_manager()?;
        if guarded.event.is_owned_by(*target) {
            return Err(Error::invalid_request("the event owner cannot be removed or restored"));
        }
        let row = self
            .participants
            .find(event_id, target)
            .await
            .map_err(map_participant_error)?
            .ok_or_else(|| Error::not_found(format!("participant {target} not found")))?;
        if row.role == Role::Owner {
            return Err(Error::invalid_request("the event owner cannot be removed or restored"));
        }
        Ok(row)
    }

    async fn reconcile_duplicate_join(
        &self,
        caller: &Caller,
        event_id: &EventId,
        original: ParticipantPersistenceError,
    ) -> Result<JoinOutcome, Error> {
        let winner = self
            .participants
            .find(event_id, &caller.user_id)
            .await
            .map_err(map_participant_error)?;
        match winner {
            Some(row) if row.is_active() => {
                debug!(event_id = %event_id, user_id = %caller.user_id, "concurrent join already active");
                Ok(joined(caller, event_id, false))
            }
            _ => Err(map_participant_error(original)),
        }
    }
}

#[async_trait]
impl<E, P> MembershipLedger for MembershipService<E, P>
where
    E: EventRepository,
    P: ParticipantRepository,
{
    async fn join(
        &self,
        caller: &Caller,
        event_id: &EventId,
        code: &str,
    ) -> Result<JoinOutcome, Error> {
        let GuardedEvent { event, membership, .. } = self.guarded(caller, event_id).await?;
        let invitation = match membership {
            Some(row) => match row.status {
                ParticipantStatus::Active => return Ok(joined(caller, event_id, false)),
                ParticipantStatus::Removed => return Err(removed_participant()),
                ParticipantStatus::Invited => Some(row),
            },
            None => None,
        };
        if event.status != EventStatus::Open {
            return Err(Error::conflict("event is not open for joining"));
        }
        if !event.join_code.matches(code) {
            return Err(Error::forbidden("join code does not match"));
        }

        if let Some(invited) = invitation {
            self.participants
                .update_status(&invited.activated(), self.clock.utc())
                .await
                .map_err(map_participant_error)?;
            info!(event_id = %event_id, user_id = %caller.user_id, "invitation accepted");
            return Ok(joined(caller, event_id, true));
        }

        let row = Participant::member(*event_id, caller.user_id, self.clock.utc());
        match self.participants.insert(&row).await {
            Ok(()) => {
                info!(event_id = %event_id, user_id = %caller.user_id, "participant joined");
                Ok(joined(caller, event_id, true))
            }
            Err(err @ ParticipantPersistenceError::DuplicateKey { .. }) => {
                self.reconcile_duplicate_join(caller, event_id, err).await
            }
            Err(other) => Err(map_participant_error(other)),
        }
    }

    async fn remove(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: &UserId,
    ) -> Result<(), Error> {
        let row = self.managed_target(caller, event_id, target).await?;
        if row.status == ParticipantStatus::Removed {
            return Ok(());
        }
        let now = self.clock.utc();
        self.participants
            .update_status(&row.removed(now), now)
            .await
            .map_err(map_participant_error)?;
        info!(event_id = %event_id, target = %target, by = %caller.user_id, "participant removed");
        Ok(())
    }

    async fn restore(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: &UserId,
    ) -> Result<(), Error> {
        let row = self.managed_target(caller, event_id, target).await?;
        if row.status != ParticipantStatus::Removed {
            return Err(Error::conflict("only removed participants can be restored"));
        }
        self.participants
            .update_status(&row.restored(), self.clock.utc())
            .await
            .map_err(map_participant_error)?;
        info!(event_id = %event_id, target = %target, by = %caller.user_id, "participant restored");
        Ok(())
    }
}

#[cfg(test)]
#[path = "membership_service_tests.rs"]
mod tests;
