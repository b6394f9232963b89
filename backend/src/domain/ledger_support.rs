//! Helpers shared by the ledger services: repository error mapping and the
//! load-event-then-guard sequence every per-event operation starts with.

use tracing::debug;

use super::ports::{
    BeerPersistenceError, EventPersistenceError, EventRepository, FavoritePersistenceError,
    ParticipantPersistenceError, ParticipantRepository, ReviewPersistenceError,
    UserPersistenceError,
};
use super::{Access, AccessGuard, BeerId, Caller, Error, Event, EventId, Participant};

macro_rules! map_persistence_error {
    ($name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $name(error: $error) -> Error {
            match error {
                $error::Connection { message } => Error::service_unavailable(format!(
                    concat!($label, " repository unavailable: {}"),
                    message
                )),
                other => Error::internal(format!(concat!($label, " repository error: {}"), other)),
            }
        }
    };
}

map_persistence_error!(map_user_error, UserPersistenceError, "user");
map_persistence_error!(map_event_error, EventPersistenceError, "event");
map_persistence_error!(map_participant_error, ParticipantPersistenceError, "participant");
map_persistence_error!(map_beer_error, BeerPersistenceError, "beer");
map_persistence_error!(map_favorite_error, FavoritePersistenceError, "favorite");
map_persistence_error!(map_review_error, ReviewPersistenceError, "review");

/// An event together with the caller's membership row and capability.
#[derive(Debug, Clone)]
pub(crate) struct GuardedEvent {
    pub(crate) event: Event,
    pub(crate) membership: Option<Participant>,
    pub(crate) access: Access,
}

pub(crate) fn event_not_found(event_id: &EventId) -> Error {
    Error::not_found(format!("event {event_id} not found"))
}

pub(crate) fn beer_not_found(beer_id: &BeerId) -> Error {
    Error::not_found(format!("beer {beer_id} not found in this event"))
}

/// Load an event and evaluate the caller against it.
///
/// A missing event is `not_found`; the capability is returned unchecked so
/// callers can apply the requirement they need.
pub(crate) async fn load_guarded<E, P>(
    events: &E,
    participants: &P,
    caller: &Caller,
    event_id: &EventId,
) -> Result<GuardedEvent, Error>
where
    E: EventRepository + ?Sized,
    P: ParticipantRepository + ?Sized,
{
    let event = events
        .find_by_id(event_id)
        .await
        .map_err(map_event_error)?
        .ok_or_else(|| event_not_found(event_id))?;
    let membership = participants
        .find(event_id, &caller.user_id)
        .await
        .map_err(map_participant_error)?;
    let access = AccessGuard::evaluate(caller, &event, membership.as_ref());
    debug!(event_id = %event_id, user_id = %caller.user_id, ?access, "evaluated event access");
    Ok(GuardedEvent {
        event,
        membership,
        access,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn connection_failures_are_unavailable() {
        let error = map_review_error(ReviewPersistenceError::connection("refused"));
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn other_failures_are_internal() {
        let error = map_favorite_error(FavoritePersistenceError::duplicate_key("dup"));
        assert_eq!(error.code(), ErrorCode::InternalError);
        let error = map_beer_error(BeerPersistenceError::query("syntax"));
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
