//! The single authorisation predicate for per-event actions.
//!
//! Every handler that touches an event asks [`AccessGuard::evaluate`] what the
//! caller may do. The guard works on plain values so it can be exercised
//! without an HTTP context.

use super::{Caller, Error, Event, Participant};

/// Capability a caller holds on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Admin or owner; may manage the event.
    Full,
    /// Active participant.
    Member,
    /// No access.
    Denied,
}

impl Access {
    /// True for owners and admins.
    #[must_use]
    pub const fn is_manager(self) -> bool {
        matches!(self, Self::Full)
    }

    /// True unless denied.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        !matches!(self, Self::Denied)
    }

    /// Fail with `forbidden` unless access is granted.
    pub fn require_granted(self) -> Result<Self, Error> {
        if self.is_granted() {
            Ok(self)
        } else {
            Err(Error::forbidden("you do not have access to this event"))
        }
    }

    /// Fail with `forbidden` unless the caller manages the event.
    pub fn require_manager(self) -> Result<Self, Error> {
        if self.is_manager() {
            Ok(self)
        } else {
            Err(Error::forbidden("only the event owner or an admin may do this"))
        }
    }
}

/// Stateless evaluator for [`Access`].
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use tasting_backend::domain::{
///     Access, AccessGuard, Caller, Event, EventListing, EventName, JoinCode, UserId,
/// };
///
/// let owner = UserId::random();
/// let event = Event::create(
///     owner,
///     EventName::new("Cellar Night").expect("valid name"),
///     EventListing::default(),
///     JoinCode::new("ABCD2345").expect("valid code"),
///     Utc::now(),
/// );
/// let stranger = Caller::new(UserId::random(), false);
/// assert_eq!(AccessGuard::evaluate(&Caller::new(owner, false), &event, None), Access::Full);
/// assert_eq!(AccessGuard::evaluate(&stranger, &event, None), Access::Denied);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// Decide the caller's capability.
    ///
    /// `participant` must be the caller's own membership row for `event`.
    #[must_use]
    pub fn evaluate(caller: &Caller, event: &Event, participant: Option<&Participant>) -> Access {
        if caller.is_admin || event.is_owned_by(caller.user_id) {
            return Access::Full;
        }
        match participant {
            Some(row)
                if row.event_id == event.id && row.user_id == caller.user_id && row.is_active() =>
            {
                Access::Member
            }
            _ => Access::Denied,
        }
    }
}
