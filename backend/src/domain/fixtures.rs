//! Shared builders and a fixed clock for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Caller, Event, EventListing, EventName, EventStatus, JoinCode, Participant, ParticipantStatus,
    UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 15, 19, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn event_owned_by(owner: UserId, status: EventStatus) -> Event {
    let mut event = Event::create(
        owner,
        EventName::new("Friday Tasting").expect("valid name"),
        EventListing::default(),
        JoinCode::new("ABCD2345").expect("valid code"),
        fixture_timestamp(),
    );
    event.status = status;
    event
}

pub(crate) fn membership(event: &Event, user_id: UserId, status: ParticipantStatus) -> Participant {
    let member = Participant::member(event.id, user_id, fixture_timestamp());
    match status {
        ParticipantStatus::Removed => member.removed(fixture_timestamp()),
        other => Participant {
            status: other,
            ..member
        },
    }
}

pub(crate) fn plain_caller() -> Caller {
    Caller::new(UserId::random(), false)
}
