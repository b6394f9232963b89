//! Tests for the event service.

use std::sync::Arc;

use super::*;
use crate::domain::fixtures::{
    event_owned_by, fixture_clock, fixture_timestamp, membership, plain_caller,
};
use crate::domain::ports::{MockEventRepository, MockParticipantRepository};
use crate::domain::{
    ErrorCode, EventStatus, JoinCode, MockJoinCodeSource, ParticipantStatus, UserId, Visibility,
};
use rstest::rstest;

type Service = EventService<MockEventRepository, MockParticipantRepository>;

fn fixed_codes() -> Arc<dyn JoinCodeSource> {
    let mut source = MockJoinCodeSource::new();
    source
        .expect_next_code()
        .returning(|| JoinCode::new("FRDY2345").expect("valid code"));
    Arc::new(source)
}

fn make_service(events: MockEventRepository, participants: MockParticipantRepository) -> Service {
    EventService::new(
        Arc::new(events),
        Arc::new(participants),
        fixed_codes(),
        fixture_clock(),
    )
}

fn request(name: &str, visibility: Visibility, is_listed: bool) -> CreateEventRequest {
    CreateEventRequest {
        name: name.to_owned(),
        visibility,
        is_listed,
    }
}

#[tokio::test]
async fn create_writes_event_and_owner_together() {
    let caller = plain_caller();
    let owner_id = caller.user_id;
    let mut events = MockEventRepository::new();
    events
        .expect_join_code_exists()
        .times(1)
        .return_once(|_| Ok(false));
    events
        .expect_insert_with_owner()
        .withf(move |event, owner| {
            event.owner_user_id == owner_id
                && event.status == EventStatus::Open
                && owner.event_id == event.id
                && owner.user_id == owner_id
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut participants = MockParticipantRepository::new();
    participants
        .expect_list_for_event()
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let details = make_service(events, participants)
        .create(&caller, request("  Friday Tasting ", Visibility::Open, true))
        .await
        .expect("created");
    assert_eq!(details.event.name.as_ref(), "Friday Tasting");
    assert_eq!(details.event.join_code.as_ref(), "FRDY2345");
    assert_eq!(details.event.created_at, fixture_timestamp());
    assert_eq!(details.viewer_role, ViewerRole::Owner);
}

#[rstest]
#[case(request("", Visibility::Private, false), "name")]
#[case(request("Cellar", Visibility::Private, true), "isListed")]
#[tokio::test]
async fn create_rejects_invalid_requests_before_writing(
    #[case] request: CreateEventRequest,
    #[case] field: &str,
) {
    let service = make_service(
        MockEventRepository::new(),
        MockParticipantRepository::new(),
    );
    let error = service
        .create(&plain_caller(), request)
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let fields = error
        .details()
        .and_then(|details| details.get("fields"))
        .expect("field map");
    assert!(fields.get(field).is_some());
}

#[tokio::test]
async fn join_code_race_at_insert_is_internal() {
    let mut events = MockEventRepository::new();
    events
        .expect_join_code_exists()
        .times(1)
        .return_once(|_| Ok(false));
    events
        .expect_insert_with_owner()
        .times(1)
        .return_once(|_, _| Err(EventPersistenceError::duplicate_key("events_join_code_key")));

    let error = make_service(events, MockParticipantRepository::new())
        .create(&plain_caller(), request("Race", Visibility::Private, false))
        .await
        .expect_err("collision");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

fn with_event(event: Event) -> MockEventRepository {
    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(event)));
    events
}

fn with_membership(row: Option<Participant>) -> MockParticipantRepository {
    let mut participants = MockParticipantRepository::new();
    participants
        .expect_find()
        .times(1)
        .return_once(move |_, _| Ok(row));
    participants
}

#[tokio::test]
async fn details_are_forbidden_to_strangers() {
    let event = event_owned_by(UserId::random(), EventStatus::Open);
    let id = event.id;
    let error = make_service(with_event(event), with_membership(None))
        .details(&plain_caller(), &id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn details_of_a_missing_event_are_not_found() {
    let mut events = MockEventRepository::new();
    events.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let error = make_service(events, MockParticipantRepository::new())
        .details(&plain_caller(), &EventId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn admins_see_details_with_the_admin_role() {
    let event = event_owned_by(UserId::random(), EventStatus::Open);
    let id = event.id;
    let mut participants = with_membership(None);
    participants
        .expect_list_for_event()
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    let admin = Caller::new(UserId::random(), true);

    let details = make_service(with_event(event), participants)
        .details(&admin, &id)
        .await
        .expect("visible");
    assert_eq!(details.viewer_role, ViewerRole::Admin);
}

#[tokio::test]
async fn members_cannot_change_status() {
    let event = event_owned_by(UserId::random(), EventStatus::Open);
    let caller = plain_caller();
    let row = membership(&event, caller.user_id, ParticipantStatus::Active);
    let id = event.id;

    let error = make_service(with_event(event), with_membership(Some(row)))
        .change_status(&caller, &id, TargetStatus::Closed)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn owner_closes_an_open_event() {
    let caller = plain_caller();
    let event = event_owned_by(caller.user_id, EventStatus::Open);
    let id = event.id;
    let mut events = with_event(event);
    events
        .expect_update_status()
        .withf(|_, status, now| *status == EventStatus::Closed && *now == fixture_timestamp())
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let updated = make_service(events, with_membership(None))
        .change_status(&caller, &id, TargetStatus::Closed)
        .await
        .expect("closed");
    assert_eq!(updated.status, EventStatus::Closed);
}

#[tokio::test]
async fn requesting_the_current_status_writes_nothing() {
    let caller = plain_caller();
    let event = event_owned_by(caller.user_id, EventStatus::Closed);
    let id = event.id;

    let unchanged = make_service(with_event(event), with_membership(None))
        .change_status(&caller, &id, TargetStatus::Closed)
        .await
        .expect("no-op");
    assert_eq!(unchanged.status, EventStatus::Closed);
}

#[rstest]
#[case(EventStatus::Draft)]
#[case(EventStatus::Archived)]
#[tokio::test]
async fn unmanaged_states_conflict(#[case] status: EventStatus) {
    let caller = plain_caller();
    let event = event_owned_by(caller.user_id, status);
    let id = event.id;

    let error = make_service(with_event(event), with_membership(None))
        .change_status(&caller, &id, TargetStatus::Open)
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn owners_delete_events() {
    let caller = plain_caller();
    let event = event_owned_by(caller.user_id, EventStatus::Open);
    let id = event.id;
    let mut events = with_event(event);
    events
        .expect_delete_cascade()
        .times(1)
        .return_once(|_| Ok(true));

    make_service(events, with_membership(None))
        .delete(&caller, &id)
        .await
        .expect("deleted");
}

#[tokio::test]
async fn members_cannot_delete_events() {
    let event = event_owned_by(UserId::random(), EventStatus::Open);
    let caller = plain_caller();
    let row = membership(&event, caller.user_id, ParticipantStatus::Active);
    let id = event.id;

    let error = make_service(with_event(event), with_membership(Some(row)))
        .delete(&caller, &id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
