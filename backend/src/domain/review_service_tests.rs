//! Tests for the review service.

use std::sync::Arc;

use super::*;
use crate::domain::fixtures::{
    event_owned_by, fixture_clock, fixture_timestamp, membership, plain_caller,
};
use crate::domain::ports::{
    MockBeerRepository, MockEventRepository, MockParticipantRepository, MockReviewRepository,
};
use crate::domain::{Beer, ErrorCode, Event, ParticipantStatus, UserId};
use chrono::Duration;
use rstest::rstest;

type Service = ReviewService<
    MockEventRepository,
    MockParticipantRepository,
    MockBeerRepository,
    MockReviewRepository,
>;

struct Scene {
    event: Event,
    beer: Beer,
    member: Caller,
    owner: Caller,
}

fn scene(status: EventStatus) -> Scene {
    let owner = plain_caller();
    let event = event_owned_by(owner.user_id, status);
    let beer = Beer {
        id: BeerId::random(),
        event_id: event.id,
        name: "Saison".to_owned(),
        brewery: None,
        style: Some("Farmhouse".to_owned()),
        abv: Some(6.5),
        created_at: fixture_timestamp(),
    };
    Scene {
        event,
        beer,
        member: plain_caller(),
        owner,
    }
}

fn make_service(scene: &Scene, caller: &Caller, reviews: MockReviewRepository) -> Service {
    let event = scene.event.clone();
    let row = (caller.user_id != scene.event.owner_user_id)
        .then(|| membership(&scene.event, caller.user_id, ParticipantStatus::Active));
    let beer = scene.beer.clone();

    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(event)));
    let mut participants = MockParticipantRepository::new();
    participants
        .expect_find()
        .times(1)
        .return_once(move |_, _| Ok(row));
    let mut beers = MockBeerRepository::new();
    beers
        .expect_find_in_event()
        .times(0..=1)
        .return_once(move |_, _| Ok(Some(beer)));
    ReviewService::new(
        Arc::new(events),
        Arc::new(participants),
        Arc::new(beers),
        Arc::new(reviews),
        fixture_clock(),
    )
}

fn rating(value: i64) -> ReviewInput {
    ReviewInput {
        rating: Some(value),
        ..ReviewInput::default()
    }
}

fn stored_review(scene: &Scene, caller: &Caller) -> Review {
    let mut review = ReviewDraft::new(&rating(3))
        .expect("valid")
        .into_review(
            scene.event.id,
            scene.beer.id,
            caller.user_id,
            fixture_timestamp() - Duration::hours(1),
        );
    review.version = 4;
    review
}

#[tokio::test]
async fn members_create_reviews_at_version_one() {
    let scene = scene(EventStatus::Open);
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().times(1).return_once(|_| Ok(()));

    let review = make_service(&scene, &scene.member, reviews)
        .create(&scene.member, &scene.event.id, &scene.beer.id, rating(5))
        .await
        .expect("created");
    assert_eq!(review.version, 1);
    assert_eq!(review.scores.total.get(), 5);
    assert_eq!(review.created_at, fixture_timestamp());
}

#[tokio::test]
async fn duplicate_create_is_a_conflict() {
    let scene = scene(EventStatus::Open);
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_insert()
        .times(1)
        .return_once(|_| Err(ReviewPersistenceError::duplicate_key("beer_reviews_pkey")));

    let error = make_service(&scene, &scene.member, reviews)
        .create(&scene.member, &scene.event.id, &scene.beer.id, rating(5))
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn closed_events_block_member_reviews() {
    let scene = scene(EventStatus::Closed);
    let error = make_service(&scene, &scene.member, MockReviewRepository::new())
        .create(&scene.member, &scene.event.id, &scene.beer.id, rating(5))
        .await
        .expect_err("closed");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn closed_events_still_accept_owner_reviews() {
    let scene = scene(EventStatus::Closed);
    let mut reviews = MockReviewRepository::new();
    reviews.expect_insert().times(1).return_once(|_| Ok(()));

    make_service(&scene, &scene.owner, reviews)
        .create(&scene.owner, &scene.event.id, &scene.beer.id, rating(6))
        .await
        .expect("owner may review");
}

#[tokio::test]
async fn invalid_scores_fail_before_any_write() {
    let scene = scene(EventStatus::Open);
    let error = make_service(&scene, &scene.member, MockReviewRepository::new())
        .create(&scene.member, &scene.event.id, &scene.beer.id, rating(0))
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn missing_review_is_not_found() {
    let scene = scene(EventStatus::Open);
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find()
        .times(1)
        .return_once(|_, _, _| Ok(None));

    let error = make_service(&scene, &scene.member, reviews)
        .get(&scene.member, &scene.event.id, &scene.beer.id)
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_swaps_on_the_stored_version() {
    let scene = scene(EventStatus::Open);
    let current = stored_review(&scene, &scene.member);
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find()
        .times(1)
        .return_once(move |_, _, _| Ok(Some(current)));
    reviews
        .expect_update()
        .withf(|review, expected| *expected == 4 && review.version == 5)
        .times(1)
        .return_once(|_, _| Ok(()));

    let updated = make_service(&scene, &scene.member, reviews)
        .update(&scene.member, &scene.event.id, &scene.beer.id, rating(6))
        .await
        .expect("updated");
    assert_eq!(updated.updated_at, fixture_timestamp());
}

#[tokio::test]
async fn unchanged_update_performs_no_write() {
    let scene = scene(EventStatus::Open);
    let current = stored_review(&scene, &scene.member);
    let before = current.clone();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find()
        .times(1)
        .return_once(move |_, _, _| Ok(Some(current)));
    reviews.expect_update().times(0);

    let unchanged = make_service(&scene, &scene.member, reviews)
        .update(&scene.member, &scene.event.id, &scene.beer.id, rating(3))
        .await
        .expect("no-op");
    assert_eq!(unchanged, before);
}

#[rstest]
#[case(ReviewPersistenceError::version_mismatch(4_u32, 5_u32), ErrorCode::Conflict)]
#[case(ReviewPersistenceError::not_found(), ErrorCode::NotFound)]
#[tokio::test]
async fn lost_swaps_are_reported(
    #[case] failure: ReviewPersistenceError,
    #[case] expected: ErrorCode,
) {
    let scene = scene(EventStatus::Open);
    let current = stored_review(&scene, &scene.member);
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find()
        .times(1)
        .return_once(move |_, _, _| Ok(Some(current)));
    reviews
        .expect_update()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let error = make_service(&scene, &scene.member, reviews)
        .update(&scene.member, &scene.event.id, &scene.beer.id, rating(1))
        .await
        .expect_err("lost swap");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn strangers_cannot_read_reviews() {
    let scene = scene(EventStatus::Open);
    let stranger = Caller::new(UserId::random(), false);
    let event = scene.event.clone();
    let mut events = MockEventRepository::new();
    events
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(event)));
    let mut participants = MockParticipantRepository::new();
    participants
        .expect_find()
        .times(1)
        .return_once(|_, _| Ok(None));
    let service: Service = ReviewService::new(
        Arc::new(events),
        Arc::new(participants),
        Arc::new(MockBeerRepository::new()),
        Arc::new(MockReviewRepository::new()),
        fixture_clock(),
    );

    let error = service
        .get(&stranger, &scene.event.id, &scene.beer.id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
