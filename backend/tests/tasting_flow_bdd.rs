//! Behaviour scenarios for the tasting flow over the in-memory store.
//!
//! Steps stay synchronous; each request builds the route table afresh on an
//! actix system owned by the world, so state lives only in the shared
//! [`HttpState`].

use std::cell::RefCell;
use std::collections::HashMap;

use actix_rt::SystemRunner;
use actix_web::test::TestRequest;
use actix_web::web;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tasting_backend::inbound::http::state::HttpState;

#[path = "support/http.rs"]
#[expect(dead_code, reason = "the admin helper only serves the endpoint suite")]
mod http_support;

use http_support::{app, as_user, field, memory_state, send};

struct TastingWorld {
    runner: SystemRunner,
    state: web::Data<HttpState>,
    user_ids: HashMap<String, String>,
    event_id: Option<String>,
    beer_id: Option<String>,
    last: Option<(u16, Value)>,
}

impl TastingWorld {
    fn request(&mut self, req: TestRequest) -> (u16, Value) {
        let state = self.state.clone();
        let response = self.runner.block_on(async move {
            let service = app(state).await;
            send(&service, req).await
        });
        self.last = Some(response.clone());
        response
    }

    fn event_uri(&self, suffix: &str) -> String {
        let event_id = self.event_id.as_deref().expect("event created");
        format!("/api/events/{event_id}{suffix}")
    }

    fn user_id(&self, subject: &str) -> &str {
        self.user_ids
            .get(subject)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{subject} has not been seen yet"))
    }

    fn last_body(&self) -> &Value {
        &self.last.as_ref().expect("a request was made").1
    }
}

#[fixture]
fn world() -> RefCell<TastingWorld> {
    RefCell::new(TastingWorld {
        runner: actix_rt::System::new(),
        state: memory_state(&["ABCD1234"]),
        user_ids: HashMap::new(),
        event_id: None,
        beer_id: None,
        last: None,
    })
}

// -----------------------------------------------------------------------------
// Steps
// -----------------------------------------------------------------------------

#[given("an event owned by {owner} with join code {code}")]
fn an_event_owned_by(world: &RefCell<TastingWorld>, owner: String, code: String) {
    let mut world = world.borrow_mut();
    let (status, details) = world.request(
        as_user(TestRequest::post().uri("/api/events"), &owner)
            .set_json(json!({ "name": "Friday Tasting" })),
    );
    assert_eq!(status, 201, "{details}");
    assert_eq!(field(&details, "joinCode"), code);
    world.event_id = Some(field(&details, "id").to_owned());
    let owner_id = field(&details, "ownerUserId").to_owned();
    world.user_ids.insert(owner, owner_id);
}

#[given("{subject} has joined with code {code}")]
fn has_joined(world: &RefCell<TastingWorld>, subject: String, code: String) {
    joins_with_code(world, subject, code);
    assert_eq!(world.borrow().last.as_ref().map(|(status, _)| *status), Some(200));
}

#[given("{subject} has added a beer named {name}")]
fn has_added_a_beer(world: &RefCell<TastingWorld>, subject: String, name: String) {
    adds_a_beer(world, subject, name);
    assert_eq!(world.borrow().last.as_ref().map(|(status, _)| *status), Some(201));
}

#[when("{subject} joins with code {code}")]
fn joins_with_code(world: &RefCell<TastingWorld>, subject: String, code: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri("/join");
    let (status, body) = world.request(
        as_user(TestRequest::post().uri(&uri), &subject).set_json(json!({ "code": code })),
    );
    if status == 200 {
        let user_id = field(&body, "userId").to_owned();
        world.user_ids.insert(subject, user_id);
    }
}

#[when("{subject} adds a beer named {name}")]
fn adds_a_beer(world: &RefCell<TastingWorld>, subject: String, name: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri("/beers");
    let (status, body) = world.request(
        as_user(TestRequest::post().uri(&uri), &subject).set_json(json!({ "name": name })),
    );
    if status == 201 {
        world.beer_id = Some(field(&body, "id").to_owned());
    }
}

#[when("{subject} reviews the beer with rating {rating}")]
fn reviews_the_beer(world: &RefCell<TastingWorld>, subject: String, rating: i64) {
    let mut world = world.borrow_mut();
    let beer_id = world.beer_id.clone().expect("a beer was added");
    let uri = world.event_uri(&format!("/beers/{beer_id}/reviews"));
    world.request(
        as_user(TestRequest::post().uri(&uri), &subject).set_json(json!({ "rating": rating })),
    );
}

#[when("{subject} removes {member}")]
fn removes_member(world: &RefCell<TastingWorld>, subject: String, member: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri(&format!("/participants/{}", world.user_id(&member)));
    world.request(as_user(TestRequest::delete().uri(&uri), &subject));
}

#[when("{subject} restores {member}")]
fn restores_member(world: &RefCell<TastingWorld>, subject: String, member: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri(&format!("/participants/{}/restore", world.user_id(&member)));
    world.request(as_user(TestRequest::post().uri(&uri), &subject));
}

#[when("{subject} closes the event")]
fn closes_the_event(world: &RefCell<TastingWorld>, subject: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri("/status");
    world.request(
        as_user(TestRequest::patch().uri(&uri), &subject).set_json(json!({ "status": "closed" })),
    );
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &RefCell<TastingWorld>, status: u16) {
    let world = world.borrow();
    let (actual, body) = world.last.as_ref().expect("a request was made");
    assert_eq!(*actual, status, "unexpected response body: {body}");
}

#[then("the join created a new membership")]
fn the_join_created_a_new_membership(world: &RefCell<TastingWorld>) {
    assert_eq!(world.borrow().last_body().get("joined"), Some(&json!(true)));
}

#[then("the join reused the existing membership")]
fn the_join_reused_the_existing_membership(world: &RefCell<TastingWorld>) {
    assert_eq!(world.borrow().last_body().get("joined"), Some(&json!(false)));
}

#[then("{subject} is an active participant")]
fn is_an_active_participant(world: &RefCell<TastingWorld>, subject: String) {
    let mut world = world.borrow_mut();
    let uri = world.event_uri("");
    let owner = world
        .user_ids
        .keys()
        .find(|name| name.as_str() != subject)
        .cloned()
        .expect("an owner was recorded");
    let (status, details) = world.request(as_user(TestRequest::get().uri(&uri), &owner));
    assert_eq!(status, 200);
    let user_id = world.user_id(&subject);
    let row = details
        .get("participants")
        .and_then(Value::as_array)
        .and_then(|rows| {
            rows.iter()
                .find(|row| row.get("userId").and_then(Value::as_str) == Some(user_id))
        })
        .expect("participant listed");
    assert_eq!(field(row, "status"), "active");
    assert_eq!(row.get("removedUtc"), Some(&Value::Null));
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/tasting_flow.feature",
    name = "A guest joins with the code and reviews a beer"
)]
fn a_guest_joins_with_the_code_and_reviews_a_beer(world: RefCell<TastingWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/tasting_flow.feature",
    name = "Joining twice keeps a single membership"
)]
fn joining_twice_keeps_a_single_membership(world: RefCell<TastingWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/tasting_flow.feature",
    name = "A removed member cannot rejoin until restored"
)]
fn a_removed_member_cannot_rejoin_until_restored(world: RefCell<TastingWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/tasting_flow.feature",
    name = "Closing an event freezes member reviews"
)]
fn closing_an_event_freezes_member_reviews(world: RefCell<TastingWorld>) {
    drop(world);
}
