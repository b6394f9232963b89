//! Diesel adapters against embedded PostgreSQL.
//!
//! # Runtime strategy
//!
//! Fixtures provision the database synchronously, then each test drives its
//! async body on a runtime owned by the context so migrations never run
//! inside an executor.

use std::future::Future;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tasting_backend::domain::ports::{
    BeerRepository, EventRepository, FavoritePersistenceError, FavoriteRepository,
    ParticipantPersistenceError, ParticipantRepository, ReviewPersistenceError, ReviewRepository,
    UserPersistenceError, UserRepository,
};
use tasting_backend::domain::{
    Beer, BeerDraft, Event, EventListing, EventName, EventStatus, Favorite, JoinCode, Nickname,
    Participant, ParticipantStatus, Review, ReviewDraft, ReviewInput, User, UserId,
    VerifiedIdentity, Visibility,
};
use tasting_backend::outbound::persistence::{
    DbPool, DieselBeerRepository, DieselEventRepository, DieselFavoriteRepository,
    DieselParticipantRepository, DieselReviewRepository, DieselUserRepository, PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, migrated_database};

// -----------------------------------------------------------------------------
// Test context
// -----------------------------------------------------------------------------

#[derive(Clone)]
struct Repos {
    users: DieselUserRepository,
    events: DieselEventRepository,
    participants: DieselParticipantRepository,
    beers: DieselBeerRepository,
    favorites: DieselFavoriteRepository,
    reviews: DieselReviewRepository,
}

struct TestContext {
    runtime: Runtime,
    repos: Repos,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn run<F, Fut>(&self, body: F) -> Fut::Output
    where
        F: FnOnce(Repos) -> Fut,
        Fut: Future,
    {
        self.runtime.block_on(body(self.repos.clone()))
    }
}

fn setup_test_context() -> Result<TestContext, String> {
    let database = migrated_database()?;
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(database.url())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repos: Repos {
            users: DieselUserRepository::new(pool.clone()),
            events: DieselEventRepository::new(pool.clone()),
            participants: DieselParticipantRepository::new(pool.clone()),
            beers: DieselBeerRepository::new(pool.clone()),
            favorites: DieselFavoriteRepository::new(pool.clone()),
            reviews: DieselReviewRepository::new(pool),
        },
        _database: database,
    })
}

#[fixture]
fn diesel_world() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

// -----------------------------------------------------------------------------
// Builders
// -----------------------------------------------------------------------------

/// Whole seconds so values survive the trip through `timestamptz`.
fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 15, 19, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn user(subject: &str) -> User {
    let identity = VerifiedIdentity::new(
        subject,
        Some(format!("{subject}@example.com")),
        Some(subject.to_owned()),
        Vec::new(),
    )
    .expect("valid identity");
    User::first_sight(&identity, at(0))
}

fn event(owner: UserId, code: &str, visibility: Visibility, listed: bool, minute: u32) -> Event {
    Event::create(
        owner,
        EventName::new(format!("Tasting {code}")).expect("valid name"),
        EventListing::new(visibility, listed).expect("valid listing"),
        JoinCode::new(code).expect("valid code"),
        at(minute),
    )
}

fn beer(event: &Event, name: &str) -> Beer {
    BeerDraft::new(name, Some("Brewery"), None, Some(5.2))
        .expect("valid beer")
        .into_beer(event.id, at(5))
}

fn review(beer: &Beer, user_id: UserId, score: i64) -> Review {
    let input = ReviewInput {
        rating: Some(score),
        ..ReviewInput::default()
    };
    ReviewDraft::new(&input)
        .expect("valid review")
        .into_review(beer.event_id, beer.id, user_id, at(6))
}

async fn seed_users(repos: &Repos, subjects: &[&str]) -> Vec<User> {
    let mut users = Vec::new();
    for subject in subjects {
        let user = user(subject);
        repos.users.insert(&user).await.expect("insert user");
        users.push(user);
    }
    users
}

async fn seed_event(repos: &Repos, event: &Event) {
    let owner = Participant::owner(event.id, event.owner_user_id, event.created_at);
    repos
        .events
        .insert_with_owner(event, &owner)
        .await
        .expect("insert event");
}

// -----------------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------------

#[rstest]
fn users_are_unique_by_subject(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: users_are_unique_by_subject skipped");
        return;
    };

    ctx.run(|repos| async move {
        let stored = user("auth0|alice");
        repos.users.insert(&stored).await.expect("first insert");

        let again = user("auth0|alice");
        let err = repos.users.insert(&again).await.expect_err("duplicate subject");
        assert!(
            matches!(err, UserPersistenceError::DuplicateKey { .. }),
            "expected DuplicateKey, got {err:?}"
        );

        let by_subject = repos
            .users
            .find_by_subject("auth0|alice")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(by_subject, stored);
        let by_id = repos.users.find_by_id(&stored.id).await.expect("lookup");
        assert_eq!(by_id, Some(stored));
    });
}

#[rstest]
fn user_updates_persist_nickname_and_last_seen(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: user_updates_persist_nickname_and_last_seen skipped");
        return;
    };

    ctx.run(|repos| async move {
        let [stored] = <[User; 1]>::try_from(seed_users(&repos, &["auth0|bob"]).await)
            .expect("one user");
        let updated = User {
            nickname: Some(Nickname::new("Hops").expect("valid nickname")),
            last_seen_at: at(30),
            ..stored.clone()
        };
        repos.users.update(&updated).await.expect("update");

        let fetched = repos.users.find_by_id(&stored.id).await.expect("lookup");
        assert_eq!(fetched, Some(updated));
    });
}

// -----------------------------------------------------------------------------
// Events
// -----------------------------------------------------------------------------

#[rstest]
fn events_are_created_with_their_owner_row(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: events_are_created_with_their_owner_row skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner"]).await;
        let owner = users.first().expect("owner").id;
        let created = event(owner, "ABCD2345", Visibility::Private, false, 1);
        seed_event(&repos, &created).await;

        assert_eq!(
            repos.events.find_by_id(&created.id).await.expect("lookup"),
            Some(created.clone())
        );
        assert!(
            repos
                .events
                .join_code_exists(&created.join_code)
                .await
                .expect("code lookup")
        );
        let row = repos
            .participants
            .find(&created.id, &owner)
            .await
            .expect("lookup")
            .expect("owner row");
        assert_eq!(row.status, ParticipantStatus::Active);

        let clash = event(owner, "ABCD2345", Visibility::Private, false, 2);
        let owner_row = Participant::owner(clash.id, owner, clash.created_at);
        assert!(
            repos
                .events
                .insert_with_owner(&clash, &owner_row)
                .await
                .is_err(),
            "join codes are unique"
        );
        assert_eq!(repos.events.find_by_id(&clash.id).await.expect("lookup"), None);
    });
}

#[rstest]
fn listings_follow_membership_and_visibility(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: listings_follow_membership_and_visibility skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner", "auth0|guest"]).await;
        let (owner, guest) = match users.as_slice() {
            [owner, guest] => (owner.id, guest.id),
            _ => panic!("two users seeded"),
        };
        let listed = event(owner, "LIST2345", Visibility::Open, true, 1);
        let newer_listed = event(owner, "LIST3456", Visibility::Open, true, 2);
        let unlisted = event(owner, "HIDE2345", Visibility::Open, false, 3);
        let private = event(owner, "PRIV2345", Visibility::Private, false, 4);
        for created in [&listed, &newer_listed, &unlisted, &private] {
            seed_event(&repos, created).await;
        }
        repos
            .participants
            .insert(&Participant::member(private.id, guest, at(10)))
            .await
            .expect("join private");
        let removed = Participant::member(newer_listed.id, guest, at(10));
        repos.participants.insert(&removed).await.expect("join");
        repos
            .participants
            .update_status(&removed.removed(at(11)), at(11))
            .await
            .expect("remove");

        let open: Vec<_> = repos
            .events
            .list_discoverable(&guest)
            .await
            .expect("discoverable")
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(open, vec![listed.id]);

        let mine: Vec<_> = repos
            .events
            .list_for_member(&guest)
            .await
            .expect("mine")
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(mine, vec![private.id]);

        let owned = repos.events.list_for_member(&owner).await.expect("owned");
        let ids: Vec<_> = owned.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![private.id, unlisted.id, newer_listed.id, listed.id]);
    });
}

#[rstest]
fn status_updates_touch_the_timestamp(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: status_updates_touch_the_timestamp skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner"]).await;
        let created = event(
            users.first().expect("owner").id,
            "STAT2345",
            Visibility::Private,
            false,
            1,
        );
        seed_event(&repos, &created).await;

        repos
            .events
            .update_status(&created.id, EventStatus::Closed, at(40))
            .await
            .expect("close");
        let fetched = repos
            .events
            .find_by_id(&created.id)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(fetched.status, EventStatus::Closed);
        assert_eq!(fetched.updated_at, at(40));
        assert_eq!(fetched.created_at, created.created_at);
    });
}

#[rstest]
fn deleting_an_event_cascades_to_dependents(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_an_event_cascades_to_dependents skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner", "auth0|guest"]).await;
        let (owner, guest) = match users.as_slice() {
            [owner, guest] => (owner.id, guest.id),
            _ => panic!("two users seeded"),
        };
        let doomed = event(owner, "GONE2345", Visibility::Private, false, 1);
        let kept = event(owner, "KEEP2345", Visibility::Private, false, 2);
        seed_event(&repos, &doomed).await;
        seed_event(&repos, &kept).await;
        repos
            .participants
            .insert(&Participant::member(doomed.id, guest, at(3)))
            .await
            .expect("join");
        let doomed_beer = beer(&doomed, "Pils");
        let kept_beer = beer(&kept, "Stout");
        repos.beers.insert(&doomed_beer).await.expect("beer");
        repos.beers.insert(&kept_beer).await.expect("beer");
        for target in [&doomed_beer, &kept_beer] {
            repos
                .favorites
                .insert(&Favorite::new(target.event_id, target.id, owner, at(7)))
                .await
                .expect("favorite");
        }
        let doomed_review = review(&doomed_beer, guest, 4);
        repos.reviews.insert(&doomed_review).await.expect("review");

        assert!(repos.events.delete_cascade(&doomed.id).await.expect("delete"));
        assert!(!repos.events.delete_cascade(&doomed.id).await.expect("repeat"));

        assert_eq!(repos.events.find_by_id(&doomed.id).await.expect("lookup"), None);
        assert!(
            repos
                .participants
                .list_for_event(&doomed.id)
                .await
                .expect("participants")
                .is_empty()
        );
        assert!(
            repos
                .beers
                .list_for_event(&doomed.id)
                .await
                .expect("beers")
                .is_empty()
        );
        assert_eq!(
            repos
                .reviews
                .find(&doomed.id, &doomed_beer.id, &guest)
                .await
                .expect("review lookup"),
            None
        );
        let favourites = repos.favorites.list_accessible(&owner).await.expect("list");
        let beers: Vec<_> = favourites.iter().map(|f| f.beer_id).collect();
        assert_eq!(beers, vec![kept_beer.id]);
    });
}

// -----------------------------------------------------------------------------
// Participants
// -----------------------------------------------------------------------------

#[rstest]
fn participant_rows_are_unique_and_keep_their_history(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: participant_rows_are_unique_and_keep_their_history skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner", "auth0|guest"]).await;
        let (owner, guest) = match users.as_slice() {
            [owner, guest] => (owner.id, guest.id),
            _ => panic!("two users seeded"),
        };
        let created = event(owner, "PART2345", Visibility::Private, false, 1);
        seed_event(&repos, &created).await;

        let member = Participant::member(created.id, guest, at(2));
        repos.participants.insert(&member).await.expect("join");
        let err = repos
            .participants
            .insert(&Participant::member(created.id, guest, at(3)))
            .await
            .expect_err("second row");
        assert!(
            matches!(err, ParticipantPersistenceError::DuplicateKey { .. }),
            "expected DuplicateKey, got {err:?}"
        );

        let removed = member.removed(at(4));
        repos
            .participants
            .update_status(&removed, at(4))
            .await
            .expect("remove");
        assert_eq!(
            repos
                .participants
                .find(&created.id, &guest)
                .await
                .expect("lookup"),
            Some(removed.clone())
        );

        let restored = removed.restored();
        repos
            .participants
            .update_status(&restored, at(5))
            .await
            .expect("restore");
        let row = repos
            .participants
            .find(&created.id, &guest)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(row.status, ParticipantStatus::Active);
        assert_eq!(row.removed_at, None);
        assert_eq!(row.joined_at, member.joined_at);

        let views = repos
            .participants
            .list_for_event(&created.id)
            .await
            .expect("list");
        assert_eq!(views.len(), 2);
    });
}

// -----------------------------------------------------------------------------
// Favourites
// -----------------------------------------------------------------------------

#[rstest]
fn favourites_are_unique_and_filtered_by_access(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: favourites_are_unique_and_filtered_by_access skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner", "auth0|guest"]).await;
        let (owner, guest) = match users.as_slice() {
            [owner, guest] => (owner.id, guest.id),
            _ => panic!("two users seeded"),
        };
        let first = event(owner, "FAVA2345", Visibility::Private, false, 1);
        let second = event(owner, "FAVB2345", Visibility::Private, false, 2);
        seed_event(&repos, &first).await;
        seed_event(&repos, &second).await;
        let mut memberships = Vec::new();
        for joined in [&first, &second] {
            let member = Participant::member(joined.id, guest, at(3));
            repos.participants.insert(&member).await.expect("join");
            memberships.push(member);
        }
        let first_beer = beer(&first, "Pils");
        let second_beer = beer(&second, "Stout");
        repos.beers.insert(&first_beer).await.expect("beer");
        repos.beers.insert(&second_beer).await.expect("beer");

        let mark = Favorite::new(first.id, first_beer.id, guest, at(8));
        repos.favorites.insert(&mark).await.expect("favorite");
        let err = repos.favorites.insert(&mark).await.expect_err("duplicate");
        assert!(
            matches!(err, FavoritePersistenceError::DuplicateKey { .. }),
            "expected DuplicateKey, got {err:?}"
        );
        repos
            .favorites
            .insert(&Favorite::new(second.id, second_beer.id, guest, at(9)))
            .await
            .expect("favorite");

        let listed = repos.favorites.list_accessible(&guest).await.expect("list");
        let beers: Vec<_> = listed.iter().map(|f| f.beer_id).collect();
        assert_eq!(beers, vec![second_beer.id, first_beer.id]);
        let newest = listed.first().expect("one summary");
        assert_eq!(newest.beer_name, "Stout");
        assert_eq!(newest.event_name, "Tasting FAVB2345");
        assert_eq!(newest.favorited_at, at(9));

        let removed = memberships.pop().expect("second membership").removed(at(20));
        repos
            .participants
            .update_status(&removed, at(20))
            .await
            .expect("remove");
        let listed = repos.favorites.list_accessible(&guest).await.expect("list");
        let beers: Vec<_> = listed.iter().map(|f| f.beer_id).collect();
        assert_eq!(beers, vec![first_beer.id]);

        assert_eq!(
            repos
                .favorites
                .list_beer_ids(&first.id, &guest)
                .await
                .expect("ids"),
            vec![first_beer.id]
        );
        assert!(
            repos
                .favorites
                .delete(&first.id, &first_beer.id, &guest)
                .await
                .expect("delete")
        );
        assert!(
            !repos
                .favorites
                .delete(&first.id, &first_beer.id, &guest)
                .await
                .expect("repeat")
        );
    });
}

// -----------------------------------------------------------------------------
// Reviews
// -----------------------------------------------------------------------------

#[rstest]
fn reviews_are_exclusive_and_versioned(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: reviews_are_exclusive_and_versioned skipped");
        return;
    };

    ctx.run(|repos| async move {
        let users = seed_users(&repos, &["auth0|owner"]).await;
        let owner = users.first().expect("owner").id;
        let created = event(owner, "REVW2345", Visibility::Private, false, 1);
        seed_event(&repos, &created).await;
        let pils = beer(&created, "Pils");
        repos.beers.insert(&pils).await.expect("beer");

        let stored = review(&pils, owner, 4);
        repos.reviews.insert(&stored).await.expect("review");
        let err = repos
            .reviews
            .insert(&review(&pils, owner, 2))
            .await
            .expect_err("second review");
        assert!(
            matches!(err, ReviewPersistenceError::DuplicateKey { .. }),
            "expected DuplicateKey, got {err:?}"
        );

        let bumped = Review {
            version: stored.version + 1,
            updated_at: stored.updated_at + Duration::minutes(5),
            ..stored.clone()
        };
        repos
            .reviews
            .update(&bumped, stored.version)
            .await
            .expect("first swap wins");
        let err = repos
            .reviews
            .update(&bumped, stored.version)
            .await
            .expect_err("stale swap loses");
        assert!(
            matches!(
                err,
                ReviewPersistenceError::VersionMismatch {
                    expected: 1,
                    actual: 2
                }
            ),
            "expected VersionMismatch, got {err:?}"
        );

        let fetched = repos
            .reviews
            .find(&created.id, &pils.id, &owner)
            .await
            .expect("lookup");
        assert_eq!(fetched, Some(bumped));

        let ghost = review(&pils, UserId::random(), 3);
        let err = repos.reviews.update(&ghost, 1).await.expect_err("no row");
        assert!(
            matches!(err, ReviewPersistenceError::NotFound),
            "expected NotFound, got {err:?}"
        );
    });
}
