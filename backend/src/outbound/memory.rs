//! In-process store implementing every repository port.
//!
//! Used when no database is configured and by the HTTP integration suites.
//! It mirrors the relational constraints the services rely on: unique join
//! codes, subjects, (event, user) participants, (user, beer) favourites and
//! (event, beer, user) reviews, plus the review version compare-and-swap.
//! Data lives only as long as the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    BeerPersistenceError, BeerRepository, EventPersistenceError, EventRepository,
    FavoritePersistenceError, FavoriteRepository, ParticipantPersistenceError,
    ParticipantRepository, ReviewPersistenceError, ReviewRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    Beer, BeerId, Event, EventId, EventStatus, Favorite, FavoriteSummary, JoinCode, Participant,
    ParticipantStatus, ParticipantView, Review, User, UserId, Visibility,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    participants: BTreeMap<(EventId, UserId), Participant>,
    beers: HashMap<BeerId, Beer>,
    favorites: BTreeMap<(UserId, BeerId), Favorite>,
    reviews: BTreeMap<(EventId, BeerId, UserId), Review>,
}

impl State {
    fn has_access(&self, event: &Event, user_id: &UserId) -> bool {
        event.owner_user_id == *user_id
            || self
                .participants
                .get(&(event.id, *user_id))
                .is_some_and(Participant::is_active)
    }
}

/// Shared in-memory store; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first(events: &mut [Event]) {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.subject == subject)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state.users.values().any(|other| other.subject == user.subject) {
            return Err(UserPersistenceError::duplicate_key(format!(
                "subject {} already linked",
                user.subject
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| UserPersistenceError::query(format!("user {} missing", user.id)))?;
        stored.email.clone_from(&user.email);
        stored.nickname.clone_from(&user.nickname);
        stored.last_seen_at = user.last_seen_at;
        Ok(())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert_with_owner(
        &self,
        event: &Event,
        owner: &Participant,
    ) -> Result<(), EventPersistenceError> {
        let mut state = self.lock();
        if state
            .events
            .values()
            .any(|other| other.join_code == event.join_code)
        {
            return Err(EventPersistenceError::duplicate_key("join code already in use"));
        }
        state.events.insert(event.id, event.clone());
        state
            .participants
            .insert((owner.event_id, owner.user_id), owner.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        Ok(self.lock().events.get(id).cloned())
    }

    async fn join_code_exists(&self, code: &JoinCode) -> Result<bool, EventPersistenceError> {
        Ok(self.lock().events.values().any(|event| event.join_code == *code))
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventPersistenceError> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| state.has_access(event, user_id))
            .cloned()
            .collect();
        newest_first(&mut events);
        Ok(events)
    }

    async fn list_discoverable(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Event>, EventPersistenceError> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| {
                event.status == EventStatus::Open
                    && event.listing.visibility() == Visibility::Open
                    && event.listing.is_listed()
                    && !state
                        .participants
                        .get(&(event.id, *user_id))
                        .is_some_and(|row| row.status == ParticipantStatus::Removed)
            })
            .cloned()
            .collect();
        newest_first(&mut events);
        Ok(events)
    }

    async fn update_status(
        &self,
        id: &EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> Result<(), EventPersistenceError> {
        let mut state = self.lock();
        let event = state
            .events
            .get_mut(id)
            .ok_or_else(|| EventPersistenceError::query(format!("event {id} missing")))?;
        event.status = status;
        event.updated_at = now;
        Ok(())
    }

    async fn delete_cascade(&self, id: &EventId) -> Result<bool, EventPersistenceError> {
        let mut state = self.lock();
        if state.events.remove(id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|_, favorite| favorite.event_id != *id);
        state.reviews.retain(|(event_id, _, _), _| event_id != id);
        state.beers.retain(|_, beer| beer.event_id != *id);
        state.participants.retain(|(event_id, _), _| event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn find(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Option<Participant>, ParticipantPersistenceError> {
        Ok(self.lock().participants.get(&(*event_id, *user_id)).cloned())
    }

    async fn list_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<ParticipantView>, ParticipantPersistenceError> {
        let state = self.lock();
        let mut views: Vec<ParticipantView> = state
            .participants
            .values()
            .filter(|row| row.event_id == *event_id)
            .map(|row| ParticipantView {
                nickname: state
                    .users
                    .get(&row.user_id)
                    .and_then(|user| user.nickname.clone()),
                participant: row.clone(),
            })
            .collect();
        views.sort_by(|a, b| a.participant.joined_at.cmp(&b.participant.joined_at));
        Ok(views)
    }

    async fn insert(&self, participant: &Participant) -> Result<(), ParticipantPersistenceError> {
        let mut state = self.lock();
        let key = (participant.event_id, participant.user_id);
        if state.participants.contains_key(&key) {
            return Err(ParticipantPersistenceError::duplicate_key(
                "participant already exists for event and user",
            ));
        }
        state.participants.insert(key, participant.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        participant: &Participant,
        now: DateTime<Utc>,
    ) -> Result<(), ParticipantPersistenceError> {
        let mut state = self.lock();
        let key = (participant.event_id, participant.user_id);
        let row = state
            .participants
            .get_mut(&key)
            .ok_or_else(|| ParticipantPersistenceError::query("participant missing"))?;
        row.status = participant.status;
        row.removed_at = participant.removed_at;
        if let Some(event) = state.events.get_mut(&participant.event_id) {
            event.updated_at = now;
        }
        Ok(())
    }
}

#[async_trait]
impl BeerRepository for MemoryStore {
    async fn insert(&self, beer: &Beer) -> Result<(), BeerPersistenceError> {
        let mut state = self.lock();
        if !state.events.contains_key(&beer.event_id) {
            return Err(BeerPersistenceError::query("beer references a missing event"));
        }
        state.beers.insert(beer.id, beer.clone());
        Ok(())
    }

    async fn find_in_event(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
    ) -> Result<Option<Beer>, BeerPersistenceError> {
        Ok(self
            .lock()
            .beers
            .get(beer_id)
            .filter(|beer| beer.event_id == *event_id)
            .cloned())
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Beer>, BeerPersistenceError> {
        let mut beers: Vec<Beer> = self
            .lock()
            .beers
            .values()
            .filter(|beer| beer.event_id == *event_id)
            .cloned()
            .collect();
        beers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(beers)
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut state = self.lock();
        let key = (favorite.user_id, favorite.beer_id);
        if state.favorites.contains_key(&key) {
            return Err(FavoritePersistenceError::duplicate_key(
                "favorite already exists for user and beer",
            ));
        }
        state.favorites.insert(key, favorite.clone());
        Ok(())
    }

    async fn delete(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut state = self.lock();
        let key = (*user_id, *beer_id);
        let matches = state
            .favorites
            .get(&key)
            .is_some_and(|favorite| favorite.event_id == *event_id);
        if matches {
            state.favorites.remove(&key);
        }
        Ok(matches)
    }

    async fn list_beer_ids(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<Vec<BeerId>, FavoritePersistenceError> {
        let state = self.lock();
        let mut favorites: Vec<&Favorite> = state
            .favorites
            .values()
            .filter(|favorite| favorite.event_id == *event_id && favorite.user_id == *user_id)
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites.into_iter().map(|favorite| favorite.beer_id).collect())
    }

    async fn list_accessible(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FavoriteSummary>, FavoritePersistenceError> {
        let state = self.lock();
        let mut summaries: Vec<FavoriteSummary> = state
            .favorites
            .values()
            .filter(|favorite| favorite.user_id == *user_id)
            .filter_map(|favorite| {
                let event = state.events.get(&favorite.event_id)?;
                let beer = state.beers.get(&favorite.beer_id)?;
                state.has_access(event, user_id).then(|| FavoriteSummary {
                    event_id: event.id,
                    event_name: event.name.as_ref().to_owned(),
                    event_status: event.status,
                    beer_id: beer.id,
                    beer_name: beer.name.clone(),
                    brewery: beer.brewery.clone(),
                    style: beer.style.clone(),
                    abv: beer.abv,
                    favorited_at: favorite.created_at,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.favorited_at.cmp(&a.favorited_at));
        Ok(summaries)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self
            .lock()
            .reviews
            .get(&(*event_id, *beer_id, *user_id))
            .cloned())
    }

    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut state = self.lock();
        let key = (review.event_id, review.beer_id, review.user_id);
        if state.reviews.contains_key(&key) {
            return Err(ReviewPersistenceError::duplicate_key(
                "review already exists for event, beer and user",
            ));
        }
        state.reviews.insert(key, review.clone());
        Ok(())
    }

    async fn update(
        &self,
        review: &Review,
        expected_version: u32,
    ) -> Result<(), ReviewPersistenceError> {
        let mut state = self.lock();
        let key = (review.event_id, review.beer_id, review.user_id);
        let stored = state
            .reviews
            .get_mut(&key)
            .ok_or_else(ReviewPersistenceError::not_found)?;
        if stored.version != expected_version {
            return Err(ReviewPersistenceError::version_mismatch(
                expected_version,
                stored.version,
            ));
        }
        *stored = review.clone();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
