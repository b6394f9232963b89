//! Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence module. Conversions that can fail (an
//! unknown status label, a score outside the checked range) report a plain
//! message which each repository folds into its port's `Query` variant.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Beer, BeerId, Event, EventId, EventListing, EventName, EventStatus, Favorite, FavoriteSummary,
    JoinCode, Nickname, Participant, ParticipantStatus, ParticipantView, Review, ReviewId,
    ReviewNotes, ReviewScores, Role, Score, User, UserId, Visibility,
};

use super::schema::{
    app_users, beer_favorites, beer_reviews, event_beers, event_participants, events,
};

/// Users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = app_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub subject: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Mutable user columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = app_users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub email: Option<&'a str>,
    pub nickname: Option<&'a str>,
    pub last_seen_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            subject: user.subject.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone().map(String::from),
            created_at: user.created_at,
            last_seen_at: user.last_seen_at,
        }
    }
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email.as_deref(),
            nickname: user.nickname.as_ref().map(AsRef::as_ref),
            last_seen_at: user.last_seen_at,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            subject: row.subject,
            email: row.email,
            // Values were validated on the way in; a row edited out of band
            // degrades to no nickname.
            nickname: row.nickname.and_then(|raw| Nickname::new(raw).ok()),
            created_at: row.created_at,
            last_seen_at: row.last_seen_at,
        }
    }
}

/// Events.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub status: String,
    pub visibility: String,
    pub is_listed: bool,
    pub join_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            owner_user_id: *event.owner_user_id.as_uuid(),
            name: event.name.as_ref().to_owned(),
            status: event.status.as_str().to_owned(),
            visibility: event.listing.visibility().as_str().to_owned(),
            is_listed: event.listing.is_listed(),
            join_code: event.join_code.as_ref().to_owned(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = String;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let visibility = row.visibility.parse::<Visibility>().map_err(|err| err.to_string())?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            owner_user_id: UserId::from_uuid(row.owner_user_id),
            name: EventName::new(&row.name).map_err(|err| format!("event {}: {err}", row.id))?,
            status: row.status.parse::<EventStatus>().map_err(|err| err.to_string())?,
            listing: EventListing::new(visibility, row.is_listed)
                .map_err(|err| format!("event {}: {err}", row.id))?,
            join_code: JoinCode::new(&row.join_code)
                .map_err(|err| format!("event {}: {err}", row.id))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Participants.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = event_participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantRow {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<&Participant> for ParticipantRow {
    fn from(participant: &Participant) -> Self {
        Self {
            event_id: *participant.event_id.as_uuid(),
            user_id: *participant.user_id.as_uuid(),
            role: participant.role.as_str().to_owned(),
            status: participant.status.as_str().to_owned(),
            joined_at: participant.joined_at,
            removed_at: participant.removed_at,
        }
    }
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = String;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: EventId::from_uuid(row.event_id),
            user_id: UserId::from_uuid(row.user_id),
            role: row.role.parse::<Role>().map_err(|err| err.to_string())?,
            status: row
                .status
                .parse::<ParticipantStatus>()
                .map_err(|err| err.to_string())?,
            joined_at: row.joined_at,
            removed_at: row.removed_at,
        })
    }
}

/// Participant row joined with the user's nickname.
pub(crate) fn participant_view(
    (row, nickname): (ParticipantRow, Option<String>),
) -> Result<ParticipantView, String> {
    Ok(ParticipantView {
        participant: Participant::try_from(row)?,
        nickname: nickname.and_then(|raw| Nickname::new(raw).ok()),
    })
}

/// Beers.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = event_beers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BeerRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub brewery: Option<String>,
    pub style: Option<String>,
    pub abv: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Beer> for BeerRow {
    fn from(beer: &Beer) -> Self {
        Self {
            id: *beer.id.as_uuid(),
            event_id: *beer.event_id.as_uuid(),
            name: beer.name.clone(),
            brewery: beer.brewery.clone(),
            style: beer.style.clone(),
            abv: beer.abv,
            created_at: beer.created_at,
        }
    }
}

impl From<BeerRow> for Beer {
    fn from(row: BeerRow) -> Self {
        Self {
            id: BeerId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            name: row.name,
            brewery: row.brewery,
            style: row.style,
            abv: row.abv,
            created_at: row.created_at,
        }
    }
}

/// Favourites.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = beer_favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FavoriteRow {
    pub event_id: Uuid,
    pub beer_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Favorite> for FavoriteRow {
    fn from(favorite: &Favorite) -> Self {
        Self {
            event_id: *favorite.event_id.as_uuid(),
            beer_id: *favorite.beer_id.as_uuid(),
            user_id: *favorite.user_id.as_uuid(),
            created_at: favorite.created_at,
        }
    }
}

/// Favourite joined with its beer and event for the cross-event listing.
pub(crate) fn favorite_summary(
    (favorite, beer, event): (FavoriteRow, BeerRow, EventRow),
) -> Result<FavoriteSummary, String> {
    Ok(FavoriteSummary {
        event_id: EventId::from_uuid(event.id),
        event_name: event.name,
        event_status: event.status.parse::<EventStatus>().map_err(|err| err.to_string())?,
        beer_id: BeerId::from_uuid(beer.id),
        beer_name: beer.name,
        brewery: beer.brewery,
        style: beer.style,
        abv: beer.abv,
        favorited_at: favorite.created_at,
    })
}

/// Reviews.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = beer_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub beer_id: Uuid,
    pub user_id: Uuid,
    pub color_score: i16,
    pub smell_score: i16,
    pub taste_score: i16,
    pub total_score: i16,
    pub notes: Option<String>,
    pub aroma_notes: Option<String>,
    pub appearance_notes: Option<String>,
    pub flavor_notes: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns rewritten by a review update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = beer_reviews)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReviewUpdate<'a> {
    pub color_score: i16,
    pub smell_score: i16,
    pub taste_score: i16,
    pub total_score: i16,
    pub notes: Option<&'a str>,
    pub aroma_notes: Option<&'a str>,
    pub appearance_notes: Option<&'a str>,
    pub flavor_notes: Option<&'a str>,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

/// Database version (`INTEGER`) to domain version.
pub(crate) fn version_from_db(version: i32) -> Result<u32, String> {
    u32::try_from(version).map_err(|_| format!("negative review version {version}"))
}

/// Domain version to database version.
pub(crate) fn version_for_db(version: u32) -> Result<i32, String> {
    i32::try_from(version).map_err(|_| format!("review version {version} overflows"))
}

fn score_from_db(raw: i16) -> Result<Score, String> {
    Score::new(i64::from(raw)).map_err(|err| format!("stored score {raw}: {err}"))
}

impl TryFrom<&Review> for ReviewRow {
    type Error = String;

    fn try_from(review: &Review) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *review.id.as_uuid(),
            event_id: *review.event_id.as_uuid(),
            beer_id: *review.beer_id.as_uuid(),
            user_id: *review.user_id.as_uuid(),
            color_score: i16::from(review.scores.color.get()),
            smell_score: i16::from(review.scores.smell.get()),
            taste_score: i16::from(review.scores.taste.get()),
            total_score: i16::from(review.scores.total.get()),
            notes: review.notes.notes.clone(),
            aroma_notes: review.notes.aroma.clone(),
            appearance_notes: review.notes.appearance.clone(),
            flavor_notes: review.notes.flavor.clone(),
            version: version_for_db(review.version)?,
            created_at: review.created_at,
            updated_at: review.updated_at,
        })
    }
}

impl<'a> ReviewUpdate<'a> {
    /// Changeset for `review` as it should be stored.
    pub(crate) fn from_review(review: &'a Review) -> Result<Self, String> {
        Ok(Self {
            color_score: i16::from(review.scores.color.get()),
            smell_score: i16::from(review.scores.smell.get()),
            taste_score: i16::from(review.scores.taste.get()),
            total_score: i16::from(review.scores.total.get()),
            notes: review.notes.notes.as_deref(),
            aroma_notes: review.notes.aroma.as_deref(),
            appearance_notes: review.notes.appearance.as_deref(),
            flavor_notes: review.notes.flavor.as_deref(),
            version: version_for_db(review.version)?,
            updated_at: review.updated_at,
        })
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = String;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            beer_id: BeerId::from_uuid(row.beer_id),
            user_id: UserId::from_uuid(row.user_id),
            scores: ReviewScores {
                color: score_from_db(row.color_score)?,
                smell: score_from_db(row.smell_score)?,
                taste: score_from_db(row.taste_score)?,
                total: score_from_db(row.total_score)?,
            },
            notes: ReviewNotes {
                notes: row.notes,
                aroma: row.aroma_notes,
                appearance: row.appearance_notes,
                flavor: row.flavor_notes,
            },
            version: version_from_db(row.version)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn event_row(status: &str, visibility: &str, is_listed: bool) -> EventRow {
        EventRow {
            id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            name: "Friday Tasting".to_owned(),
            status: status.to_owned(),
            visibility: visibility.to_owned(),
            is_listed,
            join_code: "ABCD2345".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn event_rows_convert_both_ways() {
        let row = event_row("closed", "open", true);
        let event = Event::try_from(row.clone()).expect("valid row");
        assert_eq!(event.status, EventStatus::Closed);
        assert_eq!(event.listing.visibility(), Visibility::Open);

        let back = EventRow::from(&event);
        assert_eq!(back.status, row.status);
        assert_eq!(back.join_code, row.join_code);
    }

    #[rstest]
    #[case("paused", "open", false)]
    #[case("open", "public", false)]
    #[case("open", "private", true)]
    fn corrupt_event_rows_are_rejected(
        #[case] status: &str,
        #[case] visibility: &str,
        #[case] is_listed: bool,
    ) {
        assert!(Event::try_from(event_row(status, visibility, is_listed)).is_err());
    }

    #[rstest]
    fn participant_rows_parse_labels() {
        let row = ParticipantRow {
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: "member".to_owned(),
            status: "removed".to_owned(),
            joined_at: Utc::now(),
            removed_at: Some(Utc::now()),
        };
        let view = participant_view((row, Some("  ".to_owned()))).expect("valid row");
        assert_eq!(view.participant.role, Role::Member);
        assert_eq!(view.participant.status, ParticipantStatus::Removed);
        assert_eq!(view.nickname, None);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    fn out_of_range_scores_are_rejected(#[case] raw: i16) {
        assert!(score_from_db(raw).is_err());
    }

    #[rstest]
    fn versions_must_be_non_negative() {
        assert_eq!(version_from_db(3), Ok(3));
        assert!(version_from_db(-1).is_err());
        assert!(version_for_db(u32::MAX).is_err());
    }
}
