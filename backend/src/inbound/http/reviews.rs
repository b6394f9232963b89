//! Review handlers.
//!
//! ```text
//! POST /api/events/{eventId}/beers/{beerId}/reviews {"rating":5}
//! GET /api/events/{eventId}/beers/{beerId}/reviews/me
//! PATCH /api/events/{eventId}/beers/{beerId}/reviews/me {"notes":""}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BeerId, Error, EventId, Review, ReviewId, ReviewInput, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_beer_id, parse_event_id};

/// Review fields sent by clients.
///
/// On create every score must be given, directly or through `rating`. On
/// update every field is optional and an empty string clears a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    /// Colour score, 1 to 6.
    #[serde(default)]
    pub color_score: Option<i64>,
    /// Smell score, 1 to 6.
    #[serde(default)]
    pub smell_score: Option<i64>,
    /// Taste score, 1 to 6.
    #[serde(default)]
    pub taste_score: Option<i64>,
    /// Overall score, 1 to 6.
    #[serde(default)]
    pub total_score: Option<i64>,
    /// Fills any score left out.
    #[serde(default)]
    pub rating: Option<i64>,
    /// General notes, up to 2000 characters.
    #[serde(default)]
    pub notes: Option<String>,
    /// Aroma notes, up to 1000 characters.
    #[serde(default)]
    pub aroma_notes: Option<String>,
    /// Appearance notes, up to 1000 characters.
    #[serde(default)]
    pub appearance_notes: Option<String>,
    /// Flavour notes, up to 1000 characters.
    #[serde(default)]
    pub flavor_notes: Option<String>,
}

impl From<ReviewBody> for ReviewInput {
    fn from(value: ReviewBody) -> Self {
        Self {
            color_score: value.color_score,
            smell_score: value.smell_score,
            taste_score: value.taste_score,
            total_score: value.total_score,
            rating: value.rating,
            notes: value.notes,
            aroma_notes: value.aroma_notes,
            appearance_notes: value.appearance_notes,
            flavor_notes: value.flavor_notes,
        }
    }
}

/// A stored review.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Review id.
    pub id: ReviewId,
    /// Event.
    pub event_id: EventId,
    /// Reviewed beer.
    pub beer_id: BeerId,
    /// Author.
    pub user_id: UserId,
    /// Colour score.
    pub color_score: u8,
    /// Smell score.
    pub smell_score: u8,
    /// Taste score.
    pub taste_score: u8,
    /// Overall score.
    pub total_score: u8,
    /// General notes.
    pub notes: Option<String>,
    /// Aroma notes.
    pub aroma_notes: Option<String>,
    /// Appearance notes.
    pub appearance_notes: Option<String>,
    /// Flavour notes.
    pub flavor_notes: Option<String>,
    /// Creation time.
    pub created_utc: DateTime<Utc>,
    /// Last change time.
    pub updated_utc: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            event_id: review.event_id,
            beer_id: review.beer_id,
            user_id: review.user_id,
            color_score: review.scores.color.get(),
            smell_score: review.scores.smell.get(),
            taste_score: review.scores.taste.get(),
            total_score: review.scores.total.get(),
            notes: review.notes.notes,
            aroma_notes: review.notes.aroma,
            appearance_notes: review.notes.appearance,
            flavor_notes: review.notes.flavor,
            created_utc: review.created_at,
            updated_utc: review.updated_at,
        }
    }
}

fn beer_path(path: &(String, String)) -> Result<(EventId, BeerId), Error> {
    Ok((parse_event_id(&path.0)?, parse_beer_id(&path.1)?))
}

/// Create the caller's review of a beer.
#[utoipa::path(
    post,
    path = "/api/events/{eventId}/beers/{beerId}/reviews",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("beerId" = String, Path, description = "Beer id")
    ),
    request_body = ReviewBody,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid scores or notes", body = Error),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event or beer in this event", body = Error),
        (status = 409, description = "Already reviewed, or event closed", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/events/{event_id}/beers/{beer_id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<HttpResponse> {
    let (event_id, beer_id) = beer_path(&path)?;
    let review = state
        .reviews
        .create(&caller.caller(), &event_id, &beer_id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// The caller's review of a beer.
#[utoipa::path(
    get,
    path = "/api/events/{eventId}/beers/{beerId}/reviews/me",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("beerId" = String, Path, description = "Beer id")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No review, or no such beer in this event", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getMyReview"
)]
#[get("/events/{event_id}/beers/{beer_id}/reviews/me")]
pub async fn get_my_review(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let (event_id, beer_id) = beer_path(&path)?;
    let review = state
        .reviews
        .get(&caller.caller(), &event_id, &beer_id)
        .await?;
    Ok(web::Json(review.into()))
}

/// Update the caller's review.
#[utoipa::path(
    patch,
    path = "/api/events/{eventId}/beers/{beerId}/reviews/me",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("beerId" = String, Path, description = "Beer id")
    ),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 400, description = "Invalid scores or notes", body = Error),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No review to update", body = Error),
        (status = 409, description = "Event closed or concurrent update", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateMyReview"
)]
#[patch("/events/{event_id}/beers/{beer_id}/reviews/me")]
pub async fn update_my_review(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let (event_id, beer_id) = beer_path(&path)?;
    let review = state
        .reviews
        .update(&caller.caller(), &event_id, &beer_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(review.into()))
}
