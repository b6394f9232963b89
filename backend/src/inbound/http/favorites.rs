//! Favourite marks.
//!
//! ```text
//! POST /api/events/{eventId}/beers/{beerId}/favorite
//! DELETE /api/events/{eventId}/beers/{beerId}/favorite
//! GET /api/events/{eventId}/favorites/me
//! GET /api/favorites/mine
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BeerId, Error, EventId, EventStatus, FavoriteSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_beer_id, parse_event_id};

/// One favourite in the cross-event listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    /// Event id.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Beer id.
    pub beer_id: BeerId,
    /// Beer name.
    pub beer_name: String,
    /// Brewery.
    pub brewery: Option<String>,
    /// Style.
    pub style: Option<String>,
    /// Alcohol by volume.
    pub abv: Option<f64>,
    /// When the favourite was marked.
    pub favorited_utc: DateTime<Utc>,
    /// Event status at read time.
    pub event_status: EventStatus,
}

impl From<FavoriteSummary> for FavoriteResponse {
    fn from(value: FavoriteSummary) -> Self {
        Self {
            event_id: value.event_id,
            event_name: value.event_name,
            beer_id: value.beer_id,
            beer_name: value.beer_name,
            brewery: value.brewery,
            style: value.style,
            abv: value.abv,
            favorited_utc: value.favorited_at,
            event_status: value.event_status,
        }
    }
}

fn beer_path(path: &(String, String)) -> Result<(EventId, BeerId), Error> {
    Ok((parse_event_id(&path.0)?, parse_beer_id(&path.1)?))
}

/// Mark a beer as a favourite; repeat calls succeed.
#[utoipa::path(
    post,
    path = "/api/events/{eventId}/beers/{beerId}/favorite",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("beerId" = String, Path, description = "Beer id")
    ),
    responses(
        (status = 204, description = "Favourite recorded"),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event or beer in this event", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "addFavorite"
)]
#[post("/events/{event_id}/beers/{beer_id}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (event_id, beer_id) = beer_path(&path)?;
    state
        .favorites
        .add(&caller.caller(), &event_id, &beer_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Clear a favourite mark; repeat calls succeed.
#[utoipa::path(
    delete,
    path = "/api/events/{eventId}/beers/{beerId}/favorite",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("beerId" = String, Path, description = "Beer id")
    ),
    responses(
        (status = 204, description = "Favourite cleared"),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event or beer in this event", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "removeFavorite"
)]
#[delete("/events/{event_id}/beers/{beer_id}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (event_id, beer_id) = beer_path(&path)?;
    state
        .favorites
        .remove(&caller.caller(), &event_id, &beer_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Ids of the beers the caller favourited in one event.
#[utoipa::path(
    get,
    path = "/api/events/{eventId}/favorites/me",
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Favourite beer ids", body = [BeerId]),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "listEventFavorites"
)]
#[get("/events/{event_id}/favorites/me")]
pub async fn list_event_favorites(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<BeerId>>> {
    let event_id = parse_event_id(&path)?;
    let ids = state
        .favorites
        .list_mine(&caller.caller(), &event_id)
        .await?;
    Ok(web::Json(ids))
}

/// The caller's favourites across every event they can still access.
#[utoipa::path(
    get,
    path = "/api/favorites/mine",
    responses(
        (status = 200, description = "Favourites, newest first", body = [FavoriteResponse]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "listMyFavorites"
)]
#[get("/favorites/mine")]
pub async fn list_my_favorites(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<FavoriteResponse>>> {
    let favorites = state.favorites.list_all_mine(&caller.caller()).await?;
    Ok(web::Json(
        favorites.into_iter().map(FavoriteResponse::from).collect(),
    ))
}
