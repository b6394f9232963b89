//! Beers poured at an event.
//!
//! ```text
//! GET /api/events/{eventId}/beers
//! POST /api/events/{eventId}/beers {"name":"Pils","abv":4.8}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AddBeerRequest;
use crate::domain::{Beer, BeerId, Error, EventId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_event_id;

/// Body of `POST /events/{eventId}/beers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBeerBody {
    /// Name; 1 to 200 characters.
    pub name: String,
    /// Brewery; up to 200 characters.
    #[serde(default)]
    pub brewery: Option<String>,
    /// Style; up to 100 characters.
    #[serde(default)]
    pub style: Option<String>,
    /// Alcohol by volume in percent, 0 to 100.
    #[serde(default)]
    pub abv: Option<f64>,
}

impl From<AddBeerBody> for AddBeerRequest {
    fn from(value: AddBeerBody) -> Self {
        Self {
            name: value.name,
            brewery: value.brewery,
            style: value.style,
            abv: value.abv,
        }
    }
}

/// A beer entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeerResponse {
    /// Beer id.
    pub id: BeerId,
    /// Owning event.
    pub event_id: EventId,
    /// Name.
    pub name: String,
    /// Brewery.
    pub brewery: Option<String>,
    /// Style.
    pub style: Option<String>,
    /// Alcohol by volume.
    pub abv: Option<f64>,
    /// When the beer was added.
    pub created_utc: DateTime<Utc>,
}

impl From<Beer> for BeerResponse {
    fn from(beer: Beer) -> Self {
        Self {
            id: beer.id,
            event_id: beer.event_id,
            name: beer.name,
            brewery: beer.brewery,
            style: beer.style,
            abv: beer.abv,
            created_utc: beer.created_at,
        }
    }
}

/// Beers of an event, oldest first.
#[utoipa::path(
    get,
    path = "/api/events/{eventId}/beers",
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Beers", body = [BeerResponse]),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["beers"],
    operation_id = "listBeers"
)]
#[get("/events/{event_id}/beers")]
pub async fn list_beers(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<BeerResponse>>> {
    let event_id = parse_event_id(&path)?;
    let beers = state.beers.list(&caller.caller(), &event_id).await?;
    Ok(web::Json(beers.into_iter().map(BeerResponse::from).collect()))
}

/// Add a beer to an event.
#[utoipa::path(
    post,
    path = "/api/events/{eventId}/beers",
    params(("eventId" = String, Path, description = "Event id")),
    request_body = AddBeerBody,
    responses(
        (status = 201, description = "Beer added", body = BeerResponse),
        (status = 400, description = "Invalid beer", body = Error),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["beers"],
    operation_id = "addBeer"
)]
#[post("/events/{event_id}/beers")]
pub async fn add_beer(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<AddBeerBody>,
) -> ApiResult<HttpResponse> {
    let event_id = parse_event_id(&path)?;
    let beer = state
        .beers
        .add(&caller.caller(), &event_id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(BeerResponse::from(beer)))
}
