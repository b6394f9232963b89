//! Event lifecycle handlers.
//!
//! ```text
//! POST /api/events {"name":"Friday Tasting","visibility":"private"}
//! GET /api/events/mine
//! GET /api/events/open
//! GET /api/events/{eventId}
//! DELETE /api/events/{eventId}
//! PATCH /api/events/{eventId}/status {"status":"closed"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateEventRequest, EventDetails, ViewerRole};
use crate::domain::{
    Error, Event, EventId, EventStatus, FieldErrors, ParticipantStatus, ParticipantView, Role,
    TargetStatus, UserId, Visibility,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_event_id;

/// Body of `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    /// Display name; trimmed, 1 to 200 characters.
    pub name: String,
    /// Defaults to `private`.
    #[serde(default)]
    pub visibility: Option<Visibility>,
    /// Defaults to `false`; only open events may be listed.
    #[serde(default)]
    pub is_listed: Option<bool>,
}

impl From<CreateEventBody> for CreateEventRequest {
    fn from(value: CreateEventBody) -> Self {
        Self {
            name: value.name,
            visibility: value.visibility.unwrap_or_default(),
            is_listed: value.is_listed.unwrap_or(false),
        }
    }
}

/// Body of `PATCH /events/{eventId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusBody {
    /// `open` or `closed`.
    pub status: String,
}

/// Event as listed; the join code is withheld.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryResponse {
    /// Event id.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Who can discover the event.
    pub visibility: Visibility,
    /// Publicly listed.
    pub is_listed: bool,
    /// Owning user.
    pub owner_user_id: UserId,
    /// Creation time.
    pub created_utc: DateTime<Utc>,
    /// Last change time.
    pub updated_utc: DateTime<Utc>,
}

impl From<&Event> for EventSummaryResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.as_ref().to_owned(),
            status: event.status,
            visibility: event.listing.visibility(),
            is_listed: event.listing.is_listed(),
            owner_user_id: event.owner_user_id,
            created_utc: event.created_at,
            updated_utc: event.updated_at,
        }
    }
}

/// One participant row in event details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    /// Member.
    pub user_id: UserId,
    /// Owner or member.
    pub role: Role,
    /// Membership status.
    pub status: ParticipantStatus,
    /// When the membership began.
    pub joined_utc: DateTime<Utc>,
    /// Set while removed.
    pub removed_utc: Option<DateTime<Utc>>,
    /// Member nickname.
    pub nickname: Option<String>,
}

impl From<&ParticipantView> for ParticipantResponse {
    fn from(view: &ParticipantView) -> Self {
        let participant = &view.participant;
        Self {
            user_id: participant.user_id,
            role: participant.role,
            status: participant.status,
            joined_utc: participant.joined_at,
            removed_utc: participant.removed_at,
            nickname: view.nickname.as_ref().map(|n| n.as_ref().to_owned()),
        }
    }
}

/// Full event as seen by someone with access.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsResponse {
    /// Event id.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Who can discover the event.
    pub visibility: Visibility,
    /// Publicly listed.
    pub is_listed: bool,
    /// Code required to join.
    pub join_code: String,
    /// Owning user.
    pub owner_user_id: UserId,
    /// Creation time.
    pub created_utc: DateTime<Utc>,
    /// Last change time.
    pub updated_utc: DateTime<Utc>,
    /// Caller's relation to the event.
    pub current_user_role: ViewerRole,
    /// Every participant, oldest join first.
    pub participants: Vec<ParticipantResponse>,
}

impl From<&EventDetails> for EventDetailsResponse {
    fn from(details: &EventDetails) -> Self {
        let event = &details.event;
        Self {
            id: event.id,
            name: event.name.as_ref().to_owned(),
            status: event.status,
            visibility: event.listing.visibility(),
            is_listed: event.listing.is_listed(),
            join_code: event.join_code.as_ref().to_owned(),
            owner_user_id: event.owner_user_id,
            created_utc: event.created_at,
            updated_utc: event.updated_at,
            current_user_role: details.viewer_role,
            participants: details
                .participants
                .iter()
                .map(ParticipantResponse::from)
                .collect(),
        }
    }
}

fn summaries(events: &[Event]) -> Vec<EventSummaryResponse> {
    events.iter().map(EventSummaryResponse::from).collect()
}

fn parse_target_status(raw: &str) -> Result<TargetStatus, Error> {
    let mut errors = FieldErrors::new();
    errors
        .capture("status", raw.parse::<TargetStatus>())
        .ok_or_else(|| errors.into_error("status must be open or closed"))
}

/// Create an event owned by the caller.
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventBody,
    responses(
        (status = 201, description = "Event created", body = EventDetailsResponse),
        (status = 400, description = "Invalid name or visibility", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateEventBody>,
) -> ApiResult<HttpResponse> {
    let details = state
        .events
        .create(&caller.caller(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(EventDetailsResponse::from(&details)))
}

/// Events the caller owns or actively participates in, newest first.
#[utoipa::path(
    get,
    path = "/api/events/mine",
    responses(
        (status = 200, description = "Accessible events", body = [EventSummaryResponse]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["events"],
    operation_id = "listMyEvents"
)]
#[get("/events/mine")]
pub async fn list_my_events(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<EventSummaryResponse>>> {
    let events = state.events.list_mine(&caller.caller()).await?;
    Ok(web::Json(summaries(&events)))
}

/// Discoverable open events, newest first.
#[utoipa::path(
    get,
    path = "/api/events/open",
    responses(
        (status = 200, description = "Listed open events", body = [EventSummaryResponse]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["events"],
    operation_id = "listOpenEvents"
)]
#[get("/events/open")]
pub async fn list_open_events(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<EventSummaryResponse>>> {
    let events = state.events.list_open(&caller.caller()).await?;
    Ok(web::Json(summaries(&events)))
}

/// Event details including participants and the caller's role.
#[utoipa::path(
    get,
    path = "/api/events/{eventId}",
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event details", body = EventDetailsResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{event_id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventDetailsResponse>> {
    let event_id = parse_event_id(&path)?;
    let details = state.events.details(&caller.caller(), &event_id).await?;
    Ok(web::Json(EventDetailsResponse::from(&details)))
}

/// Delete an event and everything attached to it.
#[utoipa::path(
    delete,
    path = "/api/events/{eventId}",
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Not a manager", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{event_id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let event_id = parse_event_id(&path)?;
    state.events.delete(&caller.caller(), &event_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Open or close an event.
#[utoipa::path(
    patch,
    path = "/api/events/{eventId}/status",
    params(("eventId" = String, Path, description = "Event id")),
    request_body = ChangeStatusBody,
    responses(
        (status = 200, description = "Event after the change", body = EventSummaryResponse),
        (status = 400, description = "Invalid status value", body = Error),
        (status = 403, description = "Not a manager", body = Error),
        (status = 404, description = "No such event", body = Error),
        (status = 409, description = "Status not driven by this endpoint", body = Error)
    ),
    tags = ["events"],
    operation_id = "changeEventStatus"
)]
#[patch("/events/{event_id}/status")]
pub async fn change_event_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<ChangeStatusBody>,
) -> ApiResult<web::Json<EventSummaryResponse>> {
    let event_id = parse_event_id(&path)?;
    let target = parse_target_status(&payload.status)?;
    let event = state
        .events
        .change_status(&caller.caller(), &event_id, target)
        .await?;
    Ok(web::Json(EventSummaryResponse::from(&event)))
}
