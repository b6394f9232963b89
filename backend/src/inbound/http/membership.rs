//! Joining events and managing participants.
//!
//! ```text
//! POST /api/events/{eventId}/join {"code":"ABCD1234"}
//! DELETE /api/events/{eventId}/participants/{userId}
//! POST /api/events/{eventId}/participants/{userId}/restore
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::JoinOutcome;
use crate::domain::{Error, EventId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_event_id, parse_user_id};

/// Body of `POST /events/{eventId}/join`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    /// Join code; compared case-insensitively after trimming.
    pub code: String,
}

/// Result of a join.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// Event joined.
    pub event_id: EventId,
    /// Joining user.
    pub user_id: UserId,
    /// `false` when the caller was already an active participant.
    pub joined: bool,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(value: JoinOutcome) -> Self {
        Self {
            event_id: value.event_id,
            user_id: value.user_id,
            joined: value.joined,
        }
    }
}

/// Join an event with its code.
#[utoipa::path(
    post,
    path = "/api/events/{eventId}/join",
    params(("eventId" = String, Path, description = "Event id")),
    request_body = JoinBody,
    responses(
        (status = 200, description = "Joined, or already a participant", body = JoinResponse),
        (status = 403, description = "Wrong code or removed participant", body = Error),
        (status = 404, description = "No such event", body = Error),
        (status = 409, description = "Event is not open", body = Error)
    ),
    tags = ["membership"],
    operation_id = "joinEvent"
)]
#[post("/events/{event_id}/join")]
pub async fn join_event(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<JoinBody>,
) -> ApiResult<web::Json<JoinResponse>> {
    let event_id = parse_event_id(&path)?;
    let outcome = state
        .membership
        .join(&caller.caller(), &event_id, &payload.code)
        .await?;
    Ok(web::Json(outcome.into()))
}

fn participant_path(path: &(String, String)) -> Result<(EventId, UserId), Error> {
    Ok((parse_event_id(&path.0)?, parse_user_id(&path.1)?))
}

/// Remove a participant from an event.
#[utoipa::path(
    delete,
    path = "/api/events/{eventId}/participants/{userId}",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("userId" = String, Path, description = "Participant user id")
    ),
    responses(
        (status = 204, description = "Participant removed"),
        (status = 400, description = "Target is the owner", body = Error),
        (status = 403, description = "Not a manager", body = Error),
        (status = 404, description = "No such event or participant", body = Error)
    ),
    tags = ["membership"],
    operation_id = "removeParticipant"
)]
#[delete("/events/{event_id}/participants/{user_id}")]
pub async fn remove_participant(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (event_id, user_id) = participant_path(&path)?;
    state
        .membership
        .remove(&caller.caller(), &event_id, &user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reinstate a removed participant.
#[utoipa::path(
    post,
    path = "/api/events/{eventId}/participants/{userId}/restore",
    params(
        ("eventId" = String, Path, description = "Event id"),
        ("userId" = String, Path, description = "Participant user id")
    ),
    responses(
        (status = 204, description = "Participant restored"),
        (status = 400, description = "Target is the owner", body = Error),
        (status = 403, description = "Not a manager", body = Error),
        (status = 404, description = "No such event or participant", body = Error),
        (status = 409, description = "Participant is not removed", body = Error)
    ),
    tags = ["membership"],
    operation_id = "restoreParticipant"
)]
#[post("/events/{event_id}/participants/{user_id}/restore")]
pub async fn restore_participant(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (event_id, user_id) = participant_path(&path)?;
    state
        .membership
        .restore(&caller.caller(), &event_id, &user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
