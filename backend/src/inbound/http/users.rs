//! Current-user handlers.
//!
//! ```text
//! GET /api/users/me
//! PATCH /api/users/me {"nickname":"Hop Head"}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrentUser, Error, FieldErrors, Nickname, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Authenticated;
use crate::inbound::http::state::HttpState;

/// The authenticated user as returned by `/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Internal user id.
    pub id: UserId,
    /// External subject.
    pub subject: String,
    /// Email claimed by the identity provider.
    pub email: Option<String>,
    /// Display nickname.
    pub nickname: Option<String>,
    /// Holds the admin scope.
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserResponse {
    fn from(value: &CurrentUser) -> Self {
        let user = &value.user;
        Self {
            id: user.id,
            subject: user.subject.clone(),
            email: user.email.clone(),
            nickname: user.nickname.as_ref().map(|n| n.as_ref().to_owned()),
            is_admin: value.is_admin,
        }
    }
}

/// Body of `PATCH /users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    /// New nickname; trimmed, 1 to 100 characters.
    pub nickname: String,
}

/// Return the caller.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 503, description = "Authentication is not configured", body = Error)
    ),
    tags = ["users"],
    operation_id = "getMe"
)]
#[get("/users/me")]
pub async fn get_me(caller: Authenticated) -> web::Json<UserResponse> {
    web::Json(UserResponse::from(caller.current()))
}

/// Change the caller's nickname.
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid nickname", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateMe"
)]
#[patch("/users/me")]
pub async fn update_me(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<UpdateMeRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let mut errors = FieldErrors::new();
    let nickname = errors.capture("nickname", Nickname::new(&payload.nickname));
    let nickname = nickname.ok_or_else(|| errors.into_error("profile is invalid"))?;
    let updated = state
        .identity
        .update_nickname(caller.current(), nickname)
        .await?;
    Ok(web::Json(UserResponse::from(&updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, with_admin_identity, with_identity};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(memory_state()))
            .service(web::scope("/api").service(get_me).service(update_me))
    }

    #[rstest]
    #[actix_web::test]
    async fn me_reports_subject_and_admin_flag() {
        let app = test::init_service(test_app()).await;
        let req = with_admin_identity(test::TestRequest::get().uri("/api/users/me"), "auth0|ada")
            .to_request();
        let body: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body.subject, "auth0|ada");
        assert_eq!(body.nickname.as_deref(), Some("auth0|ada"));
        assert!(body.is_admin);
    }

    #[rstest]
    #[actix_web::test]
    async fn nickname_patch_is_trimmed_and_persisted() {
        let app = test::init_service(test_app()).await;
        let patch = with_identity(test::TestRequest::patch().uri("/api/users/me"), "auth0|ada")
            .set_json(json!({"nickname": "  Hop Head "}))
            .to_request();
        let res = test::call_service(&app, patch).await;
        assert_eq!(res.status(), StatusCode::OK);

        let get = with_identity(test::TestRequest::get().uri("/api/users/me"), "auth0|ada")
            .to_request();
        let body: UserResponse = test::read_body_json(test::call_service(&app, get).await).await;
        assert_eq!(body.nickname.as_deref(), Some("Hop Head"));
    }

    #[rstest]
    #[case("   ".to_owned())]
    #[case("x".repeat(101))]
    #[actix_web::test]
    async fn invalid_nicknames_are_rejected(#[case] nickname: String) {
        let app = test::init_service(test_app()).await;
        let req = with_identity(test::TestRequest::patch().uri("/api/users/me"), "auth0|ada")
            .set_json(json!({ "nickname": nickname }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert!(body.pointer("/details/fields/nickname").is_some());
    }
}
