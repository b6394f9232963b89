//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint from the inbound layer together
//! with the request and response schemas. The document is served by Swagger
//! UI in debug builds and exported via `cargo run --bin openapi-dump`.

use crate::domain::ports::ViewerRole;
use crate::domain::{Error, ErrorCode, EventStatus, ParticipantStatus, Role, Visibility};
use crate::inbound::http::beers::{AddBeerBody, BeerResponse};
use crate::inbound::http::caller::{
    EMAIL_HEADER, NICKNAME_HEADER, PERMISSIONS_HEADER, SCOPES_HEADER, SUBJECT_HEADER,
};
use crate::inbound::http::events::{
    ChangeStatusBody, CreateEventBody, EventDetailsResponse, EventSummaryResponse,
    ParticipantResponse,
};
use crate::inbound::http::favorites::FavoriteResponse;
use crate::inbound::http::membership::{JoinBody, JoinResponse};
use crate::inbound::http::reviews::{ReviewBody, ReviewResponse};
use crate::inbound::http::users::{UpdateMeRequest, UserResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the identity proxy header scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "IdentityProxy",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                SUBJECT_HEADER.to_owned(),
                format!(
                    "Subject forwarded by the identity proxy. Optional companions: \
                     {EMAIL_HEADER}, {NICKNAME_HEADER}, {SCOPES_HEADER}, {PERMISSIONS_HEADER}."
                ),
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tasting events API",
        description = "Group beer tastings: events, participants, beers, favourites and reviews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("IdentityProxy" = [])),
    paths(
        crate::inbound::http::users::get_me,
        crate::inbound::http::users::update_me,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::list_my_events,
        crate::inbound::http::events::list_open_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::events::change_event_status,
        crate::inbound::http::membership::join_event,
        crate::inbound::http::membership::remove_participant,
        crate::inbound::http::membership::restore_participant,
        crate::inbound::http::beers::list_beers,
        crate::inbound::http::beers::add_beer,
        crate::inbound::http::favorites::add_favorite,
        crate::inbound::http::favorites::remove_favorite,
        crate::inbound::http::favorites::list_event_favorites,
        crate::inbound::http::favorites::list_my_favorites,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_my_review,
        crate::inbound::http::reviews::update_my_review,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        EventStatus,
        Visibility,
        Role,
        ParticipantStatus,
        ViewerRole,
        UserResponse,
        UpdateMeRequest,
        CreateEventBody,
        ChangeStatusBody,
        EventSummaryResponse,
        EventDetailsResponse,
        ParticipantResponse,
        JoinBody,
        JoinResponse,
        AddBeerBody,
        BeerResponse,
        FavoriteResponse,
        ReviewBody,
        ReviewResponse,
    )),
    tags(
        (name = "users", description = "The calling user"),
        (name = "events", description = "Event lifecycle"),
        (name = "membership", description = "Joining and participant management"),
        (name = "beers", description = "Beers poured at an event"),
        (name = "favorites", description = "Favourite marks"),
        (name = "reviews", description = "Per-beer reviews"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("EventDetailsResponse", "joinCode")]
    #[case("EventDetailsResponse", "currentUserRole")]
    #[case("EventSummaryResponse", "isListed")]
    #[case("ReviewResponse", "totalScore")]
    #[case("FavoriteResponse", "favoritedUtc")]
    #[case("UserResponse", "isAdmin")]
    fn schemas_expose_camel_case_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/users/me")]
    #[case("/api/events")]
    #[case("/api/events/mine")]
    #[case("/api/events/open")]
    #[case("/api/events/{eventId}")]
    #[case("/api/events/{eventId}/status")]
    #[case("/api/events/{eventId}/join")]
    #[case("/api/events/{eventId}/participants/{userId}")]
    #[case("/api/events/{eventId}/participants/{userId}/restore")]
    #[case("/api/events/{eventId}/beers")]
    #[case("/api/events/{eventId}/beers/{beerId}/favorite")]
    #[case("/api/events/{eventId}/favorites/me")]
    #[case("/api/favorites/mine")]
    #[case("/api/events/{eventId}/beers/{beerId}/reviews")]
    #[case("/api/events/{eventId}/beers/{beerId}/reviews/me")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn identity_proxy_scheme_names_the_subject_header() {
        let doc = ApiDoc::openapi();
        let scheme = doc
            .components
            .as_ref()
            .and_then(|components| components.security_schemes.get("IdentityProxy"))
            .expect("identity scheme registered");
        let json = serde_json::to_value(scheme).expect("serialisable scheme");

        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("apiKey"));
        assert_eq!(json.get("in").and_then(|v| v.as_str()), Some("header"));
        assert_eq!(json.get("name").and_then(|v| v.as_str()), Some(SUBJECT_HEADER));
        let description = json
            .get("description")
            .and_then(|v| v.as_str())
            .expect("description");
        assert!(description.contains(SCOPES_HEADER));
    }
}
