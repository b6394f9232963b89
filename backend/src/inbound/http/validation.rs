//! Path parameter parsing shared by the HTTP handlers.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{BeerId, Error, EventId, UserId};

/// Name of a path or body field as clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EVENT_ID: FieldName = FieldName::new("eventId");
pub(crate) const BEER_ID: FieldName = FieldName::new("beerId");
pub(crate) const USER_ID: FieldName = FieldName::new("userId");

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_uuid",
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_event_id(value: &str) -> Result<EventId, Error> {
    parse_uuid(value, EVENT_ID).map(EventId::from_uuid)
}

pub(crate) fn parse_beer_id(value: &str) -> Result<BeerId, Error> {
    parse_uuid(value, BEER_ID).map(BeerId::from_uuid)
}

pub(crate) fn parse_user_id(value: &str) -> Result<UserId, Error> {
    parse_uuid(value, USER_ID).map(UserId::from_uuid)
}
