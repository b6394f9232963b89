//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::test::TestRequest;
use mockable::DefaultClock;

use crate::domain::RandomJoinCodeSource;
use crate::inbound::http::caller::{NICKNAME_HEADER, SCOPES_HEADER, SUBJECT_HEADER};
use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::memory::MemoryStore;

/// Handler state over a fresh in-memory store, trusting identity headers.
pub fn memory_state() -> HttpState {
    let ports = Repositories::shared(Arc::new(MemoryStore::new()))
        .into_ports(Arc::new(RandomJoinCodeSource::seeded(7)), Arc::new(DefaultClock));
    HttpState::new(ports).trusting_identity_headers(true)
}

/// Attach the proxy headers for `subject`.
pub fn with_identity(req: TestRequest, subject: &str) -> TestRequest {
    req.insert_header((SUBJECT_HEADER, subject.to_owned()))
        .insert_header((NICKNAME_HEADER, subject.to_owned()))
}

/// Attach the proxy headers for an admin `subject`.
pub fn with_admin_identity(req: TestRequest, subject: &str) -> TestRequest {
    with_identity(req, subject).insert_header((SCOPES_HEADER, "openid admin-scope"))
}
