//! In-memory application harness for HTTP integration suites.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::dev::{Service, ServiceResponse};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;
use tasting_backend::Trace;
use tasting_backend::domain::{JoinCode, JoinCodeSource, RandomJoinCodeSource};
use tasting_backend::inbound::http::api_scope;
use tasting_backend::inbound::http::caller::{NICKNAME_HEADER, SCOPES_HEADER, SUBJECT_HEADER};
use tasting_backend::inbound::http::state::{HttpState, Repositories};
use tasting_backend::outbound::memory::MemoryStore;

/// Hands out the queued codes first, then seeded random ones.
pub struct ScriptedJoinCodes {
    queued: Mutex<VecDeque<JoinCode>>,
    fallback: RandomJoinCodeSource,
}

impl ScriptedJoinCodes {
    pub fn new(codes: &[&str]) -> Self {
        let queued = codes
            .iter()
            .map(|code| JoinCode::new(code).expect("scripted join code"))
            .collect();
        Self {
            queued: Mutex::new(queued),
            fallback: RandomJoinCodeSource::seeded(42),
        }
    }
}

impl JoinCodeSource for ScriptedJoinCodes {
    fn next_code(&self) -> JoinCode {
        let next = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| self.fallback.next_code())
    }
}

/// Shared state over a fresh in-memory store.
pub fn memory_state(codes: &[&str]) -> web::Data<HttpState> {
    let ports = Repositories::shared(Arc::new(MemoryStore::new()))
        .into_ports(Arc::new(ScriptedJoinCodes::new(codes)), Arc::new(DefaultClock));
    web::Data::new(HttpState::new(ports).trusting_identity_headers(true))
}

/// The production route table over `state`.
pub async fn app(
    state: web::Data<HttpState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(App::new().app_data(state).wrap(Trace).service(api_scope())).await
}

/// Attach the identity proxy headers for `subject`.
pub fn as_user(req: TestRequest, subject: &str) -> TestRequest {
    req.insert_header((SUBJECT_HEADER, subject.to_owned()))
        .insert_header((NICKNAME_HEADER, subject.to_owned()))
}

/// Attach the identity proxy headers for an admin `subject`.
pub fn as_admin(req: TestRequest, subject: &str) -> TestRequest {
    as_user(req, subject).insert_header((SCOPES_HEADER, "openid admin-scope"))
}

/// Status and JSON body of a response; an empty body reads as `Null`.
pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: TestRequest,
) -> (u16, Value) {
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Read a string field from a JSON body.
pub fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string field {name} in {body}"))
}
