//! `/health/ready` and `/health/live` for load balancers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

/// Readiness flag flipped by the server once its listener is bound.
#[derive(Debug, Default)]
pub struct HealthState {
    serving: AtomicBool,
}

impl HealthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.serving.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.serving.load(Ordering::Acquire)
    }
}

/// What a health endpoint reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Ready,
    Live,
}

impl Check {
    fn passes(self, state: &HealthState) -> bool {
        match self {
            Self::Ready => state.is_ready(),
            // Answering at all is the liveness signal.
            Self::Live => true,
        }
    }

    fn respond(self, state: &HealthState) -> HttpResponse {
        let mut builder = if self.passes(state) {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        builder
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// 200 once the server accepts tasting traffic, 503 while it is starting.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting requests"),
        (status = 503, description = "Still starting")
    ),
    operation_id = "ready"
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    Check::Ready.respond(&state)
}

#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Process is running")),
    operation_id = "live"
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    Check::Live.respond(&state)
}
