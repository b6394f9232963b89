//! Backend for group beer tastings.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the aggregates,
//! services and ports, [`outbound`] the PostgreSQL and in-memory adapters,
//! and [`inbound`] the actix-web handlers that drive the services.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
