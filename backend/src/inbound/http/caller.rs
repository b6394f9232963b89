//! Caller extraction from identity proxy headers.
//!
//! Authentication happens in front of this service. The proxy forwards the
//! verified subject and claims as headers; this extractor turns them into a
//! [`VerifiedIdentity`], runs the Identity Resolver and hands handlers the
//! internal user.
//!
//! ```text
//! X-Auth-Subject: auth0|123
//! X-Auth-Email: ada@example.com
//! X-Auth-Nickname: Ada
//! X-Auth-Scopes: openid admin-scope
//! X-Auth-Permissions: read:events,admin-scope
//! ```

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, CurrentUser, Error, IdentityValidationError, User, VerifiedIdentity};
use crate::inbound::http::state::HttpState;

/// Header carrying the external subject identifier.
pub const SUBJECT_HEADER: &str = "x-auth-subject";
/// Header carrying the claimed email.
pub const EMAIL_HEADER: &str = "x-auth-email";
/// Header carrying the claimed nickname.
pub const NICKNAME_HEADER: &str = "x-auth-nickname";
/// Header carrying space-delimited OAuth scopes.
pub const SCOPES_HEADER: &str = "x-auth-scopes";
/// Header carrying comma- or space-delimited permissions.
pub const PERMISSIONS_HEADER: &str = "x-auth-permissions";

/// The resolved caller of a request.
#[derive(Debug, Clone)]
pub struct Authenticated(CurrentUser);

impl Authenticated {
    /// Caller view for the domain services.
    #[must_use]
    pub fn caller(&self) -> Caller {
        self.0.caller()
    }

    /// Stored user record.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.0.user
    }

    /// Resolved user and admin flag.
    #[must_use]
    pub const fn current(&self) -> &CurrentUser {
        &self.0
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

fn grants(req: &HttpRequest) -> Vec<String> {
    let scopes = header(req, SCOPES_HEADER)
        .into_iter()
        .flat_map(str::split_whitespace);
    let permissions = header(req, PERMISSIONS_HEADER)
        .into_iter()
        .flat_map(|raw| raw.split(|c: char| c == ',' || c.is_whitespace()));
    scopes
        .chain(permissions)
        .filter(|grant| !grant.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read the identity headers of `req`.
///
/// Fails with `unauthorized` when the subject is missing or blank.
pub fn identity_from_headers(req: &HttpRequest) -> Result<VerifiedIdentity, Error> {
    let subject = header(req, SUBJECT_HEADER).unwrap_or_default();
    VerifiedIdentity::new(
        subject,
        header(req, EMAIL_HEADER).map(str::to_owned),
        header(req, NICKNAME_HEADER).map(str::to_owned),
        grants(req),
    )
    .map_err(|err| match err {
        IdentityValidationError::MissingSubject => Error::unauthorized("authentication required"),
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let identity = match state.as_ref() {
            None => Err(Error::internal("HTTP state is not registered")),
            Some(state) if !state.trust_identity_headers => {
                warn!("identity headers are not trusted; rejecting caller-bound request");
                Err(Error::service_unavailable("authentication is not configured"))
            }
            Some(_) => identity_from_headers(req),
        };
        Box::pin(async move {
            let identity = identity?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            state.identity.resolve(&identity).await.map(Self)
        })
    }
}
