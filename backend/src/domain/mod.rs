//! Domain primitives, aggregates and services.
//!
//! Purpose: define the tasting-event model (users, events, participants,
//! beers, favourites, reviews), the Access Guard, and the services that
//! implement the driving ports in [`ports`]. Nothing here depends on HTTP or
//! on a particular store.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - AccessGuard / Access: the single per-event authorisation predicate.
//! - The `*Service` types: use-case implementations wired by the server.

pub mod access;
pub mod beer;
mod beer_service;
pub mod error;
pub mod event;
mod event_service;
pub mod favorite;
mod favorite_service;
#[cfg(test)]
pub(crate) mod fixtures;
mod identity_service;
pub mod ids;
pub mod join_code;
mod ledger_support;
mod membership_service;
pub mod participant;
pub mod ports;
pub mod review;
mod review_service;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::access::{Access, AccessGuard};
pub use self::beer::{
    ABV_MAX, BEER_NAME_MAX_CHARS, BREWERY_MAX_CHARS, Beer, BeerDraft, STYLE_MAX_CHARS,
};
pub use self::beer_service::BeerService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event::{
    EVENT_NAME_MAX_CHARS, Event, EventListing, EventName, EventStatus, EventValidationError,
    StatusChangeError, StatusTransition, TargetStatus, UnknownLabel, Visibility,
};
pub use self::event_service::EventService;
pub use self::favorite::{Favorite, FavoriteSummary};
pub use self::favorite_service::FavoriteService;
pub use self::identity_service::IdentityService;
pub use self::ids::{BeerId, EventId, ReviewId, UserId};
#[cfg(test)]
pub use self::join_code::MockJoinCodeSource;
pub use self::join_code::{
    JOIN_CODE_ALPHABET, JOIN_CODE_LENGTH, JoinCode, JoinCodeIssuer, JoinCodeSource,
    JoinCodeValidationError, MAX_ISSUE_ATTEMPTS, RandomJoinCodeSource,
};
pub use self::membership_service::MembershipService;
pub use self::participant::{Participant, ParticipantStatus, ParticipantView, Role};
pub use self::review::{
    DETAIL_NOTES_MAX_CHARS, NOTES_MAX_CHARS, Review, ReviewDraft, ReviewInput, ReviewNotes,
    ReviewPatch, ReviewScores, SCORE_MAX, SCORE_MIN, Score, ScoreOutOfRange,
};
pub use self::review_service::ReviewService;
pub use self::trace_id::TraceId;
pub use self::user::{
    ADMIN_SCOPE, Caller, CurrentUser, IdentityValidationError, NICKNAME_MAX_CHARS, Nickname,
    NicknameValidationError, User, VerifiedIdentity,
};
pub use self::validation::FieldErrors;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use tasting_backend::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
