//! Users and the authenticated caller.
//!
//! A [`User`] is the internal record keyed by [`UserId`] and linked to exactly
//! one external subject. [`VerifiedIdentity`] is what the identity provider
//! vouches for; [`Caller`] is the reduced view the Access Guard consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use super::validation::{TextError, required_text};

/// Scope or permission value granting admin privilege.
pub const ADMIN_SCOPE: &str = "admin-scope";

/// Maximum nickname length in characters.
pub const NICKNAME_MAX_CHARS: usize = 100;

/// Validation errors for user-facing profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NicknameValidationError {
    /// Blank after trimming.
    #[error("nickname must not be empty")]
    Empty,
    /// Longer than [`NICKNAME_MAX_CHARS`].
    #[error("nickname must be at most {NICKNAME_MAX_CHARS} characters")]
    TooLong,
}

/// Trimmed display nickname of 1..=100 characters.
///
/// # Examples
/// ```
/// use tasting_backend::domain::Nickname;
///
/// let nickname = Nickname::new("  Hoppy  ").expect("valid nickname");
/// assert_eq!(nickname.as_ref(), "Hoppy");
/// assert!(Nickname::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Validate and construct a nickname.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NicknameValidationError> {
        required_text(raw.as_ref(), NICKNAME_MAX_CHARS)
            .map(Self)
            .map_err(|err| match err {
                TextError::Empty => NicknameValidationError::Empty,
                TextError::TooLong { .. } => NicknameValidationError::TooLong,
            })
    }

    /// Best-effort nickname from an identity claim: trimmed, truncated,
    /// `None` when blank.
    #[must_use]
    pub fn from_claim(raw: &str) -> Option<Self> {
        let truncated: String = raw.trim().chars().take(NICKNAME_MAX_CHARS).collect();
        Self::new(truncated).ok()
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = NicknameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Internal user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Internal identifier.
    pub id: UserId,
    /// External subject; unique and immutable.
    pub subject: String,
    /// Email as last claimed by the identity provider.
    pub email: Option<String>,
    /// Display nickname.
    pub nickname: Option<Nickname>,
    /// First sighting.
    pub created_at: DateTime<Utc>,
    /// Most recent authenticated request.
    pub last_seen_at: DateTime<Utc>,
}

impl User {
    /// Build the record created on first sight of `identity`.
    #[must_use]
    pub fn first_sight(identity: &VerifiedIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            subject: identity.subject().to_owned(),
            email: identity.email().map(str::to_owned),
            nickname: identity.nickname().and_then(Nickname::from_claim),
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Copy with last-seen and email refreshed from a later request.
    ///
    /// The nickname is left alone; it only changes through an explicit patch.
    #[must_use]
    pub fn seen_again(&self, identity: &VerifiedIdentity, now: DateTime<Utc>) -> Self {
        Self {
            email: identity.email().map(str::to_owned).or_else(|| self.email.clone()),
            last_seen_at: now,
            ..self.clone()
        }
    }
}

/// Errors raised when building a [`VerifiedIdentity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// No subject was supplied.
    #[error("authenticated identity is missing a subject")]
    MissingSubject,
}

/// Identity asserted by the external provider for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    subject: String,
    email: Option<String>,
    nickname: Option<String>,
    grants: Vec<String>,
}

impl VerifiedIdentity {
    /// Build an identity; the subject must be non-blank.
    pub fn new(
        subject: impl Into<String>,
        email: Option<String>,
        nickname: Option<String>,
        grants: Vec<String>,
    ) -> Result<Self, IdentityValidationError> {
        let subject = subject.into().trim().to_owned();
        if subject.is_empty() {
            return Err(IdentityValidationError::MissingSubject);
        }
        let non_blank = |value: Option<String>| {
            value
                .map(|raw| raw.trim().to_owned())
                .filter(|trimmed| !trimmed.is_empty())
        };
        Ok(Self {
            subject,
            email: non_blank(email),
            nickname: non_blank(nickname),
            grants,
        })
    }

    /// External subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Claimed email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Claimed nickname.
    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// True when any scope or permission equals [`ADMIN_SCOPE`] exactly.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.grants.iter().any(|grant| grant == ADMIN_SCOPE)
    }
}

/// The resolved caller: internal id plus admin flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Internal user id.
    pub user_id: UserId,
    /// Holds [`ADMIN_SCOPE`].
    pub is_admin: bool,
}

impl Caller {
    /// Construct a caller.
    #[must_use]
    pub const fn new(user_id: UserId, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }
}

/// Resolved user together with the caller view of the same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Stored user record.
    pub user: User,
    /// Holds [`ADMIN_SCOPE`].
    pub is_admin: bool,
}

impl CurrentUser {
    /// The caller view consumed by the Access Guard.
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller::new(self.user.id, self.is_admin)
    }
}
