//! Join codes and the issuer that mints unique ones.
//!
//! Codes use an alphabet without the easily confused `0`, `O`, `1` and `I`.
//! Comparison against a supplied code ignores case and surrounding space.

use std::sync::{Arc, Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::error;

use super::Error;
use super::ledger_support::map_event_error;
use super::ports::EventRepository;

/// Characters a generated code may contain.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated codes.
pub const JOIN_CODE_LENGTH: usize = 8;

/// Longest code the store accepts.
pub const JOIN_CODE_MAX_CHARS: usize = 32;

/// Uniqueness probes before giving up.
pub const MAX_ISSUE_ATTEMPTS: usize = 10;

/// A stored code was blank or too long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinCodeValidationError {
    /// Blank after trimming.
    #[error("join code must not be empty")]
    Empty,
    /// Longer than [`JOIN_CODE_MAX_CHARS`].
    #[error("join code must be at most {JOIN_CODE_MAX_CHARS} characters")]
    TooLong,
}

/// Upper-case join code attached to an event.
///
/// # Examples
/// ```
/// use tasting_backend::domain::JoinCode;
///
/// let code = JoinCode::new("abcd2345").expect("valid code");
/// assert_eq!(code.as_ref(), "ABCD2345");
/// assert!(code.matches("  abcd2345 "));
/// assert!(!code.matches("ABCD2346"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinCode(String);

impl JoinCode {
    /// Normalise and validate a code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, JoinCodeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(JoinCodeValidationError::Empty);
        }
        if trimmed.chars().count() > JOIN_CODE_MAX_CHARS {
            return Err(JoinCodeValidationError::TooLong);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Case-insensitive comparison against a caller-supplied code.
    #[must_use]
    pub fn matches(&self, supplied: &str) -> bool {
        supplied.trim().eq_ignore_ascii_case(&self.0)
    }
}

impl AsRef<str> for JoinCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Source of candidate codes.
#[cfg_attr(test, mockall::automock)]
pub trait JoinCodeSource: Send + Sync {
    /// Produce the next candidate.
    fn next_code(&self) -> JoinCode;
}

/// Uniform random draws from [`JOIN_CODE_ALPHABET`].
#[derive(Debug)]
pub struct RandomJoinCodeSource {
    rng: Mutex<SmallRng>,
}

impl RandomJoinCodeSource {
    /// Seed from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Deterministic source for reproducible tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomJoinCodeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinCodeSource for RandomJoinCodeSource {
    fn next_code(&self) -> JoinCode {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let code: String = (0..JOIN_CODE_LENGTH)
            .filter_map(|_| {
                let index = rng.gen_range(0..JOIN_CODE_ALPHABET.len());
                JOIN_CODE_ALPHABET.get(index).copied().map(char::from)
            })
            .collect();
        JoinCode(code)
    }
}

/// Mints codes that no stored event currently uses.
pub struct JoinCodeIssuer<E> {
    events: Arc<E>,
    source: Arc<dyn JoinCodeSource>,
}

impl<E> Clone for JoinCodeIssuer<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            source: Arc::clone(&self.source),
        }
    }
}

impl<E> JoinCodeIssuer<E>
where
    E: EventRepository,
{
    /// Build an issuer probing `events` for collisions.
    pub fn new(events: Arc<E>, source: Arc<dyn JoinCodeSource>) -> Self {
        Self { events, source }
    }

    /// Draw codes until one is unused, up to [`MAX_ISSUE_ATTEMPTS`] times.
    ///
    /// The probe is advisory: the unique index on the events table is the
    /// final arbiter when two creations race for the same code.
    pub async fn issue(&self) -> Result<JoinCode, Error> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let candidate = self.source.next_code();
            let taken = self
                .events
                .join_code_exists(&candidate)
                .await
                .map_err(map_event_error)?;
            if !taken {
                return Ok(candidate);
            }
        }
        error!(
            attempts = MAX_ISSUE_ATTEMPTS,
            "join code space exhausted while creating an event"
        );
        Err(Error::internal("could not allocate a unique join code"))
    }
}
