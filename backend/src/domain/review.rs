//! Beer reviews: four bounded scores, optional notes, and a version token.
//!
//! Drafts and patches are validated as a whole so that a client receives every
//! failing field at once. A patch that leaves every field as it was produces no
//! new review value, so callers can skip the write entirely.

use chrono::{DateTime, Utc};

use super::validation::{FieldErrors, optional_text};
use super::{BeerId, Error, EventId, ReviewId, UserId};

/// Lowest accepted score.
pub const SCORE_MIN: i64 = 1;
/// Highest accepted score.
pub const SCORE_MAX: i64 = 6;
/// Maximum general notes length in characters.
pub const NOTES_MAX_CHARS: usize = 2000;
/// Maximum length of the aroma, appearance and flavour notes.
pub const DETAIL_NOTES_MAX_CHARS: usize = 1000;

/// A score outside `SCORE_MIN..=SCORE_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("must be between {SCORE_MIN} and {SCORE_MAX}")]
pub struct ScoreOutOfRange;

/// A single review score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    /// Validate a raw score.
    pub fn new(raw: i64) -> Result<Self, ScoreOutOfRange> {
        if (SCORE_MIN..=SCORE_MAX).contains(&raw) {
            u8::try_from(raw).map(Self).map_err(|_| ScoreOutOfRange)
        } else {
            Err(ScoreOutOfRange)
        }
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// The four scored dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewScores {
    /// Colour.
    pub color: Score,
    /// Smell.
    pub smell: Score,
    /// Taste.
    pub taste: Score,
    /// Overall.
    pub total: Score,
}

/// Free-text notes, each trimmed with blanks stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewNotes {
    /// General notes.
    pub notes: Option<String>,
    /// Aroma notes.
    pub aroma: Option<String>,
    /// Appearance notes.
    pub appearance: Option<String>,
    /// Flavour notes.
    pub flavor: Option<String>,
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Identifier.
    pub id: ReviewId,
    /// Event.
    pub event_id: EventId,
    /// Reviewed beer.
    pub beer_id: BeerId,
    /// Author.
    pub user_id: UserId,
    /// Scores.
    pub scores: ReviewScores,
    /// Notes.
    pub notes: ReviewNotes,
    /// Optimistic concurrency token; starts at 1.
    pub version: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change time.
    pub updated_at: DateTime<Utc>,
}

/// Raw review fields as supplied by a client.
///
/// `rating` is a shorthand that fills any score left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewInput {
    /// Colour score.
    pub color_score: Option<i64>,
    /// Smell score.
    pub smell_score: Option<i64>,
    /// Taste score.
    pub taste_score: Option<i64>,
    /// Overall score.
    pub total_score: Option<i64>,
    /// Fallback for omitted scores.
    pub rating: Option<i64>,
    /// General notes.
    pub notes: Option<String>,
    /// Aroma notes.
    pub aroma_notes: Option<String>,
    /// Appearance notes.
    pub appearance_notes: Option<String>,
    /// Flavour notes.
    pub flavor_notes: Option<String>,
}

const SCORE_FIELDS: [&str; 4] = ["colorScore", "smellScore", "tasteScore", "totalScore"];

impl ReviewInput {
    fn raw_scores(&self) -> [Option<i64>; 4] {
        [
            self.color_score,
            self.smell_score,
            self.taste_score,
            self.total_score,
        ]
        .map(|score| score.or(self.rating))
    }

    fn raw_notes(&self) -> [(&'static str, Option<&str>, usize); 4] {
        [
            ("notes", self.notes.as_deref(), NOTES_MAX_CHARS),
            ("aromaNotes", self.aroma_notes.as_deref(), DETAIL_NOTES_MAX_CHARS),
            (
                "appearanceNotes",
                self.appearance_notes.as_deref(),
                DETAIL_NOTES_MAX_CHARS,
            ),
            ("flavorNotes", self.flavor_notes.as_deref(), DETAIL_NOTES_MAX_CHARS),
        ]
    }
}

/// Field names for score failures; `rating` when the shorthand supplied it.
fn score_fields(input: &ReviewInput) -> [&'static str; 4] {
    let explicit = [
        input.color_score,
        input.smell_score,
        input.taste_score,
        input.total_score,
    ];
    let mut fields = SCORE_FIELDS;
    for (field, value) in fields.iter_mut().zip(explicit) {
        if value.is_none() && input.rating.is_some() {
            *field = "rating";
        }
    }
    fields
}

/// Validated input for a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    scores: ReviewScores,
    notes: ReviewNotes,
}

impl ReviewDraft {
    /// Validate a create request; every score must resolve.
    pub fn new(input: &ReviewInput) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let mut scores = [None; 4];
        for ((slot, raw), field) in scores
            .iter_mut()
            .zip(input.raw_scores())
            .zip(score_fields(input))
        {
            *slot = match raw {
                Some(value) => errors.capture(field, Score::new(value)),
                None => {
                    errors.push(field, "is required");
                    None
                }
            };
        }
        let mut notes = [None, None, None, None];
        for (slot, (field, raw, max)) in notes.iter_mut().zip(input.raw_notes()) {
            *slot = errors.capture(field, optional_text(raw, max)).flatten();
        }

        errors.finish("review is invalid")?;
        let [Some(color), Some(smell), Some(taste), Some(total)] = scores else {
            return Err(Error::invalid_request("review is invalid"));
        };
        let [notes, aroma, appearance, flavor] = notes;
        Ok(Self {
            scores: ReviewScores {
                color,
                smell,
                taste,
                total,
            },
            notes: ReviewNotes {
                notes,
                aroma,
                appearance,
                flavor,
            },
        })
    }

    /// Materialise at version 1.
    #[must_use]
    pub fn into_review(
        self,
        event_id: EventId,
        beer_id: BeerId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Review {
        Review {
            id: ReviewId::random(),
            event_id,
            beer_id,
            user_id,
            scores: self.scores,
            notes: self.notes,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update.
///
/// For text fields the outer `Option` says whether the field was supplied and
/// the inner one carries the new value; a blank string clears the note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    color: Option<Score>,
    smell: Option<Score>,
    taste: Option<Score>,
    total: Option<Score>,
    notes: Option<Option<String>>,
    aroma: Option<Option<String>>,
    appearance: Option<Option<String>>,
    flavor: Option<Option<String>>,
}

impl ReviewPatch {
    /// Validate the supplied fields.
    pub fn new(input: &ReviewInput) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let mut scores = [None; 4];
        for ((slot, raw), field) in scores
            .iter_mut()
            .zip(input.raw_scores())
            .zip(score_fields(input))
        {
            if let Some(value) = raw {
                *slot = errors.capture(field, Score::new(value));
            }
        }
        let mut notes = [None, None, None, None];
        for (slot, (field, raw, max)) in notes.iter_mut().zip(input.raw_notes()) {
            if raw.is_some() {
                *slot = errors.capture(field, optional_text(raw, max));
            }
        }

        errors.finish("review update is invalid")?;
        let [color, smell, taste, total] = scores;
        let [notes, aroma, appearance, flavor] = notes;
        Ok(Self {
            color,
            smell,
            taste,
            total,
            notes,
            aroma,
            appearance,
            flavor,
        })
    }
}

impl Review {
    /// Apply `patch`, returning `None` when nothing would change.
    ///
    /// A changed review carries the next version and `updated_at = now`.
    #[must_use]
    pub fn apply(&self, patch: &ReviewPatch, now: DateTime<Utc>) -> Option<Self> {
        let scores = ReviewScores {
            color: patch.color.unwrap_or(self.scores.color),
            smell: patch.smell.unwrap_or(self.scores.smell),
            taste: patch.taste.unwrap_or(self.scores.taste),
            total: patch.total.unwrap_or(self.scores.total),
        };
        let pick = |update: &Option<Option<String>>, current: &Option<String>| {
            update.clone().unwrap_or_else(|| current.clone())
        };
        let notes = ReviewNotes {
            notes: pick(&patch.notes, &self.notes.notes),
            aroma: pick(&patch.aroma, &self.notes.aroma),
            appearance: pick(&patch.appearance, &self.notes.appearance),
            flavor: pick(&patch.flavor, &self.notes.flavor),
        };
        if scores == self.scores && notes == self.notes {
            return None;
        }
        Some(Self {
            scores,
            notes,
            version: self.version.saturating_add(1),
            updated_at: now,
            ..self.clone()
        })
    }
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
