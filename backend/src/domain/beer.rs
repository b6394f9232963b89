//! Beers poured at an event.

use chrono::{DateTime, Utc};

use super::validation::{FieldErrors, optional_text, required_text};
use super::{BeerId, Error, EventId};

/// Maximum beer name length in characters.
pub const BEER_NAME_MAX_CHARS: usize = 200;
/// Maximum brewery length in characters.
pub const BREWERY_MAX_CHARS: usize = 200;
/// Maximum style length in characters.
pub const STYLE_MAX_CHARS: usize = 100;
/// Highest accepted alcohol by volume, in percent.
pub const ABV_MAX: f64 = 100.0;

/// A beer entry; duplicates within an event are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Beer {
    /// Identifier.
    pub id: BeerId,
    /// Owning event.
    pub event_id: EventId,
    /// Name.
    pub name: String,
    /// Brewery, if known.
    pub brewery: Option<String>,
    /// Style, if known.
    pub style: Option<String>,
    /// Alcohol by volume in percent.
    pub abv: Option<f64>,
    /// When the beer was added.
    pub created_at: DateTime<Utc>,
}

/// Validated input for adding a beer.
#[derive(Debug, Clone, PartialEq)]
pub struct BeerDraft {
    name: String,
    brewery: Option<String>,
    style: Option<String>,
    abv: Option<f64>,
}

impl BeerDraft {
    /// Validate every field, reporting all failures together.
    pub fn new(
        name: &str,
        brewery: Option<&str>,
        style: Option<&str>,
        abv: Option<f64>,
    ) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let name = errors.capture("name", required_text(name, BEER_NAME_MAX_CHARS));
        let brewery = errors.capture("brewery", optional_text(brewery, BREWERY_MAX_CHARS));
        let style = errors.capture("style", optional_text(style, STYLE_MAX_CHARS));
        if abv.is_some_and(|value| !(0.0..=ABV_MAX).contains(&value)) {
            errors.push("abv", format!("must be between 0 and {ABV_MAX}"));
        }
        match (name, brewery, style) {
            (Some(name), Some(brewery), Some(style)) if errors.is_empty() => Ok(Self {
                name,
                brewery,
                style,
                abv,
            }),
            _ => Err(errors.into_error("beer is invalid")),
        }
    }

    /// Materialise the beer for `event_id`.
    #[must_use]
    pub fn into_beer(self, event_id: EventId, now: DateTime<Utc>) -> Beer {
        Beer {
            id: BeerId::random(),
            event_id,
            name: self.name,
            brewery: self.brewery,
            style: self.style,
            abv: self.abv,
            created_at: now,
        }
    }
}
