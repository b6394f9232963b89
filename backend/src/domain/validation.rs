//! Field-level validation shared by the domain constructors.
//!
//! Constructors that check several fields collect every failure before
//! rejecting, so clients receive a complete field-to-message map in one
//! response.

use std::collections::BTreeMap;

use serde_json::json;

use super::Error;

/// Accumulates validation failures keyed by wire field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// Start with no failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message for a field wins.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Record the error of `result`, returning its success value if any.
    pub fn capture<T, E>(&mut self, field: &'static str, result: Result<T, E>) -> Option<T>
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err.to_string());
                None
            }
        }
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Convert into the shared invalid-request error.
    #[must_use]
    pub fn into_error(self, message: &str) -> Error {
        Error::invalid_request(message).with_details(json!({
            "code": "validation_failed",
            "fields": self.fields,
        }))
    }

    /// `Ok(())` when empty, otherwise the invalid-request error.
    pub fn finish(self, message: &str) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error(message))
        }
    }
}

/// Trim `raw` and enforce `1..=max` characters.
pub(crate) fn required_text(raw: &str, max: usize) -> Result<String, TextError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TextError::Empty);
    }
    if trimmed.chars().count() > max {
        return Err(TextError::TooLong { max });
    }
    Ok(trimmed.to_owned())
}

/// Trim `raw`, mapping blank input to `None` and enforcing `max` characters.
pub(crate) fn optional_text(raw: Option<&str>, max: usize) -> Result<Option<String>, TextError> {
    let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(TextError::TooLong { max });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Failure modes for free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// Blank after trimming.
    #[error("must not be empty")]
    Empty,
    /// Longer than the column allows.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}
