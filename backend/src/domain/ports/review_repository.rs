//! Port abstraction for reviews with optimistic concurrency.
use async_trait::async_trait;

use crate::domain::{BeerId, EventId, Review, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// A review for the (event, beer, user) triple already exists.
        DuplicateKey { message: String } => "review already exists: {message}",
        /// The stored version differs from the expected one.
        VersionMismatch { expected: u32, actual: u32 } =>
            "review version mismatch: expected {expected}, found {actual}",
        /// The row vanished before the update.
        NotFound => "review not found",
    }
}

/// Storage for reviews, unique per (event, beer, user).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fetch the review for a triple.
    async fn find(
        &self,
        event_id: &EventId,
        beer_id: &BeerId,
        user_id: &UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Insert a review; an existing triple yields `DuplicateKey`.
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    /// Replace scores, notes, version and `updated_at` only while the stored
    /// version equals `expected_version`.
    async fn update(
        &self,
        review: &Review,
        expected_version: u32,
    ) -> Result<(), ReviewPersistenceError>;
}
