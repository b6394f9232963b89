//! Driving port for joining events and managing participants.

use async_trait::async_trait;

use crate::domain::{Caller, Error, EventId, UserId};

/// Result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Event joined.
    pub event_id: EventId,
    /// Joining user.
    pub user_id: UserId,
    /// `false` when the caller was already an active participant.
    pub joined: bool,
}

/// Membership use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipLedger: Send + Sync {
    /// Join with a code; idempotent for active participants.
    async fn join(
        &self,
        caller: &Caller,
        event_id: &EventId,
        code: &str,
    ) -> Result<JoinOutcome, Error>;

    /// Remove a participant; managers only, never the owner.
    async fn remove(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: &UserId,
    ) -> Result<(), Error>;

    /// Restore a removed participant; managers only, never the owner.
    async fn restore(
        &self,
        caller: &Caller,
        event_id: &EventId,
        target: &UserId,
    ) -> Result<(), Error>;
}
