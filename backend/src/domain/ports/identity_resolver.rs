//! Driving port for mapping verified identities onto internal users.

use async_trait::async_trait;

use crate::domain::{CurrentUser, Error, Nickname, VerifiedIdentity};

/// Resolves the caller of every authenticated request.
///
/// Resolution is an upsert: the first request from a subject creates the user
/// and later requests refresh its last-seen time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Find or create the user behind `identity`.
    async fn resolve(&self, identity: &VerifiedIdentity) -> Result<CurrentUser, Error>;

    /// Replace the caller's nickname.
    async fn update_nickname(
        &self,
        current: &CurrentUser,
        nickname: Nickname,
    ) -> Result<CurrentUser, Error>;
}
