//! Identity Resolver: lazily provisions and refreshes internal users.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::ledger_support::map_user_error;
use super::ports::{IdentityResolver, UserPersistenceError, UserRepository};
use super::{CurrentUser, Error, Nickname, User, VerifiedIdentity};

/// Identity service implementing [`IdentityResolver`].
pub struct IdentityService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> IdentityService<U> {
    /// Create a service over `users`.
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    async fn refresh(
        &self,
        existing: &User,
        identity: &VerifiedIdentity,
    ) -> Result<CurrentUser, Error> {
        let refreshed = existing.seen_again(identity, self.clock.utc());
        self.users
            .update(&refreshed)
            .await
            .map_err(map_user_error)?;
        Ok(CurrentUser {
            user: refreshed,
            is_admin: identity.is_admin(),
        })
    }

    async fn provision(&self, identity: &VerifiedIdentity) -> Result<CurrentUser, Error> {
        let user = User::first_sight(identity, self.clock.utc());
        match self.users.insert(&user).await {
            Ok(()) => Ok(CurrentUser {
                user,
                is_admin: identity.is_admin(),
            }),
            Err(UserPersistenceError::DuplicateKey { message }) => {
                debug!(%message, "concurrent first sight; re-reading user by subject");
                let winner = self
                    .users
                    .find_by_subject(identity.subject())
                    .await
                    .map_err(map_user_error)?
                    .ok_or_else(|| {
                        Error::internal("user vanished after a duplicate subject insert")
                    })?;
                self.refresh(&winner, identity).await
            }
            Err(other) => Err(map_user_error(other)),
        }
    }
}

#[async_trait]
impl<U> IdentityResolver for IdentityService<U>
where
    U: UserRepository,
{
    async fn resolve(&self, identity: &VerifiedIdentity) -> Result<CurrentUser, Error> {
        let existing = self
            .users
            .find_by_subject(identity.subject())
            .await
            .map_err(map_user_error)?;
        match existing {
            Some(user) => self.refresh(&user, identity).await,
            None => self.provision(identity).await,
        }
    }

    async fn update_nickname(
        &self,
        current: &CurrentUser,
        nickname: Nickname,
    ) -> Result<CurrentUser, Error> {
        let user = User {
            nickname: Some(nickname),
            last_seen_at: self.clock.utc(),
            ..current.user.clone()
        };
        self.users.update(&user).await.map_err(map_user_error)?;
        Ok(CurrentUser {
            user,
            is_admin: current.is_admin,
        })
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
