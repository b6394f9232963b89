//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another row already claims the subject.
        DuplicateKey { message: String } => "user already exists: {message}",
    }
}

/// Storage for internal user records keyed by id and external subject.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the user linked to an external subject.
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user; a taken subject yields `DuplicateKey`.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Persist email, nickname and last-seen changes for an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;
}
