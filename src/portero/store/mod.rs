//! User persistence.
//!
//! Handlers talk to the [`UserStore`] trait only. [`postgres::PgUserStore`]
//! backs the running service; [`memory::MemoryUserStore`] backs tests and
//! local experiments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// A user about to be persisted. `password_hash` is a PHC string, never plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// A persisted user as read back for credential checks.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .finish()
    }
}

impl From<NewUser> for UserRecord {
    fn from(user: NewUser) -> Self {
        Self {
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's unique constraint on `email` rejected the row.
    #[error("email already registered")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored record is invalid: {0}")]
    InvalidRecord(String),
}

#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Persist a new user. Duplicate emails map to [`StoreError::Duplicate`].
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError>;

    /// Fetch the first user whose email matches exactly (case-sensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Check that the store answers.
    async fn ping(&self) -> Result<(), StoreError>;
}
