//! Log and profile persistence behind narrow async traits.
//!
//! Records are keyed by (user id, `YYYY-MM-DD` date key); range reads compare
//! the key as text. Every stored value carries a [`Version`] token and updates
//! are conditional on it.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::daily_log::{LogRecord, StoredLog, Version};
use crate::models::profile::{StoredProfile, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record already exists")]
    AlreadyExists,

    #[error("Record was modified by another request")]
    VersionMismatch,

    #[error("Record not found")]
    NotFound,

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait LogStore: Send + Sync {
    async fn get(&self, user_id: &str, date: NaiveDate) -> StoreResult<Option<StoredLog>>;

    /// Every log the user has, in no particular order.
    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<LogRecord>>;

    /// Logs with `start <= date <= end`, in no particular order.
    async fn list_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LogRecord>>;

    /// Fails with [`StoreError::AlreadyExists`] if the day is already logged.
    async fn insert(&self, record: &LogRecord) -> StoreResult<StoredLog>;

    /// Replaces the day's log if it is still at `expected`.
    async fn update(&self, record: &LogRecord, expected: Version) -> StoreResult<StoredLog>;

    /// Returns whether a log was removed.
    async fn delete(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool>;

    async fn ping(&self) -> bool;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<StoredProfile>>;

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<StoredProfile>;

    async fn update_profile(
        &self,
        profile: &UserProfile,
        expected: Version,
    ) -> StoreResult<StoredProfile>;
}
