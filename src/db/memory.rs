use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{LogStore, ProfileStore, StoreError, StoreResult};
use crate::models::daily_log::{date_key, LogRecord, StoredLog, Version};
use crate::models::profile::{StoredProfile, UserProfile};

/// In-process store used for local development and tests. Keys use the same
/// text encoding as the Postgres table so range reads behave identically.
#[derive(Default)]
pub struct MemoryStore {
    logs: RwLock<BTreeMap<(String, String), StoredLog>>,
    profiles: RwLock<HashMap<String, StoredProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(user_id: &str, date: NaiveDate) -> (String, String) {
    (user_id.to_string(), date_key(date))
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn get(&self, user_id: &str, date: NaiveDate) -> StoreResult<Option<StoredLog>> {
        Ok(self.logs.read().await.get(&key(user_id, date)).cloned())
    }

    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<LogRecord>> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, stored)| stored.record.clone())
            .collect())
    }

    async fn list_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LogRecord>> {
        let (lo, hi) = (key(user_id, start), key(user_id, end));
        if lo > hi {
            return Ok(Vec::new());
        }

        let logs = self.logs.read().await;
        Ok(logs
            .range(lo..=hi)
            .map(|(_, stored)| stored.record.clone())
            .collect())
    }

    async fn insert(&self, record: &LogRecord) -> StoreResult<StoredLog> {
        let mut logs = self.logs.write().await;
        let k = key(&record.user_id, record.date);
        if logs.contains_key(&k) {
            return Err(StoreError::AlreadyExists);
        }

        let stored = StoredLog {
            record: record.clone(),
            version: Version(1),
        };
        logs.insert(k, stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: &LogRecord, expected: Version) -> StoreResult<StoredLog> {
        let mut logs = self.logs.write().await;
        let existing = logs
            .get_mut(&key(&record.user_id, record.date))
            .ok_or(StoreError::NotFound)?;
        if existing.version != expected {
            return Err(StoreError::VersionMismatch);
        }

        existing.record = record.clone();
        existing.version = expected.next();
        Ok(existing.clone())
    }

    async fn delete(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool> {
        Ok(self.logs.write().await.remove(&key(user_id, date)).is_some())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<StoredProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<StoredProfile> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.google_id) {
            return Err(StoreError::AlreadyExists);
        }

        let stored = StoredProfile {
            profile: profile.clone(),
            version: Version(1),
        };
        profiles.insert(profile.google_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        profile: &UserProfile,
        expected: Version,
    ) -> StoreResult<StoredProfile> {
        let mut profiles = self.profiles.write().await;
        let existing = profiles
            .get_mut(&profile.google_id)
            .ok_or(StoreError::NotFound)?;
        if existing.version != expected {
            return Err(StoreError::VersionMismatch);
        }

        existing.profile = profile.clone();
        existing.version = expected.next();
        Ok(existing.clone())
    }
}
