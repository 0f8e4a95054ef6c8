use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use super::{LogStore, ProfileStore, StoreError, StoreResult};
use crate::models::daily_log::{date_key, DailyLogRow, LogRecord, StoredLog, Version};
use crate::models::profile::{StoredProfile, UserProfile, UserProfileRow};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let db = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }
}

fn into_stored(row: DailyLogRow) -> StoreResult<StoredLog> {
    let key = format!("{}/{}", row.user_id, row.log_date);
    row.into_stored().ok_or(StoreError::Corrupt(key))
}

fn into_records(rows: Vec<DailyLogRow>) -> StoreResult<Vec<LogRecord>> {
    rows.into_iter()
        .map(|row| into_stored(row).map(|stored| stored.record))
        .collect()
}

#[async_trait]
impl LogStore for PgStore {
    async fn get(&self, user_id: &str, date: NaiveDate) -> StoreResult<Option<StoredLog>> {
        let row = sqlx::query_as::<_, DailyLogRow>(
            "SELECT * FROM daily_logs WHERE user_id = $1 AND log_date = $2",
        )
        .bind(user_id)
        .bind(date_key(date))
        .fetch_optional(&self.db)
        .await?;

        row.map(into_stored).transpose()
    }

    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<LogRecord>> {
        let rows = sqlx::query_as::<_, DailyLogRow>("SELECT * FROM daily_logs WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;

        into_records(rows)
    }

    async fn list_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LogRecord>> {
        let rows = sqlx::query_as::<_, DailyLogRow>(
            r#"
            SELECT * FROM daily_logs
            WHERE user_id = $1 AND log_date >= $2 AND log_date <= $3
            "#,
        )
        .bind(user_id)
        .bind(date_key(start))
        .bind(date_key(end))
        .fetch_all(&self.db)
        .await?;

        into_records(rows)
    }

    async fn insert(&self, record: &LogRecord) -> StoreResult<StoredLog> {
        let row = sqlx::query_as::<_, DailyLogRow>(
            r#"
            INSERT INTO daily_logs
                (user_id, log_date, omad_compliant, alcohol_consumed, weight, recorded_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            ON CONFLICT (user_id, log_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&record.user_id)
        .bind(date_key(record.date))
        .bind(record.omad_compliant)
        .bind(record.alcohol_consumed)
        .bind(record.weight)
        .bind(record.recorded_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::AlreadyExists)?;

        into_stored(row)
    }

    async fn update(&self, record: &LogRecord, expected: Version) -> StoreResult<StoredLog> {
        let row = sqlx::query_as::<_, DailyLogRow>(
            r#"
            UPDATE daily_logs SET
                omad_compliant = $3,
                alcohol_consumed = $4,
                weight = $5,
                recorded_at = $6,
                version = version + 1
            WHERE user_id = $1 AND log_date = $2 AND version = $7
            RETURNING *
            "#,
        )
        .bind(&record.user_id)
        .bind(date_key(record.date))
        .bind(record.omad_compliant)
        .bind(record.alcohol_consumed)
        .bind(record.weight)
        .bind(record.recorded_at)
        .bind(expected.0)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => into_stored(row),
            None => match self.get(&record.user_id, record.date).await? {
                Some(_) => Err(StoreError::VersionMismatch),
                None => Err(StoreError::NotFound),
            },
        }
    }

    async fn delete(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM daily_logs WHERE user_id = $1 AND log_date = $2")
            .bind(user_id)
            .bind(date_key(date))
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await
            .is_ok()
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<StoredProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            "SELECT * FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(StoredProfile::from))
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<StoredProfile> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            INSERT INTO user_profiles (user_id, email, height, starting_weight, start_date, version)
            VALUES ($1, $2, $3, $4, $5, 1)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.height)
        .bind(profile.starting_weight)
        .bind(profile.start_date)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::AlreadyExists)?;

        Ok(row.into())
    }

    async fn update_profile(
        &self,
        profile: &UserProfile,
        expected: Version,
    ) -> StoreResult<StoredProfile> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            UPDATE user_profiles SET
                email = $2,
                height = $3,
                starting_weight = $4,
                start_date = $5,
                version = version + 1
            WHERE user_id = $1 AND version = $6
            RETURNING *
            "#,
        )
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.height)
        .bind(profile.starting_weight)
        .bind(profile.start_date)
        .bind(expected.0)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => match self.get_profile(&profile.google_id).await? {
                Some(_) => Err(StoreError::VersionMismatch),
                None => Err(StoreError::NotFound),
            },
        }
    }
}
