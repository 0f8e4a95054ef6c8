use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::daily_log::Version;

/// Per-user settings captured by the setup wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub google_id: String,
    pub email: String,
    pub height: String,
    pub starting_weight: f64,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProfile {
    pub profile: UserProfile,
    pub version: Version,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub email: String,
    pub height: String,
    pub starting_weight: f64,
    pub start_date: NaiveDate,
    pub version: i64,
}

impl From<UserProfileRow> for StoredProfile {
    fn from(row: UserProfileRow) -> Self {
        Self {
            profile: UserProfile {
                google_id: row.user_id,
                email: row.email,
                height: row.height,
                starting_weight: row.starting_weight,
                start_date: row.start_date,
            },
            version: Version(row.version),
        }
    }
}
