use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Canonical storage key format for a log date. Zero-padded and fixed-width,
/// so lexicographic order on the key matches calendar order.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Years whose key stays four digits wide. Outside them `%Y` adds a sign or a
/// fifth digit and the text order no longer follows the calendar.
pub const MIN_KEY_YEAR: i32 = 0;
pub const MAX_KEY_YEAR: i32 = 9999;

pub fn is_keyable(date: NaiveDate) -> bool {
    (MIN_KEY_YEAR..=MAX_KEY_YEAR).contains(&date.year())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// One entry per (user, calendar day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub omad_compliant: bool,
    pub alcohol_consumed: bool,
    pub weight: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Opaque optimistic-concurrency token handed out by the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version(pub i64);

impl Version {
    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredLog {
    pub record: LogRecord,
    pub version: Version,
}

/// Row shape of the `daily_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct DailyLogRow {
    pub user_id: String,
    pub log_date: String,
    pub omad_compliant: bool,
    pub alcohol_consumed: bool,
    pub weight: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub version: i64,
}

impl DailyLogRow {
    pub fn into_stored(self) -> Option<StoredLog> {
        let date = parse_date_key(&self.log_date)?;
        Some(StoredLog {
            record: LogRecord {
                user_id: self.user_id,
                date,
                omad_compliant: self.omad_compliant,
                alcohol_consumed: self.alcohol_consumed,
                weight: self.weight,
                recorded_at: self.recorded_at,
            },
            version: Version(self.version),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_is_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_key(d), "2024-03-07");
        assert_eq!(parse_date_key("2024-03-07"), Some(d));
    }

    #[test]
    fn test_date_keys_sort_in_calendar_order() {
        let a = date_key(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
        let b = date_key(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert!(a < b);
    }

    #[test]
    fn test_row_with_bad_key_is_rejected() {
        let row = DailyLogRow {
            user_id: "u".into(),
            log_date: "not-a-date".into(),
            omad_compliant: true,
            alcohol_consumed: false,
            weight: None,
            recorded_at: Utc::now(),
            version: 1,
        };
        assert!(row.into_stored().is_none());
    }
}
