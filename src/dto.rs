//! # PoOmad: request/response DTOs
//!
//! API contract types shared by the handlers. JSON uses camelCase field names,
//! matching what the web client sends and expects.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field rules are expressed via `validator` derive macros; rules that need
//!   "today" are separate helper methods

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::daily_log::{is_keyable, LogRecord, MIN_KEY_YEAR};
use crate::models::profile::UserProfile;

/// Analytics window used when the caller gives no start date.
pub const DEFAULT_ANALYTICS_DAYS: i64 = 90;

// ============================================================================
// Daily logs
// ============================================================================

/// POST /api/daily-logs
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRequest {
    pub date: NaiveDate,

    pub omad_compliant: bool,

    #[serde(default)]
    pub alcohol_consumed: bool,

    /// Pounds; omitted when the user did not weigh in.
    #[validate(range(min = 50.0, max = 500.0, message = "Weight must be between 50 and 500 lbs"))]
    pub weight: Option<f64>,
}

/// Query string for POST /api/daily-logs
#[derive(Debug, Default, Deserialize)]
pub struct LogDayQuery {
    /// Accept a weight jump above the day-over-day threshold.
    #[serde(default)]
    pub confirm: bool,
}

/// A stored day as returned to the client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogResponse {
    pub date: NaiveDate,
    pub omad_compliant: bool,
    pub alcohol_consumed: bool,
    pub weight: Option<f64>,
    /// Last write time, used by the client for last-write-wins sync.
    pub server_timestamp: DateTime<Utc>,
}

impl From<LogRecord> for DailyLogResponse {
    fn from(r: LogRecord) -> Self {
        Self {
            date: r.date,
            omad_compliant: r.omad_compliant,
            alcohol_consumed: r.alcohol_consumed,
            weight: r.weight,
            server_timestamp: r.recorded_at,
        }
    }
}

/// GET /api/daily-logs/streak
#[derive(Debug, Serialize, Deserialize)]
pub struct StreakResponse {
    pub streak: u32,
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/analytics/{trends,correlation} query params
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// Profile
// ============================================================================

/// POST /api/profile and PUT /api/profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    /// `5'10"` or `178cm`
    #[validate(custom = "validate_height")]
    pub height: String,

    #[validate(range(min = 50.0, max = 500.0, message = "Weight must be between 50 and 500 lbs"))]
    pub starting_weight: f64,

    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub google_id: String,
    pub email: String,
    pub height: String,
    pub starting_weight: f64,
    pub start_date: NaiveDate,
}

impl From<UserProfile> for ProfileResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            google_id: p.google_id,
            email: p.email,
            height: p.height,
            starting_weight: p.starting_weight,
            start_date: p.start_date,
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// GET /api/auth/google/callback query params
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/me
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub email: String,
    pub google_id: String,
    pub is_authenticated: bool,
    /// False sends the client to the setup wizard.
    pub has_profile: bool,
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Rejects dates that cannot be stored under a fixed-width key.
pub fn check_keyable(date: NaiveDate) -> Result<NaiveDate, String> {
    if is_keyable(date) {
        Ok(date)
    } else {
        Err("Dates must be between 0000-01-01 and 9999-12-31".into())
    }
}

impl DailyLogRequest {
    pub fn validate_date(&self, today: NaiveDate) -> Result<(), String> {
        check_keyable(self.date)?;
        if self.date > today {
            return Err("Cannot log future dates".into());
        }
        Ok(())
    }
}

impl ProfileRequest {
    pub fn validate_start_date(&self, today: NaiveDate) -> Result<NaiveDate, String> {
        let date = check_keyable(self.start_date.unwrap_or(today))?;
        if date > today {
            return Err("Start date cannot be in the future".into());
        }
        Ok(date)
    }
}

impl AnalyticsQuery {
    /// Resolve the requested window: end defaults to today, start to
    /// `DEFAULT_ANALYTICS_DAYS` before end, clamped to the first keyable day.
    /// An inverted window is returned as is.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
        let end = check_keyable(self.end_date.unwrap_or(today))?;
        let start = match self.start_date {
            Some(start) => check_keyable(start)?,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_ANALYTICS_DAYS))
                .filter(|d| is_keyable(*d))
                .or_else(|| NaiveDate::from_ymd_opt(MIN_KEY_YEAR, 1, 1))
                .unwrap_or(end),
        };
        Ok((start, end))
    }

    /// Like [`resolve`](Self::resolve), but `startDate` after `endDate` is an error.
    pub fn resolve_ordered(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
        let (start, end) = self.resolve(today)?;
        if start > end {
            return Err("startDate must not be after endDate".into());
        }
        Ok((start, end))
    }
}

fn imperial_height() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^(\d)'(\d{1,2})"$"#).expect("valid imperial height pattern"))
}

fn metric_height() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{3})cm$").expect("valid metric height pattern"))
}

/// Accepts 4'0"–7'0" or 122–213cm.
pub fn validate_height(height: &str) -> Result<(), ValidationError> {
    let in_range = if let Some(caps) = imperial_height().captures(height) {
        let feet: u32 = caps[1].parse().unwrap_or(0);
        let inches: u32 = caps[2].parse().unwrap_or(0);
        (48..=84).contains(&(feet * 12 + inches))
    } else if let Some(caps) = metric_height().captures(height) {
        let cm: u32 = caps[1].parse().unwrap_or(0);
        (122..=213).contains(&cm)
    } else {
        false
    };

    if in_range {
        Ok(())
    } else {
        let mut err = ValidationError::new("height");
        err.message = Some("Height must be in format 4'0\"-7'0\" or 122-213cm".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_height_formats() {
        assert!(validate_height("5'10\"").is_ok());
        assert!(validate_height("4'0\"").is_ok());
        assert!(validate_height("7'0\"").is_ok());
        assert!(validate_height("178cm").is_ok());

        assert!(validate_height("7'1\"").is_err());
        assert!(validate_height("3'11\"").is_err());
        assert!(validate_height("250cm").is_err());
        assert!(validate_height("5 ft 10").is_err());
        assert!(validate_height("").is_err());
    }

    #[test]
    fn test_weight_range_rule() {
        let mut req = DailyLogRequest {
            date: day(2024, 1, 1),
            omad_compliant: true,
            alcohol_consumed: false,
            weight: Some(49.9),
        };
        assert!(req.validate().is_err());
        req.weight = Some(500.0);
        assert!(req.validate().is_ok());
        req.weight = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_future_date_is_rejected() {
        let req = DailyLogRequest {
            date: day(2024, 1, 2),
            omad_compliant: true,
            alcohol_consumed: false,
            weight: None,
        };
        assert!(req.validate_date(day(2024, 1, 1)).is_err());
        assert!(req.validate_date(day(2024, 1, 2)).is_ok());
    }

    #[test]
    fn test_profile_request_rules() {
        let req = ProfileRequest {
            email: "not-an-email".into(),
            height: "5'10\"".into(),
            starting_weight: 200.0,
            start_date: None,
        };
        assert!(req.validate().is_err());
        assert_eq!(req.validate_start_date(day(2024, 6, 1)), Ok(day(2024, 6, 1)));
    }

    #[test]
    fn test_analytics_window_defaults_to_ninety_days() {
        let q = AnalyticsQuery::default();
        let (start, end) = q.resolve(day(2024, 4, 30)).unwrap();
        assert_eq!(end, day(2024, 4, 30));
        assert_eq!(start, day(2024, 1, 31));
    }

    #[test]
    fn test_inverted_window_only_fails_when_ordered() {
        let q = AnalyticsQuery {
            start_date: Some(day(2024, 5, 2)),
            end_date: Some(day(2024, 5, 1)),
        };
        assert!(q.resolve_ordered(day(2024, 6, 1)).is_err());
        assert_eq!(
            q.resolve(day(2024, 6, 1)),
            Ok((day(2024, 5, 2), day(2024, 5, 1)))
        );
    }

    #[test]
    fn test_analytics_window_rejects_unkeyable_years() {
        let far_future = AnalyticsQuery {
            start_date: Some(day(2024, 1, 1)),
            end_date: Some(day(10000, 1, 1)),
        };
        assert!(far_future.resolve(day(2024, 6, 1)).is_err());

        let oldest = AnalyticsQuery {
            start_date: None,
            end_date: NaiveDate::MIN.into(),
        };
        assert!(oldest.resolve(day(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_default_start_is_clamped_to_year_zero() {
        let q = AnalyticsQuery {
            start_date: None,
            end_date: Some(day(0, 2, 1)),
        };
        assert_eq!(q.resolve(day(2024, 6, 1)), Ok((day(0, 1, 1), day(0, 2, 1))));
    }

    #[test]
    fn test_negative_year_log_is_rejected() {
        let req = DailyLogRequest {
            date: day(-1, 3, 1),
            omad_compliant: true,
            alcohol_consumed: false,
            weight: None,
        };
        assert!(req.validate_date(day(2024, 1, 1)).is_err());
    }
}
