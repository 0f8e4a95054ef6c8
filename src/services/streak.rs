use crate::models::daily_log::LogRecord;

/// Current OMAD streak: consecutive compliant logs counted back from the most
/// recent one. Unlogged days are skipped; only a day explicitly logged as
/// non-compliant ends the streak.
pub fn compute_streak(records: &[LogRecord]) -> u32 {
    let mut by_date: Vec<&LogRecord> = records.iter().collect();
    by_date.sort_by(|a, b| b.date.cmp(&a.date));

    debug_assert!(
        by_date.windows(2).all(|w| w[0].date != w[1].date),
        "duplicate log dates for a single user"
    );

    by_date
        .iter()
        .take_while(|log| log.omad_compliant)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn log(day: u32, compliant: bool) -> LogRecord {
        LogRecord {
            user_id: "user-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            omad_compliant: compliant,
            alcohol_consumed: false,
            weight: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_has_no_streak() {
        assert_eq!(compute_streak(&[]), 0);
    }

    #[test]
    fn test_latest_miss_resets_streak() {
        let logs = vec![log(1, true), log(2, true), log(3, true), log(4, false)];
        assert_eq!(compute_streak(&logs), 0);
    }

    #[test]
    fn test_all_compliant_counts_every_log() {
        let logs = vec![log(3, true), log(1, true), log(2, true)];
        assert_eq!(compute_streak(&logs), 3);
    }

    #[test]
    fn test_counts_back_to_last_miss() {
        let logs = vec![log(1, true), log(2, false), log(3, true), log(4, true)];
        assert_eq!(compute_streak(&logs), 2);
    }

    #[test]
    fn test_unlogged_days_do_not_break_streak() {
        let gappy = vec![log(1, false), log(3, true), log(7, true), log(9, true)];
        let contiguous = vec![log(6, false), log(7, true), log(8, true), log(9, true)];
        assert_eq!(compute_streak(&gappy), 3);
        assert_eq!(compute_streak(&gappy), compute_streak(&contiguous));
    }

    #[test]
    fn test_unsorted_input_is_handled() {
        let logs = vec![log(4, true), log(1, false), log(3, true), log(2, true)];
        assert_eq!(compute_streak(&logs), 3);
    }
}
