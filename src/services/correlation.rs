use chrono::NaiveDate;
use serde::Serialize;

use crate::models::daily_log::LogRecord;

/// Alcohol vs. weight statistics over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    /// Pearson coefficient in [-1, 1]; `None` with fewer than two weigh-ins.
    pub correlation: Option<f64>,
    pub days_with_alcohol: usize,
    pub total_days: usize,
    pub average_weight_with_alcohol: Option<f64>,
    pub average_weight_without_alcohol: Option<f64>,
}

pub fn compute_correlation(
    records: &[LogRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> CorrelationResult {
    let weighed: Vec<(bool, f64)> = records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .filter_map(|r| r.weight.map(|w| (r.alcohol_consumed, w)))
        .collect();

    if weighed.len() < 2 {
        // daysWithAlcohol stays 0 here even when the lone weigh-in was an
        // alcohol day; clients rely on the degenerate shape.
        return CorrelationResult {
            correlation: None,
            days_with_alcohol: 0,
            total_days: weighed.len(),
            average_weight_with_alcohol: None,
            average_weight_without_alcohol: None,
        };
    }

    let with_alcohol: Vec<f64> = weighed.iter().filter(|(a, _)| *a).map(|(_, w)| *w).collect();
    let without_alcohol: Vec<f64> = weighed.iter().filter(|(a, _)| !*a).map(|(_, w)| *w).collect();

    let indicator: Vec<f64> = weighed
        .iter()
        .map(|(a, _)| if *a { 1.0 } else { 0.0 })
        .collect();
    let weights: Vec<f64> = weighed.iter().map(|(_, w)| *w).collect();

    CorrelationResult {
        correlation: Some(pearson(&indicator, &weights)),
        days_with_alcohol: with_alcohol.len(),
        total_days: weighed.len(),
        average_weight_with_alcohol: mean(&with_alcohol),
        average_weight_without_alcohol: mean(&without_alcohol),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pearson correlation of two equal-length series. Zero variance in either
/// series yields 0.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (Some(mean_x), Some(mean_y)) = (mean(xs), mean(ys)) else {
        return 0.0;
    };

    let mut cross = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cross += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        (cross / denominator).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn log(d: u32, weight: Option<f64>, alcohol: bool) -> LogRecord {
        LogRecord {
            user_id: "user-1".into(),
            date: day(d),
            omad_compliant: true,
            alcohol_consumed: alcohol,
            weight,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_weigh_in_is_degenerate() {
        let logs = vec![log(1, Some(175.0), true), log(2, None, true)];
        let result = compute_correlation(&logs, day(1), day(10));
        assert_eq!(result.correlation, None);
        assert_eq!(result.total_days, 1);
        assert_eq!(result.days_with_alcohol, 0);
        assert_eq!(result.average_weight_with_alcohol, None);
        assert_eq!(result.average_weight_without_alcohol, None);
    }

    #[test]
    fn test_two_points_are_perfectly_correlated() {
        let logs = vec![log(1, Some(170.0), false), log(2, Some(180.0), true)];
        let result = compute_correlation(&logs, day(1), day(2));
        assert_eq!(result.days_with_alcohol, 1);
        assert_eq!(result.total_days, 2);
        assert_eq!(result.average_weight_with_alcohol, Some(180.0));
        assert_eq!(result.average_weight_without_alcohol, Some(170.0));
        let r = result.correlation.unwrap();
        assert!((r.abs() - 1.0).abs() < 1e-12);
        assert!(r > 0.0);
    }

    #[test]
    fn test_identical_weights_yield_zero() {
        let logs = vec![
            log(1, Some(170.0), false),
            log(2, Some(170.0), true),
            log(3, Some(170.0), true),
        ];
        let result = compute_correlation(&logs, day(1), day(3));
        assert_eq!(result.correlation, Some(0.0));
    }

    #[test]
    fn test_no_alcohol_days_yields_zero_and_empty_partition() {
        let logs = vec![log(1, Some(170.0), false), log(2, Some(172.0), false)];
        let result = compute_correlation(&logs, day(1), day(2));
        assert_eq!(result.correlation, Some(0.0));
        assert_eq!(result.days_with_alcohol, 0);
        assert_eq!(result.average_weight_with_alcohol, None);
        assert_eq!(result.average_weight_without_alcohol, Some(171.0));
    }

    #[test]
    fn test_ignores_records_outside_range_and_without_weight() {
        let logs = vec![
            log(1, Some(200.0), true),
            log(5, Some(170.0), false),
            log(6, None, true),
            log(7, Some(172.0), true),
            log(20, Some(150.0), false),
        ];
        let result = compute_correlation(&logs, day(5), day(7));
        assert_eq!(result.total_days, 2);
        assert_eq!(result.days_with_alcohol, 1);
    }

    #[test]
    fn test_negative_association() {
        let logs = vec![
            log(1, Some(180.0), false),
            log(2, Some(179.0), false),
            log(3, Some(170.0), true),
            log(4, Some(171.0), true),
        ];
        let r = compute_correlation(&logs, day(1), day(4)).correlation.unwrap();
        assert!(r < -0.9 && r >= -1.0);
    }
}
