use chrono::NaiveDate;
use serde::Serialize;

use crate::models::daily_log::LogRecord;

pub const MIN_TREND_RECORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("At least {} days of logged data are required to generate trends.", MIN_TREND_RECORDS)]
    InsufficientData,

    #[error("Weight is required on the first logged day to generate trends.")]
    MissingInitialWeight,
}

/// One day on the weight/alcohol chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub alcohol_consumed: bool,
    /// Weight was carried forward from an earlier day rather than logged.
    pub is_carry_forward: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub data_points: Vec<TrendPoint>,
    pub total_days_logged: usize,
    pub weight_change: Option<f64>,
}

/// Builds a continuous daily series over `[start, end]`, carrying the last
/// known weight across days that have no measurement.
pub fn generate_trends(
    records: &[LogRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TrendSeries, TrendError> {
    let mut in_range: Vec<&LogRecord> = records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    in_range.sort_by_key(|r| r.date);

    if in_range.len() < MIN_TREND_RECORDS {
        return Err(TrendError::InsufficientData);
    }
    if in_range[0].weight.is_none() {
        return Err(TrendError::MissingInitialWeight);
    }

    let mut data_points = Vec::new();
    let mut last_known: Option<f64> = None;
    let mut logs = in_range.iter().peekable();

    for date in start.iter_days().take_while(|d| *d <= end) {
        while logs.next_if(|r| r.date < date).is_some() {}
        let log = logs.next_if(|r| r.date == date);

        let point = match log {
            Some(r) => match r.weight {
                Some(w) => {
                    last_known = Some(w);
                    Some(TrendPoint {
                        date,
                        weight: Some(w),
                        alcohol_consumed: r.alcohol_consumed,
                        is_carry_forward: false,
                    })
                }
                None => Some(TrendPoint {
                    date,
                    weight: last_known,
                    alcohol_consumed: r.alcohol_consumed,
                    is_carry_forward: last_known.is_some(),
                }),
            },
            None => last_known.map(|w| TrendPoint {
                date,
                weight: Some(w),
                alcohol_consumed: false,
                is_carry_forward: true,
            }),
        };

        data_points.extend(point);
    }

    let first_weight = in_range.iter().find_map(|r| r.weight);
    let last_weight = in_range.iter().rev().find_map(|r| r.weight);
    let weight_change = match (first_weight, last_weight) {
        (Some(first), Some(last)) => Some(last - first),
        _ => None,
    };

    Ok(TrendSeries {
        data_points,
        total_days_logged: in_range.len(),
        weight_change,
    })
}
