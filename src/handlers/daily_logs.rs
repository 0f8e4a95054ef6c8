use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, VARY},
        StatusCode,
    },
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{check_keyable, DailyLogRequest, DailyLogResponse, LogDayQuery, StreakResponse};
use crate::error::{AppError, AppResult};
use crate::models::daily_log::{is_keyable, LogRecord};
use crate::services::{streak::compute_streak, weight_guard::check_weight_change};
use crate::AppState;

pub async fn log_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<LogDayQuery>,
    Json(body): Json<DailyLogRequest>,
) -> AppResult<Json<DailyLogResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    body.validate_date(Utc::now().date_naive())
        .map_err(AppError::Validation)?;

    // Compare against the previous calendar day's weigh-in unless the user confirmed.
    if let (Some(weight), false) = (body.weight, query.confirm) {
        let previous = match body.date.pred_opt() {
            Some(day) => state
                .logs
                .get(&auth_user.id, day)
                .await?
                .and_then(|stored| stored.record.weight),
            None => None,
        };
        check_weight_change(previous, weight).map_err(AppError::ConfirmationRequired)?;
    }

    let record = LogRecord {
        user_id: auth_user.id.clone(),
        date: body.date,
        omad_compliant: body.omad_compliant,
        alcohol_consumed: body.alcohol_consumed,
        weight: body.weight,
        recorded_at: Utc::now(),
    };

    let stored = match state.logs.get(&auth_user.id, body.date).await? {
        Some(existing) => state.logs.update(&record, existing.version).await?,
        None => state.logs.insert(&record).await?,
    };

    tracing::info!(
        user_id = %auth_user.id,
        date = %body.date,
        version = stored.version.0,
        "Daily log saved"
    );

    Ok(Json(stored.record.into()))
}

pub async fn get_day_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<DailyLogResponse>> {
    check_keyable(date).map_err(AppError::Validation)?;
    let stored = state
        .logs
        .get(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No log for {}", date)))?;

    Ok(Json(stored.record.into()))
}

pub async fn get_monthly_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<impl IntoResponse> {
    let invalid = || AppError::Validation("Invalid year or month".into());

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .filter(|d| is_keyable(*d))
        .ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;

    let mut records = state.logs.list_range(&auth_user.id, first, last).await?;
    records.sort_by_key(|r| r.date);

    let logs: Vec<DailyLogResponse> = records.into_iter().map(Into::into).collect();

    Ok((
        [(CACHE_CONTROL, "private, max-age=300"), (VARY, "Cookie")],
        Json(logs),
    ))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakResponse>> {
    let records = state.logs.list_all(&auth_user.id).await?;

    Ok(Json(StreakResponse {
        streak: compute_streak(&records),
    }))
}

pub async fn delete_day_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<StatusCode> {
    check_keyable(date).map_err(AppError::Validation)?;
    if !state.logs.delete(&auth_user.id, date).await? {
        return Err(AppError::NotFound(format!("No log for {}", date)));
    }

    tracing::info!(user_id = %auth_user.id, date = %date, "Daily log deleted");
    Ok(StatusCode::NO_CONTENT)
}
