use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::dto::AnalyticsQuery;
use crate::error::{AppError, AppResult};
use crate::services::{
    correlation::{compute_correlation, CorrelationResult},
    trends::{generate_trends, TrendSeries},
};
use crate::AppState;

pub async fn get_trends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<TrendSeries>> {
    let (start, end) = query
        .resolve_ordered(Utc::now().date_naive())
        .map_err(AppError::BadRequest)?;

    let records = state.logs.list_range(&auth_user.id, start, end).await?;
    let series =
        generate_trends(&records, start, end).map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(series))
}

/// Never fails on the window: an inverted range yields the empty result.
pub async fn get_correlation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<CorrelationResult>> {
    let (start, end) = query
        .resolve(Utc::now().date_naive())
        .map_err(AppError::BadRequest)?;

    let records = state.logs.list_range(&auth_user.id, start, end).await?;

    Ok(Json(compute_correlation(&records, start, end)))
}
