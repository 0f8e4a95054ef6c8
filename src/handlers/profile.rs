use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::StoreError;
use crate::dto::{ProfileRequest, ProfileResponse};
use crate::error::{AppError, AppResult};
use crate::models::profile::UserProfile;
use crate::AppState;

fn validated(body: &ProfileRequest) -> AppResult<chrono::NaiveDate> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    body.validate_start_date(Utc::now().date_naive())
        .map_err(AppError::Validation)
}

pub async fn create_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let start_date = validated(&body)?;

    let profile = UserProfile {
        google_id: auth_user.id.clone(),
        email: body.email,
        height: body.height,
        starting_weight: body.starting_weight,
        start_date,
    };

    let stored = match state.profiles.insert_profile(&profile).await {
        Ok(stored) => stored,
        Err(StoreError::AlreadyExists) => {
            return Err(AppError::Conflict("Profile already exists".into()))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %auth_user.id, "Profile created");

    Ok((
        StatusCode::CREATED,
        [(LOCATION, "/api/profile")],
        Json(ProfileResponse::from(stored.profile)),
    ))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ProfileResponse>> {
    let stored = state
        .profiles
        .get_profile(&auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    Ok(Json(stored.profile.into()))
}

/// Only height and starting weight change; email and start date are fixed at setup.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    validated(&body)?;

    let existing = state
        .profiles
        .get_profile(&auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    let profile = UserProfile {
        height: body.height,
        starting_weight: body.starting_weight,
        ..existing.profile
    };

    let stored = state
        .profiles
        .update_profile(&profile, existing.version)
        .await?;

    tracing::info!(user_id = %auth_user.id, "Profile updated");
    Ok(Json(stored.profile.into()))
}
