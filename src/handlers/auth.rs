use axum::{
    extract::{Query, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::auth::{
    google::GoogleOAuth,
    jwt::create_session_token,
    middleware::session_user,
    session::{
        clear_oauth_state_cookie, clear_session_cookie, oauth_state_cookie, read_cookie,
        session_cookie, OAUTH_STATE_COOKIE,
    },
};
use crate::dto::{OAuthCallbackQuery, UserInfoResponse};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// 302 Found to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn google(state: &AppState) -> AppResult<&GoogleOAuth> {
    state
        .google
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Google sign-in is not configured".into()))
}

pub async fn google_login(State(state): State<AppState>) -> AppResult<Response> {
    let oauth = google(&state)?;
    let csrf_state = Uuid::new_v4().to_string();
    let cookie = oauth_state_cookie(&csrf_state, &state.config)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        found(&oauth.authorize_url(&csrf_state)),
    )
        .into_response())
}

pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> AppResult<Response> {
    let oauth = google(&state)?;
    let clear_state = clear_oauth_state_cookie(&state.config)?;

    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Google sign-in was declined");
        return Ok((
            AppendHeaders([(SET_COOKIE, clear_state)]),
            found("/auth?error=access_denied"),
        )
            .into_response());
    }

    let expected = read_cookie(&headers, OAUTH_STATE_COOKIE);
    match (query.state.as_deref(), expected.as_deref()) {
        (Some(got), Some(want)) if got == want => {}
        _ => return Err(AppError::BadRequest("Invalid OAuth state".into())),
    }
    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let user = match oauth.exchange_code(&code).await {
        Ok(user) if !user.sub.is_empty() => user,
        Ok(_) => {
            tracing::warn!("Google returned an identity without a subject");
            return Ok(found("/auth?error=signin_failed"));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google code exchange failed");
            return Ok(found("/auth?error=signin_failed"));
        }
    };

    let token = create_session_token(&user.sub, &user.email, &state.config)?;
    let session = session_cookie(&token, &state.config)?;

    tracing::info!(user_id = %user.sub, "User signed in");

    Ok((
        AppendHeaders([(SET_COOKIE, session), (SET_COOKIE, clear_state)]),
        found("/"),
    )
        .into_response())
}

/// Always 200; anonymous callers get `isAuthenticated: false`.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<UserInfoResponse>> {
    let Some((user, _)) = session_user(&headers, &state.config) else {
        return Ok(Json(UserInfoResponse::default()));
    };

    let has_profile = state.profiles.get_profile(&user.id).await?.is_some();

    Ok(Json(UserInfoResponse {
        email: user.email,
        google_id: user.id,
        is_authenticated: true,
        has_profile,
    }))
}

pub async fn signout(State(state): State<AppState>) -> AppResult<Response> {
    let cookie = clear_session_cookie(&state.config)?;

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), found("/auth")).into_response())
}
