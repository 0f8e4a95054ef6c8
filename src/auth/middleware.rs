use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth::jwt::{create_session_token, verify_session_token, SessionClaims};
use crate::auth::session::{read_cookie, session_cookie, SESSION_COOKIE};
use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Google subject identifier; partitions all of the user's data.
    pub id: String,
    pub email: String,
}

/// Resolves the session cookie, if any, into the signed-in user.
pub fn session_user(headers: &HeaderMap, config: &Config) -> Option<(AuthUser, SessionClaims)> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    let claims = verify_session_token(&token, config).ok()?.claims;
    if claims.sub.is_empty() {
        return None;
    }

    let user = AuthUser {
        id: claims.sub.clone(),
        email: claims.email.clone(),
    };
    Some((user, claims))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (auth_user, claims) =
        session_user(req.headers(), &state.config).ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(auth_user.clone());
    let mut response = next.run(req).await;

    // Sliding expiration; leave responses that already set cookies (sign-out) alone.
    if claims.needs_renewal(Utc::now().timestamp()) && !response.headers().contains_key(SET_COOKIE) {
        let token = create_session_token(&auth_user.id, &auth_user.email, &state.config)?;
        response
            .headers_mut()
            .append(SET_COOKIE, session_cookie(&token, &state.config)?);
        tracing::debug!(user_id = %auth_user.id, "Session renewed");
    }

    Ok(response)
}
