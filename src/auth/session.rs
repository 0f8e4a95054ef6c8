use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "poomad_session";
pub const OAUTH_STATE_COOKIE: &str = "poomad_oauth_state";

/// Lifetime of the OAuth state cookie while the user is on Google's page.
pub const OAUTH_STATE_TTL_SECS: i64 = 10 * 60;

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|c| c.value().to_string())
}

fn build(name: &str, value: &str, path: &str, max_age_secs: i64, secure: bool) -> AppResult<HeaderValue> {
    let cookie = Cookie::build((name, value))
        .path(path)
        .max_age(time::Duration::seconds(max_age_secs))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();

    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid cookie value: {}", e)))
}

pub fn session_cookie(token: &str, config: &Config) -> AppResult<HeaderValue> {
    build(SESSION_COOKIE, token, "/", config.session_ttl_secs, config.cookie_secure)
}

pub fn clear_session_cookie(config: &Config) -> AppResult<HeaderValue> {
    build(SESSION_COOKIE, "", "/", 0, config.cookie_secure)
}

pub fn oauth_state_cookie(state: &str, config: &Config) -> AppResult<HeaderValue> {
    build(OAUTH_STATE_COOKIE, state, "/api/auth", OAUTH_STATE_TTL_SECS, config.cookie_secure)
}

pub fn clear_oauth_state_cookie(config: &Config) -> AppResult<HeaderValue> {
    build(OAUTH_STATE_COOKIE, "", "/api/auth", 0, config.cookie_secure)
}
