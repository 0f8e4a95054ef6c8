use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::AppState;

const WINDOW: Duration = Duration::from_secs(60);
const SWEEP_EVERY: Duration = Duration::from_secs(5 * 60);

/// Fixed one-minute windows per key, kept in process memory.
#[derive(Clone, Default)]
pub struct RateLimitState {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

struct Window {
    opened_at: Instant,
    hits: u32,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit for `key`. `Err` carries the time until the window reopens.
    pub async fn hit(&self, key: &str, limit: u32) -> Result<(), Duration> {
        self.hit_at(key, limit, Instant::now()).await
    }

    async fn hit_at(&self, key: &str, limit: u32, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.to_owned()).or_insert(Window {
            opened_at: now,
            hits: 0,
        });

        let elapsed = now.saturating_duration_since(window.opened_at);
        if elapsed >= WINDOW {
            *window = Window {
                opened_at: now,
                hits: 0,
            };
        } else if window.hits >= limit {
            return Err(WINDOW - elapsed);
        }

        window.hits += 1;
        Ok(())
    }

    /// Forgets windows that closed more than a window ago.
    pub async fn sweep(&self) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, w| now.saturating_duration_since(w.opened_at) < WINDOW * 2);
    }
}

pub fn spawn_cleanup_worker(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_EVERY);
        loop {
            ticker.tick().await;
            limiter.sweep().await;
        }
    });
}

async fn enforce(
    state: &AppState,
    key: String,
    limit: u32,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(retry_after) = state.rate_limiter.hit(&key, limit).await {
        tracing::warn!(key = %key, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(req).await)
}

/// Sign-in routes, keyed by client IP.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.auth_rate_limit_per_min;
    enforce(&state, format!("auth:{}", addr.ip()), limit, req, next).await
}

/// Authenticated API, keyed by user. Must sit inside `require_auth`.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.api_rate_limit_per_min;
    enforce(&state, format!("api:{}", user.id), limit, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_is_enforced_within_window() {
        let limiter = RateLimitState::new();
        for _ in 0..3 {
            assert!(limiter.hit("ip:1", 3).await.is_ok());
        }
        let retry_after = limiter.hit("ip:1", 3).await.unwrap_err();
        assert!(retry_after <= WINDOW);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimitState::new();
        assert!(limiter.hit("api:a", 1).await.is_ok());
        assert!(limiter.hit("api:a", 1).await.is_err());
        assert!(limiter.hit("api:b", 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_window_reopens() {
        let limiter = RateLimitState::new();
        let start = Instant::now();
        assert!(limiter.hit_at("k", 1, start).await.is_ok());
        assert!(limiter.hit_at("k", 1, start + Duration::from_secs(30)).await.is_err());
        assert!(limiter.hit_at("k", 1, start + WINDOW).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_keeps_open_windows() {
        let limiter = RateLimitState::new();
        limiter.hit("k", 5).await.unwrap();
        limiter.sweep().await;
        assert_eq!(limiter.windows.lock().await.len(), 1);
    }
}
