use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::{path::Path, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth::{self, google::GoogleOAuth, rate_limit::RateLimitState};
use crate::config::Config;
use crate::db::{LogStore, ProfileStore};
use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub logs: Arc<dyn LogStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    /// `None` when Google credentials are not configured.
    pub google: Option<GoogleOAuth>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = config.frontend_url.parse().into_iter().collect();
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    // Sign-in flow, limited per client IP
    let auth_routes = Router::new()
        .route("/api/auth/google", get(handlers::auth::google_login))
        .route(
            "/api/auth/google/callback",
            get(handlers::auth::google_callback),
        )
        .route("/api/auth/signout", post(handlers::auth::signout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/auth/me", get(handlers::auth::me))
        .merge(auth_routes);

    let protected_routes = Router::new()
        // Daily logs
        .route("/api/daily-logs", post(handlers::daily_logs::log_day))
        .route(
            "/api/daily-logs/streak",
            get(handlers::daily_logs::get_streak),
        )
        .route(
            "/api/daily-logs/month/:year/:month",
            get(handlers::daily_logs::get_monthly_logs),
        )
        .route(
            "/api/daily-logs/:date",
            get(handlers::daily_logs::get_day_log).delete(handlers::daily_logs::delete_day_log),
        )
        // Analytics
        .route(
            "/api/analytics/trends",
            get(handlers::analytics::get_trends),
        )
        .route(
            "/api/analytics/correlation",
            get(handlers::analytics::get_correlation),
        )
        // Profile
        .route(
            "/api/profile",
            get(handlers::profile::get_profile)
                .post(handlers::profile::create_profile)
                .put(handlers::profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_api,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let mut app = Router::new().merge(public_routes).merge(protected_routes);

    if let Some(dir) = &state.config.static_dir {
        let index = Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)));
    }

    app.layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
