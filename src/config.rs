use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory development store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub frontend_url: String,
    pub static_dir: Option<String>,

    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,

    pub google: Option<GoogleConfig>,

    pub auth_rate_limit_per_min: u32,
    pub api_rate_limit_per_min: u32,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let google = match (non_empty("GOOGLE_CLIENT_ID"), non_empty("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let session_ttl_days: i64 = env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SESSION_TTL_DAYS must be a number");

        Self {
            database_url: non_empty("DATABASE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            static_dir: non_empty("STATIC_DIR"),

            session_secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"),
            session_ttl_secs: session_ttl_days * 24 * 60 * 60,
            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),

            google,

            auth_rate_limit_per_min: env::var("AUTH_RATE_LIMIT_PER_MIN")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            api_rate_limit_per_min: env::var("API_RATE_LIMIT_PER_MIN")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(100),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn google_redirect_url(&self) -> String {
        format!("{}/api/auth/google/callback", self.public_url)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            public_url: "http://localhost:8080".into(),
            frontend_url: "http://localhost:5173".into(),
            static_dir: None,
            session_secret: "test-session-secret".into(),
            session_ttl_secs: 30 * 24 * 60 * 60,
            cookie_secure: false,
            google: None,
            auth_rate_limit_per_min: 5,
            api_rate_limit_per_min: 100,
        }
    }
}
