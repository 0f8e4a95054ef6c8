use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Contents of the signed session cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Google subject identifier.
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    /// Past half its lifetime; the middleware re-issues such sessions.
    pub fn needs_renewal(&self, now: i64) -> bool {
        let lifetime = self.exp - self.iat;
        now - self.iat > lifetime / 2
    }
}

pub fn create_session_token(google_id: &str, email: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: google_id.to_string(),
        email: email.to_string(),
        exp: (now + Duration::seconds(config.session_ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create session token: {}", e)))
}

pub fn verify_session_token(token: &str, config: &Config) -> AppResult<TokenData<SessionClaims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}
