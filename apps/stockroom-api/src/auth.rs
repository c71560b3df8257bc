//! Session tokens and the session cookie.
//!
//! ```text
//! POST /signin ──► SessionManager::issue(user_id) ──► Set-Cookie: session=<jwt>
//!
//! GET /dashboard/... (Cookie: session=<jwt>)
//!      │
//!      ▼
//! SessionManager::validate ──► Claims { sub, iat, exp }
//!      │
//!      └── less than half the lifetime left → re-issue, fresh cookie
//! ```

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues and checks HS256 session tokens.
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: &str, lifetime_secs: i64, secure: bool) -> Self {
        SessionManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
            secure,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Generate a session token for a user.
    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: &str, now: i64) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::Unauthenticated(format!("Invalid session: {}", e)))
    }

    /// Whether less than half of the lifetime is left.
    pub fn needs_renewal(&self, claims: &Claims, now: i64) -> bool {
        claims.exp - now < self.lifetime_secs / 2
    }

    /// `Set-Cookie` value carrying a token.
    pub fn cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.lifetime_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value removing the session.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}
