//! Server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stockroom_core::StockPolicy;
use stockroom_db::DbConfig;
use tracing::warn;

const DEV_SESSION_SECRET: &str = "stockroom-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// HMAC secret for session tokens
    pub session_secret: String,

    /// Session token lifetime in seconds
    pub session_lifetime_secs: i64,

    /// Add `Secure` to the session cookie
    pub secure_cookie: bool,

    /// Let stock counters go negative instead of rejecting the workflow
    pub allow_negative_stock: bool,

    /// `development` or anything else
    pub environment: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = var("STOCKROOM_ENV", "development");
        let is_development = environment == "development";

        let session_secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if is_development => {
                warn!("SESSION_SECRET not set, using the development secret");
                DEV_SESSION_SECRET.to_string()
            }
            _ => return Err(ConfigError::MissingRequired("SESSION_SECRET".to_string())),
        };

        let config = AppConfig {
            bind_addr: var("STOCKROOM_BIND_ADDR", "0.0.0.0:3000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_BIND_ADDR".to_string()))?,

            database_path: PathBuf::from(var("STOCKROOM_DATABASE_PATH", "./stockroom.db")),

            max_connections: var("STOCKROOM_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_MAX_CONNECTIONS".to_string()))?,

            session_secret,

            session_lifetime_secs: var("SESSION_LIFETIME_SECS", "604800") // 7 days
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_LIFETIME_SECS".to_string()))?,

            secure_cookie: var("SESSION_SECURE_COOKIE", "false")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_SECURE_COOKIE".to_string()))?,

            allow_negative_stock: var("STOCKROOM_ALLOW_NEGATIVE_STOCK", "false")
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("STOCKROOM_ALLOW_NEGATIVE_STOCK".to_string())
                })?,

            environment,
        };

        if config.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_LIFETIME_SECS".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("STOCKROOM_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    pub fn stock_policy(&self) -> StockPolicy {
        if self.allow_negative_stock {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::Strict
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(30))
            .stock_policy(self.stock_policy())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.database_path, PathBuf::from("./stockroom.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session_lifetime_secs, 604_800);
        assert_eq!(config.session_secret, DEV_SESSION_SECRET);
        assert!(!config.secure_cookie);
        assert_eq!(config.stock_policy(), StockPolicy::Strict);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKROOM_BIND_ADDR", "127.0.0.1:8080"),
            ("STOCKROOM_ALLOW_NEGATIVE_STOCK", "true"),
            ("SESSION_SECURE_COOKIE", "true"),
            ("SESSION_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.stock_policy(), StockPolicy::AllowNegative);
        assert!(config.secure_cookie);
        assert_eq!(config.db_config().stock_policy, StockPolicy::AllowNegative);
    }

    #[test]
    fn test_secret_required_outside_development() {
        let err = load(&[("STOCKROOM_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "SESSION_SECRET"));

        assert!(load(&[("STOCKROOM_ENV", "production"), ("SESSION_SECRET", "x")]).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOCKROOM_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("SESSION_LIFETIME_SECS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
