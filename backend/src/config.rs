//! Environment-driven service configuration, validated at startup.
//!
//! Secrets have no fallbacks: the process refuses to start without both JWT
//! secrets and a database URL rather than running with a guessable default.

use thiserror::Error;

use crate::domain::retention::DEFAULT_RETENTION_DAYS;
use crate::domain::tokens::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};

/// Default bcrypt work factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Errors raised while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    #[error("required environment variable {name} is not set")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but unparseable.
    #[error("environment variable {name} is invalid: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What went wrong.
        message: String,
    },
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// Address the HTTP server binds.
    pub bind_addr: String,
    /// Access token signing secret.
    pub jwt_secret: String,
    /// Refresh token signing secret, independent of the access secret.
    pub jwt_refresh_secret: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
    /// Retention window for the archival sweep, in days.
    pub retention_days: i64,
    /// Whether auth cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an injected lookup, for tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing { name })
        };
        let parsed = |name: &'static str, default: i64| -> Result<i64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|err| ConfigError::Invalid {
                    name,
                    message: format!("{err}"),
                }),
            }
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parsed("PORT", 3001)?;
        let bcrypt_cost = parsed("BCRYPT_ROUNDS", i64::from(DEFAULT_BCRYPT_COST))?;
        let bcrypt_cost = u32::try_from(bcrypt_cost).map_err(|_| ConfigError::Invalid {
            name: "BCRYPT_ROUNDS",
            message: "must be a small positive integer".to_owned(),
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_owned()),
            bind_addr: format!("{host}:{port}"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            access_ttl_secs: parsed("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
            refresh_ttl_secs: parsed("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?,
            bcrypt_cost,
            retention_days: parsed("NEWS_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?,
            secure_cookies: lookup("COOKIE_SECURE").is_some_and(|v| v == "true" || v == "1"),
        })
    }
}
