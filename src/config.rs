//! Application Configuration
//!
//! All runtime knobs live in one explicitly constructed `AppConfig`,
//! loaded from a TOML file with environment-variable overrides and
//! validated at startup. Validation collects every violation instead of
//! stopping at the first so an operator fixes the file once.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;
/// Default JSON body limit (10 KiB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024;
/// Default token lifetime: 90 days
pub const DEFAULT_JWT_EXPIRES_IN_HOURS: i64 = 90 * 24;
/// Default credential cookie lifetime in days
pub const DEFAULT_JWT_COOKIE_EXPIRES_DAYS: i64 = 90;

/// Deployment mode flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    Development,
    Production,
}

impl FromStr for EnvMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "unknown mode '{}', expected 'development' or 'production'",
                other
            )),
        }
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: EnvMode,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub jwt_cookie_expires_days: i64,
    pub body_limit_bytes: usize,
}

/// Raw file shape; everything optional, defaults applied on load
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    env: Option<EnvMode>,
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    jwt_expires_in_hours: Option<i64>,
    jwt_cookie_expires_days: Option<i64>,
    body_limit_bytes: Option<usize>,
}

impl AppConfig {
    /// Load from a TOML file, apply env overrides, and validate
    ///
    /// A missing file is not an error; defaults plus environment variables
    /// are enough for development.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: FileConfig = if path.exists() {
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            FileConfig::default()
        };

        let mut errors = Vec::new();

        let env = match std::env::var("TOURBASE_ENV") {
            Ok(raw) => match raw.parse() {
                Ok(mode) => mode,
                Err(e) => {
                    errors.push(format!("TOURBASE_ENV: {}", e));
                    EnvMode::Development
                }
            },
            Err(_) => file.env.unwrap_or(EnvMode::Development),
        };

        let host = std::env::var("TOURBASE_HOST")
            .ok()
            .or(file.host)
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match std::env::var("TOURBASE_PORT") {
            Ok(raw) => match raw.parse() {
                Ok(port) => port,
                Err(_) => {
                    errors.push(format!("TOURBASE_PORT: '{}' is not a port number", raw));
                    DEFAULT_PORT
                }
            },
            Err(_) => file.port.unwrap_or(DEFAULT_PORT),
        };

        let jwt_secret = std::env::var("TOURBASE_JWT_SECRET")
            .ok()
            .or(file.jwt_secret)
            .unwrap_or_default();

        let config = Self {
            env,
            host,
            port,
            jwt_secret,
            jwt_expires_in_hours: file
                .jwt_expires_in_hours
                .unwrap_or(DEFAULT_JWT_EXPIRES_IN_HOURS),
            jwt_cookie_expires_days: file
                .jwt_cookie_expires_days
                .unwrap_or(DEFAULT_JWT_COOKIE_EXPIRES_DAYS),
            body_limit_bytes: file.body_limit_bytes.unwrap_or(DEFAULT_BODY_LIMIT),
        };
        config.validate(errors)?;
        Ok(config)
    }

    /// Collect every validation violation
    fn validate(&self, mut errors: Vec<String>) -> Result<(), ConfigError> {
        if self.port == 0 {
            errors.push("port: must be between 1 and 65535".to_string());
        }
        if self.jwt_secret.is_empty() {
            errors.push("jwt_secret: must be set".to_string());
        } else if self.env == EnvMode::Production && self.jwt_secret.len() < 32 {
            errors.push("jwt_secret: must be at least 32 characters in production".to_string());
        }
        if self.jwt_expires_in_hours <= 0 {
            errors.push("jwt_expires_in_hours: must be positive".to_string());
        }
        if self.jwt_cookie_expires_days <= 0 {
            errors.push("jwt_cookie_expires_days: must be positive".to_string());
        }
        if self.body_limit_bytes == 0 {
            errors.push("body_limit_bytes: must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// A development config for tests
    #[cfg(test)]
    pub fn for_tests(env: EnvMode) -> Self {
        Self {
            env,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            jwt_expires_in_hours: 24,
            jwt_cookie_expires_days: 1,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}
