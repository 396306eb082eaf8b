//! Process-wide configuration.
//!
//! Everything the server needs from its environment is read exactly once, in
//! [`Config::from_env`], and then handed to the components that need it. No other module
//! looks at environment variables.
//!
//! | Variable                   | Default                 |
//! |----------------------------|-------------------------|
//! | `DATABASE_URL`             | required                |
//! | `DATABASE_MAX_CONNECTIONS` | `5`                     |
//! | `SERVER_HOST`              | `127.0.0.1`             |
//! | `SERVER_PORT`              | `8080`                  |
//! | `JWT_SECRET`               | required                |
//! | `JWT_TTL_SECONDS`          | `86400`                 |
//! | `BCRYPT_COST`              | `12`                    |
//! | `CORS_ALLOWED_ORIGIN`      | `http://localhost:5173` |

use std::env;
use std::str::FromStr;

const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24; // 24 hours

// bcrypt accepts work factors 4 through 31.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub cors_allowed_origin: String,
}

/// Signing secret and lifetime for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let ttl_seconds = parse_or(&lookup, "JWT_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_SECONDS",
                value: ttl_seconds.to_string(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                ttl_seconds,
            },
            bcrypt_cost,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
        None => Ok(default),
    }
}
