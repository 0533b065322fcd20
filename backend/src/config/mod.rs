//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, session-token secret, rate-limit presets and
//! the optional first-run super admin.

use crate::utils::rate_limiter::RateLimitPolicy;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Deployment mode. Internal error details are only echoed to clients in
/// development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Invalid APP_ENV: {}", other)),
        }
    }
}

/// Window/count pairs for the two route classes.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// Login and other credential-accepting routes.
    pub auth: RateLimitPolicy,
    /// Everything else under `/api`.
    pub api: RateLimitPolicy,
    /// How often expired windows are swept from memory.
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            auth: RateLimitPolicy::new(50, 15 * 60 * 1000),
            api: RateLimitPolicy::new(100, 15 * 60 * 1000),
            sweep_interval_seconds: 60,
        }
    }
}

/// Credentials for the super admin created on first start when the
/// `admins` table is empty.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub server_port: u16,
    pub environment: Environment,
    pub bcrypt_cost: u32,
    pub low_stock_threshold: i64,
    pub rate_limits: RateLimitSettings,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
        let max_connections = parse_env("DB_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_seconds = parse_env("DB_ACQUIRE_TIMEOUT_SECONDS", 3u64)?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 characters");
        }
        let jwt_expires_in_seconds = parse_env("JWT_EXPIRES_IN_SECONDS", 86400u64)?;

        let server_port = parse_env("SERVER_PORT", 3000u16)?;

        let environment = match env::var("APP_ENV") {
            Ok(value) => value
                .parse::<Environment>()
                .map_err(anyhow::Error::msg)?,
            Err(_) => Environment::Production,
        };

        let bcrypt_cost = parse_env("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let low_stock_threshold = parse_env("LOW_STOCK_THRESHOLD", 10i64)?;

        let rate_limits = RateLimitSettings {
            auth: RateLimitPolicy::new(
                parse_env("RATE_LIMIT_AUTH_MAX", 50u32)?,
                parse_env("RATE_LIMIT_AUTH_WINDOW_SECONDS", 900u64)? * 1000,
            ),
            api: RateLimitPolicy::new(
                parse_env("RATE_LIMIT_API_MAX", 100u32)?,
                parse_env("RATE_LIMIT_API_WINDOW_SECONDS", 900u64)? * 1000,
            ),
            sweep_interval_seconds: parse_env("RATE_LIMIT_SWEEP_SECONDS", 60u64)?,
        };
        if rate_limits.auth.max_requests == 0 || rate_limits.api.max_requests == 0 {
            anyhow::bail!("Rate limit maximums must be at least 1");
        }
        if rate_limits.auth.window_ms == 0 || rate_limits.api.window_ms == 0 {
            anyhow::bail!("Rate limit windows must be at least 1 second");
        }

        let bootstrap_admin = match (
            env::var("SUPER_ADMIN_EMAIL"),
            env::var("SUPER_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: env::var("SUPER_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            server_port,
            environment,
            bcrypt_cost,
            low_stock_threshold,
            rate_limits,
            bootstrap_admin,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// In-memory database, cheap hashing, development mode.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 5,
            jwt_secret: "test-secret-value-0123456789".to_string(),
            jwt_expires_in_seconds: 3600,
            server_port: 0,
            environment: Environment::Development,
            bcrypt_cost: 4,
            low_stock_threshold: 5,
            rate_limits: RateLimitSettings::default(),
            bootstrap_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("development".parse(), Ok(Environment::Development));
        assert_eq!("DEV".parse(), Ok(Environment::Development));
        assert_eq!(" production ".parse(), Ok(Environment::Production));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_rate_limits() {
        let settings = RateLimitSettings::default();
        assert_eq!(settings.auth.max_requests, 50);
        assert_eq!(settings.api.max_requests, 100);
        assert_eq!(settings.auth.window_ms, 900_000);
        assert!(settings.auth.max_requests < settings.api.max_requests);
    }
}
