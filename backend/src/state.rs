//! Shared handles every request can reach.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::utils::jwt::JwtUtils;
use crate::utils::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtUtils>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let jwt = Arc::new(JwtUtils::from_config(&config));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
        Self {
            pool,
            config: Arc::new(config),
            jwt,
            rate_limiter,
        }
    }
}
