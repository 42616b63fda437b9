//! Configuration module for hotel-service.

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct HotelConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub root: RootConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub expiry_minutes: i64,
}

/// The single root administrator. The password is stored as an Argon2 PHC hash.
#[derive(Debug, Clone)]
pub struct RootConfig {
    pub email: String,
    pub password_hash: Secret<String>,
}

/// Per-IP budget for login attempts and public contact submissions.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub contact_submissions: u32,
    pub contact_window_seconds: u64,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!("{} is required", key)))
}

impl HotelConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 bytes"
            )));
        }

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "hotel-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 2),
            },
            jwt: JwtConfig {
                secret: Secret::new(jwt_secret),
                expiry_minutes: parse_or("JWT_EXPIRY_MINUTES", 480),
            },
            root: RootConfig {
                email: required("ROOT_EMAIL")?,
                password_hash: Secret::new(required("ROOT_PASSWORD_HASH")?),
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_or("LOGIN_RATE_LIMIT_ATTEMPTS", 10),
                login_window_seconds: parse_or("LOGIN_RATE_LIMIT_WINDOW_SECONDS", 300),
                contact_submissions: parse_or("CONTACT_RATE_LIMIT_SUBMISSIONS", 5),
                contact_window_seconds: parse_or("CONTACT_RATE_LIMIT_WINDOW_SECONDS", 3600),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        env::set_var("HOTEL_TEST_PARSE_OR", "not-a-number");
        assert_eq!(parse_or("HOTEL_TEST_PARSE_OR", 7u32), 7);
        env::set_var("HOTEL_TEST_PARSE_OR", "12");
        assert_eq!(parse_or("HOTEL_TEST_PARSE_OR", 7u32), 12);
        env::remove_var("HOTEL_TEST_PARSE_OR");
    }

    #[test]
    fn required_rejects_empty_values() {
        env::set_var("HOTEL_TEST_REQUIRED", "");
        assert!(required("HOTEL_TEST_REQUIRED").is_err());
        env::remove_var("HOTEL_TEST_REQUIRED");
        assert!(required("HOTEL_TEST_REQUIRED").is_err());
    }
}
