use anyhow::{bail, Context, Result};
use chrono::Duration;
use dotenvy::dotenv;
use std::env;

use crate::domains::membership::DEFAULT_BALANCE;
use crate::domains::pass::{PassPolicy, VALIDITY_WINDOW_HOURS};

/// Longest accepted validity window: one year.
const MAX_VALIDITY_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    pub pass_validity_hours: i64,
    pub default_balance: i32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "pass-server".to_string()),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            pass_validity_hours: parse_validity_hours(env::var("PASS_VALIDITY_HOURS").ok())?,
            default_balance: parse_default_balance(env::var("DEFAULT_BALANCE").ok())?,
        })
    }

    pub fn pass_policy(&self) -> Result<PassPolicy> {
        let window = Duration::try_hours(self.pass_validity_hours).with_context(|| {
            format!(
                "PASS_VALIDITY_HOURS out of range (got {})",
                self.pass_validity_hours
            )
        })?;
        Ok(PassPolicy::with_validity_window(window))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_validity_hours(raw: Option<String>) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(VALIDITY_WINDOW_HOURS);
    };
    let hours: i64 = raw
        .trim()
        .parse()
        .context("PASS_VALIDITY_HOURS must be a whole number of hours")?;
    if hours <= 0 {
        bail!("PASS_VALIDITY_HOURS must be positive (got {})", hours);
    }
    if hours > MAX_VALIDITY_HOURS {
        bail!(
            "PASS_VALIDITY_HOURS must be at most {} (got {})",
            MAX_VALIDITY_HOURS,
            hours
        );
    }
    Ok(hours)
}

fn parse_default_balance(raw: Option<String>) -> Result<i32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_BALANCE);
    };
    let balance: i32 = raw
        .trim()
        .parse()
        .context("DEFAULT_BALANCE must be a number")?;
    if balance < 0 {
        bail!("DEFAULT_BALANCE cannot be negative (got {})", balance);
    }
    Ok(balance)
}
