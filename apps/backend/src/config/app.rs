use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::GameRules;
use crate::error::AppError;
use crate::ws::fanout::RetryPolicy;

/// Runtime configuration read from the environment at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub rules: GameRules,
    /// How long a websocket registration stays valid.
    pub connection_ttl: Duration,
    pub delivery: RetryPolicy,
    /// Extra attempts for an action that lost an optimistic-lock race.
    pub conflict_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = GameRules::default();
        let rules = GameRules {
            starting_score: parse_or(&lookup, "OMI_STARTING_SCORE", defaults.starting_score)?,
            losing_score: parse_or(&lookup, "OMI_LOSING_SCORE", defaults.losing_score)?,
        };
        if rules.losing_score >= rules.starting_score {
            return Err(AppError::config(format!(
                "OMI_LOSING_SCORE ({}) must be below OMI_STARTING_SCORE ({})",
                rules.losing_score, rules.starting_score
            )));
        }

        let max_attempts: u32 = parse_or(&lookup, "OMI_DELIVERY_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(AppError::config("OMI_DELIVERY_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            host: lookup("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "BACKEND_PORT", 3001)?,
            database_url: must_var(&lookup, "DATABASE_URL")?,
            jwt_secret: must_var(&lookup, "BACKEND_JWT_SECRET")?,
            rules,
            connection_ttl: Duration::from_secs(parse_or(
                &lookup,
                "OMI_CONNECTION_TTL_SECS",
                3 * 60 * 60,
            )?),
            delivery: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(parse_or(
                    &lookup,
                    "OMI_DELIVERY_BASE_DELAY_MS",
                    100,
                )?),
            },
            conflict_retries: parse_or(&lookup, "OMI_CONFLICT_RETRIES", 3)?,
        })
    }
}

/// Get required variable or return a configuration error.
fn must_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::config(format!("{name} must be set"))),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("{name}='{raw}' is invalid: {e}"))),
    }
}
