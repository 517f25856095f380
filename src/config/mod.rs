use crate::core::retry::RetryPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_multiplier, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "user-dispatch")]
#[command(about = "Fetches users, filters them by email suffix, and forwards the matches")]
pub struct DispatchConfig {
    #[arg(long, env = "FETCH_URL")]
    pub fetch_url: String,

    #[arg(long, env = "PUSH_URL")]
    pub push_url: String,

    /// Email suffix to keep; empty keeps every user.
    #[arg(long, env = "SUFFIX", default_value = "")]
    pub suffix: String,

    /// Attempt budget per network call, including the first attempt.
    #[arg(long, env = "ATTEMPTS", default_value = "3")]
    pub attempts: u32,

    #[arg(long, env = "RETRY_DELAY_MS", default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, env = "BACKOFF_MULTIPLIER", default_value = "2.0")]
    pub backoff_multiplier: f64,

    /// Overall time budget for one dispatch run.
    #[arg(long, env = "TIMEOUT_SECONDS", default_value = "10")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl DispatchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.attempts,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        validate_url("fetch_url", &self.fetch_url)?;
        validate_url("push_url", &self.push_url)?;
        validate_positive_number("attempts", u64::from(self.attempts), 1)?;
        validate_multiplier("backoff_multiplier", self.backoff_multiplier)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}
