//! Retry utilities with exponential backoff and jitter.
//!
//! Every multi-step write in this service is a single idempotent
//! transaction, so transient database failures are safe to retry.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::{LedgerError, Result};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth)
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Jitter factor (0.0-1.0) - randomness to spread retries
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.5,
        }
    }
}

impl RetryConfig {
    /// Config for database operations
    pub fn database() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.5,
        }
    }

    /// Delay before the given retry attempt (0-based), with jitter applied.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);
        let jittered = if self.jitter > 0.0 {
            let spread = capped * self.jitter;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (capped + offset).max(0.0)
        } else {
            capped
        };
        Duration::from_millis(jittered as u64)
    }
}

/// Run `op` until it succeeds, returns a non-transient error, or exhausts
/// the configured retries.
pub async fn execute<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                let delay = config.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    max = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
