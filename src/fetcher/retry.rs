use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff for idempotent reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (default: 3)
    pub retries: u32,

    /// Delay before the first retry in milliseconds (default: 100)
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after every retry (default: 1.5)
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay_ms: 100,
            multiplier: 1.5,
        }
    }
}

impl RetryPolicy {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Delay before retry number `n` (zero-based).
    pub fn delay_for(&self, n: u32) -> Duration {
        let millis = self.initial_delay_ms as f64 * self.multiplier.powi(n as i32);
        Duration::from_millis(millis.round() as u64)
    }
}

/// Run `op` until it succeeds or the policy's retries are exhausted.
///
/// The last error is returned unmodified.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.retries => {
                let delay = policy.delay_for(attempt);
                tracing::debug!("Attempt {} failed, retrying in {:?}: {}", attempt + 1, delay, e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
