use std::{thread, time::Duration};

use rand::Rng;

use super::error::CatalogError;

/// Exponential backoff with full jitter for transient catalog errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Upper bound of the sleep before retry number `attempt` (1-based).
    fn delay_ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails with a non-transient error, or the attempts are
    /// used up. The last error is returned.
    pub fn run<R, F>(&self, action: &str, mut operation: F) -> Result<R, CatalogError>
    where
        F: FnMut() -> Result<R, CatalogError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let ceiling = self.delay_ceiling(attempt).as_millis() as u64;
                    let delay = rand::thread_rng().gen_range(0..=ceiling);
                    log::warn!(
                        "'{}' failed on attempt {}/{}, retrying in {} ms: {}",
                        action,
                        attempt,
                        max_attempts,
                        delay,
                        err
                    );
                    thread::sleep(Duration::from_millis(delay));
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
