use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classifies errors worth another attempt (transient transport or
/// server-side failures) versus fatal ones.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Delay before retry number `retries_so_far + 1`: doubled each attempt,
    /// capped, plus up to one base delay of jitter.
    fn delay_for(&self, retries_so_far: u32) -> Duration {
        let exponent = retries_so_far.min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..=self.base_delay);
        backoff + jitter
    }
}

/// Runs `op` until it succeeds, returns a fatal error, or the attempt
/// ceiling is reached.
pub async fn with_retries<T, E, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut retries = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retries + 1 < policy.max_attempts => {
                let delay = policy.delay_for(retries);
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what,
                    retries + 1,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
