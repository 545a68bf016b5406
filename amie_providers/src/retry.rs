use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for oracle calls.
///
/// The first attempts wait `base_delays` in turn; the remaining
/// `final_retries` attempts all wait `final_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delays: Vec<Duration>,
    pub final_retries: usize,
    pub final_delay: Duration,
}

impl Default for RetryPolicy {
    /// 2s, 4s, 6s, 8s, then 10s x 3.
    fn default() -> Self {
        Self::from_secs(&[2, 4, 6, 8], 3, 10)
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_secs(base_delays: &[u64], final_retries: usize, final_delay: u64) -> Self {
        Self {
            base_delays: base_delays.iter().copied().map(Duration::from_secs).collect(),
            final_retries,
            final_delay: Duration::from_secs(final_delay),
        }
    }

    /// A policy that tries exactly once.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            base_delays: Vec::new(),
            final_retries: 0,
            final_delay: Duration::ZERO,
        }
    }

    /// Total number of attempts, never less than one.
    #[must_use]
    pub fn attempts(&self) -> usize {
        (self.base_delays.len() + self.final_retries).max(1)
    }

    fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delays
            .get(attempt - 1)
            .copied()
            .unwrap_or(self.final_delay)
    }
}

/// Retry an async operation following `policy`.
///
/// # Returns
/// The result of the operation if successful, or the last error if all retries fail
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Request failed (attempt {attempt}/{attempts}): {e}. Retrying after {}s...",
                    delay.as_secs()
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
