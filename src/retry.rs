//! Retry policy for transient API failures
//!
//! Retries use a fixed delay with no backoff or jitter. Only failures where
//! [`ApiFailure::is_transient`] holds are retried; everything else returns on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::config::RetryPolicySettings;
use crate::data::{UserRecord, UserSource};
use crate::error::Result;

/// Default total attempts per call
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait between attempts
const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Bounded retry with a fixed inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least one.
    max_attempts: u32,
    /// Wait before each retry
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` below one is raised to one
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Builds a policy from configured settings
    pub fn from_settings(settings: &RetryPolicySettings) -> Self {
        Self::new(settings.max_attempts(), settings.delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `operation`, re-invoking it after a transient failure.
    ///
    /// The first call is attempt 1. Once `max_attempts` attempts have failed
    /// the last failure is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) if !failure.is_transient() => return Err(failure),
                Err(failure) if attempt >= self.max_attempts => {
                    error!(attempts = attempt, %failure, "Retries exhausted");
                    return Err(failure);
                }
                Err(failure) => {
                    warn!(
                        "[Retry Attempt {}] Waiting {}ms before retrying: {}",
                        attempt,
                        self.delay.as_millis(),
                        failure
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

/// A user source whose calls go through a retry policy
#[derive(Debug, Clone)]
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: UserSource> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S: UserSource> UserSource for Retrying<S> {
    async fn fetch_user_by_id(&self, id: u32) -> Result<UserRecord> {
        self.policy.run(|| self.inner.fetch_user_by_id(id)).await
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>> {
        self.policy.run(|| self.inner.fetch_all_users()).await
    }
}
