//! Bounded exponential backoff for operations that can fail transiently
//!
//! Callers classify their error type through [`Transient`]; only transient
//! failures are retried, everything else is returned immediately.

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::{Error, Result};

/// Classifies an error as worth retrying (throttling, capacity) or not
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Retry budget: at most `max_attempts` calls, delays doubling from
/// `base_delay` and capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Create a validated retry policy
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if base_delay > max_delay {
            return Err(Error::InvalidRetryPolicy(format!(
                "base delay {:?} exceeds max delay {:?}",
                base_delay, max_delay
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff between attempts; the first call is not counted as a retry
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Why a retried operation finally failed
#[derive(Error, Debug)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("{0}")]
    Fatal(E),
}

/// Run `op` until it succeeds, fails permanently, or the policy runs out
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    op: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let max_attempts = policy.max_attempts;

    let mut attempt = 0u32;
    let notify = |err: &E, delay: Duration| {
        attempt += 1;
        warn!(
            "{} throttled (attempt {}/{}), retrying in {:?}: {}",
            operation, attempt, max_attempts, delay, err
        );
    };

    match op
        .retry(policy.backoff())
        .when(|err: &E| err.is_transient())
        .notify(notify)
        .await
    {
        Ok(value) => Ok(value),
        // A transient error only comes back once the backoff is spent
        Err(err) if err.is_transient() => {
            warn!(
                "{} still throttled after {} attempts: {}",
                operation, max_attempts, err
            );
            Err(RetryError::Exhausted {
                attempts: max_attempts,
                last: err,
            })
        }
        Err(err) => Err(RetryError::Fatal(err)),
    }
}
