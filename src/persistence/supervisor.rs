//! Connection supervision: bounded retry with constant backoff.
//!
//! The database is a mandatory dependency once configured. The
//! supervisor makes a fixed number of attempts with a constant delay
//! between them and reports exhaustion as
//! [`RelayError::ConnectionExhausted`]; the top-level caller decides
//! whether that terminates the process (it does, in `main`), keeping
//! the retry logic itself pure and testable.
//!
//! This covers the initial connection only. Reconnecting after an
//! established connection is lost is left to the pool.

use std::future::Future;
use std::time::Duration;

use crate::error::RelayError;

/// Retry budget for the initial connection.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (so 10 = 1 try + 9 retries).
    pub attempts: u32,
    /// Constant delay between attempts; no exponential growth.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(3_000),
        }
    }
}

/// Runs `attempt` up to `policy.attempts` times with a constant delay
/// between failures, returning the first success.
///
/// Each attempt is logged with its sequence number. The delay is not
/// slept after the final failure.
///
/// # Errors
///
/// Returns [`RelayError::ConnectionExhausted`] carrying the total
/// attempt count and the last error once the budget is spent.
pub async fn connect_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, RelayError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RelayError>>,
{
    let total = policy.attempts.max(1);
    let mut last_error = String::new();

    for seq in 1..=total {
        tracing::info!(attempt = seq, total, "trying to connect to database");

        match attempt(seq).await {
            Ok(connected) => {
                tracing::info!("connection has been established successfully");
                return Ok(connected);
            }
            Err(error) => {
                last_error = error.to_string();
                if seq < total {
                    tracing::warn!(attempt = seq, error = %last_error, "retrying to connect");
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    tracing::error!(attempts = total, error = %last_error, "unable to connect to the database");
    Err(RelayError::ConnectionExhausted {
        attempts: total,
        last_error,
    })
}
