//! Caller-side retry policy.
//!
//! The session never retries. Callers that want resilience run the request
//! again here, each attempt being a brand-new session with a fresh
//! signature and uid.

use std::time::Duration;

use config::RetryConfig;
use errors::DialogueError;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::warn;

use crate::answer::GuideAnswer;
use crate::connection::duration_ms;
use crate::session::{CancelSignal, DialogueClient, DialogueRequest};

/// Doubling delays starting at `initial_delay_ms`, capped at
/// `max_delay_ms`, each jittered.
pub fn backoff_delays(policy: &RetryConfig) -> impl Iterator<Item = Duration> {
    let max_delay = Duration::from_millis(policy.max_delay_ms);
    ExponentialBackoff::from_millis(2)
        .factor((policy.initial_delay_ms / 2).max(1))
        .map(move |delay| jitter(delay.min(max_delay)))
}

/// Runs `request`, retrying retryable failures (`ConnectionTimeout`,
/// `Transport`) up to `policy.max_retries` extra times.
///
/// Cancellation through `cancel` stops the current attempt and any further
/// retries.
pub async fn request_with_retry(
    client: &DialogueClient,
    request: DialogueRequest,
    policy: &RetryConfig,
    cancel: &CancelSignal
) -> Result<GuideAnswer, DialogueError> {
    let mut delays = backoff_delays(policy);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let error = match client.request(request.clone(), cancel).await {
            Ok(answer) => return Ok(answer),
            Err(e) => e
        };

        if !error.is_retryable() || attempt > policy.max_retries {
            return Err(error);
        }

        let delay = delays
            .next()
            .unwrap_or(Duration::from_millis(policy.max_delay_ms));
        warn!(
            attempt,
            delay_ms = duration_ms(delay),
            error = %error,
            "Dialogue request failed, retrying with a fresh session"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DialogueError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 500,
            max_delay_ms: 1500
        };
        for delay in backoff_delays(&policy).take(10) {
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_backoff_never_exceeds_doubling() {
        let policy = RetryConfig {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 60_000
        };
        let delays: Vec<_> = backoff_delays(&policy).take(3).collect();
        assert!(delays[0] <= Duration::from_millis(100));
        assert!(delays[1] <= Duration::from_millis(200));
        assert!(delays[2] <= Duration::from_millis(400));
    }
}
