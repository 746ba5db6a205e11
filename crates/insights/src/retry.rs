//! Bounded retry with exponential backoff for generation calls.
//!
//! [`retry_with_backoff`] runs an attempt up to
//! [`RetryPolicy::max_attempts`] times, sleeping `base × 2^(n−1)` after the
//! n-th retryable failure. There is no sleep after the final attempt. Both
//! the attempt and the sleep race a [`CancellationToken`] so the caller can
//! impose an overall deadline.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use workboard_core::analysis::{RetryPolicy, UNKNOWN_ERROR};

use crate::client::AttemptError;

/// Why the retry loop ended without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Every attempt failed with a retryable error.
    #[error("Gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: AttemptError },

    /// An attempt failed with an error that retrying cannot fix.
    #[error("Attempt {attempt} failed permanently: {error}")]
    Rejected { attempt: u32, error: AttemptError },

    /// The cancellation token fired before the loop finished.
    #[error("Generation cancelled after {attempts} attempt(s)")]
    Cancelled {
        attempts: u32,
        last: Option<AttemptError>,
    },
}

impl GenerationError {
    /// Message of the last attempt error, for reporting to clients.
    pub fn last_message(&self) -> String {
        let last = match self {
            GenerationError::Exhausted { last, .. } => Some(last),
            GenerationError::Rejected { error, .. } => Some(error),
            GenerationError::Cancelled { last, .. } => last.as_ref(),
        };
        match last.map(AttemptError::message) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => match self {
                GenerationError::Cancelled { .. } => self.to_string(),
                _ => UNKNOWN_ERROR.to_string(),
            },
        }
    }
}

/// Run `op` until it succeeds, fails permanently, runs out of attempts, or
/// `cancel` fires. `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, GenerationError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last: Option<AttemptError> = None;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(GenerationError::Cancelled { attempts: attempt - 1, last });
            }
            result = op(attempt) => result,
        };

        let error = match result {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Generation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !error.is_retryable() {
            tracing::warn!(attempt, error = %error, "Generation attempt failed permanently");
            return Err(GenerationError::Rejected { attempt, error });
        }

        if attempt >= max_attempts {
            tracing::warn!(attempt, error = %error, "Generation attempts exhausted");
            return Err(GenerationError::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        let delay = policy.delay_after(attempt);
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Generation attempt failed, retrying",
        );
        last = Some(error);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(GenerationError::Cancelled { attempts: attempt, last });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use tokio::time::Instant;

    use super::*;

    fn unavailable() -> AttemptError {
        AttemptError::Status {
            status: 503,
            message: "The model is overloaded.".into(),
        }
    }

    fn bad_request() -> AttemptError {
        AttemptError::Status {
            status: 400,
            message: "API key not valid".into(),
        }
    }

    /// Replays a fixed sequence of outcomes, recording attempt numbers.
    struct Script {
        outcomes: Mutex<VecDeque<Result<&'static str, AttemptError>>>,
        attempts: Mutex<Vec<u32>>,
    }

    impl Script {
        fn new(outcomes: Vec<Result<&'static str, AttemptError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                attempts: Mutex::new(Vec::new()),
            }
        }

        async fn call(&self, attempt: u32) -> Result<&'static str, AttemptError> {
            self.attempts.lock().unwrap().push(attempt);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of outcomes")
        }

        fn attempts(&self) -> Vec<u32> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn three_unavailable_responses_exhaust_after_1500ms() {
        let script = Script::new(vec![Err(unavailable()), Err(unavailable()), Err(unavailable())]);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let result = retry_with_backoff(&RetryPolicy::default(), &cancel, |n| script.call(n)).await;

        assert_matches!(result, Err(GenerationError::Exhausted { attempts: 3, .. }));
        assert_eq!(script.attempts(), vec![1, 2, 3]);
        // 500ms after attempt 1, 1000ms after attempt 2, nothing after 3.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let script = Script::new(vec![Err(bad_request())]);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let result = retry_with_backoff(&RetryPolicy::default(), &cancel, |n| script.call(n)).await;

        assert_matches!(
            result,
            Err(GenerationError::Rejected { attempt: 1, ref error }) if *error == bad_request()
        );
        assert_eq!(script.attempts(), vec![1]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_second_attempt() {
        let script = Script::new(vec![
            Err(AttemptError::Transport("connection refused".into())),
            Ok("summary"),
        ]);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let result = retry_with_backoff(&RetryPolicy::default(), &cancel, |n| script.call(n)).await;

        assert_eq!(result, Ok("summary"));
        assert_eq!(script.attempts(), vec![1, 2]);
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_attempts_still_tries_once() {
        let script = Script::new(vec![Err(unavailable())]);
        let cancel = CancellationToken::new();
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };

        let result = retry_with_backoff(&policy, &cancel, |n| script.call(n)).await;

        assert_matches!(result, Err(GenerationError::Exhausted { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_ends_the_loop() {
        let script = Script::new(vec![Err(unavailable()), Ok("too late")]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = retry_with_backoff(&RetryPolicy::default(), &cancel, |n| script.call(n)).await;

        assert_matches!(
            result,
            Err(GenerationError::Cancelled { attempts: 1, last: Some(_) })
        );
        assert_eq!(script.attempts(), vec![1]);
    }

    #[tokio::test]
    async fn already_cancelled_token_makes_no_attempt() {
        let script = Script::new(vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = retry_with_backoff(&RetryPolicy::default(), &cancel, |n| script.call(n)).await;

        assert_matches!(result, Err(GenerationError::Cancelled { attempts: 0, last: None }));
        assert!(script.attempts().is_empty());
    }

    #[test]
    fn last_message_reports_api_message() {
        let err = GenerationError::Exhausted {
            attempts: 3,
            last: unavailable(),
        };
        assert_eq!(err.last_message(), "The model is overloaded.");
    }

    #[test]
    fn last_message_for_empty_error_uses_fallback_text() {
        let err = GenerationError::Rejected {
            attempt: 1,
            error: AttemptError::Transport(String::new()),
        };
        assert_eq!(err.last_message(), UNKNOWN_ERROR);
    }
}
