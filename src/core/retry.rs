use crate::domain::ports::EventSink;
use crate::utils::error::{DispatchError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

/// Absolute time bound for one dispatch run, threaded from the binary through
/// the orchestrator into the executor.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn within(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.0
    }

    fn instant(&self) -> Instant {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first call. Must be >= 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Growth factor for the inter-attempt delay. Must be >= 1.0. No cap:
    /// callers pick sane attempt/delay combinations.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff_multiplier: 2.0,
        }
    }

    /// Delay slept after failed attempt `attempt` (1-indexed): the first retry
    /// waits `initial_delay`, each later one grows by the multiplier.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent))
    }
}

/// Runs `operation` until it succeeds or the attempt budget is spent, sleeping
/// the policy delay between attempts. Every failed attempt is reported through
/// `events`. On exhaustion the last recorded error is wrapped, together with
/// the attempt count; the operation is never invoked beyond `max_attempts`.
///
/// The deadline is checked before each attempt, and an inter-attempt sleep
/// never extends past it: once it fires the executor returns
/// [`DispatchError::Cancelled`] instead of starting another attempt.
///
/// Operations must be idempotent. Side effects repeat on every attempt and
/// nothing here deduplicates them.
pub async fn run<T, F, Fut>(
    policy: &RetryPolicy,
    deadline: Deadline,
    events: &dyn EventSink,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        if deadline.expired() {
            return Err(DispatchError::Cancelled);
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                events.attempt_failed(attempt, &error);

                if attempt >= policy.max_attempts {
                    return Err(DispatchError::RetryExhausted {
                        attempts: policy.max_attempts,
                        source: Box::new(error),
                    });
                }

                let wake = Instant::now() + policy.delay_after(attempt);
                if wake >= deadline.instant() {
                    time::sleep_until(deadline.instant()).await;
                    return Err(DispatchError::Cancelled);
                }
                time::sleep_until(wake).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        failed_attempts: Mutex<Vec<(u32, String)>>,
    }

    impl EventSink for RecordingSink {
        fn attempt_failed(&self, attempt: u32, error: &DispatchError) {
            self.failed_attempts
                .lock()
                .unwrap()
                .push((attempt, error.to_string()));
        }

        fn users_fetched(&self, _count: usize) {}

        fn users_pushed(&self, _count: usize) {}
    }

    fn far_deadline() -> Deadline {
        Deadline::within(Duration::from_secs(3600))
    }

    #[test]
    fn test_delay_schedule_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));

        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
        assert_eq!(policy.delay_after(4), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_schedule_constant_with_multiplier_one() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 1.0,
        };

        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(4), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_runs_exactly_max_attempts_times() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let result: Result<()> = run(&policy, far_deadline(), &sink, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DispatchError::EmptyBody) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(DispatchError::RetryExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, DispatchError::EmptyBody));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_stops_retrying() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let start = Instant::now();
        let result = run(&policy, far_deadline(), &sink, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_with_backoff() {
        // Fails twice, succeeds on attempt 3: total delay is 1s + 2s.
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let start = Instant::now();
        let result = run(&policy, far_deadline(), &sink, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(DispatchError::EmptyBody)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let start = Instant::now();
        let result: Result<()> = run(&policy, far_deadline(), &sink, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DispatchError::EmptyBody) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(matches!(
            result,
            Err(DispatchError::RetryExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_message_names_attempt_count() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let sink = RecordingSink::default();

        let result: Result<()> = run(&policy, far_deadline(), &sink, || async {
            Err(DispatchError::UnexpectedStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        })
        .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("after 2 attempts"));
        assert!(message.contains("unexpected status code: 500"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_during_delay_before_second_attempt() {
        // Delay after attempt 1 is 5s but the deadline is 2s out: attempt 2
        // must never start.
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let start = Instant::now();
        let result: Result<()> = run(
            &policy,
            Deadline::within(Duration::from_secs(2)),
            &sink,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DispatchError::EmptyBody) }
            },
        )
        .await;

        assert!(matches!(result, Err(DispatchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_skips_the_operation_entirely() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let sink = RecordingSink::default();
        let calls = AtomicU32::new(0);

        let result: Result<()> = run(&policy, Deadline::within(Duration::ZERO), &sink, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DispatchError::EmptyBody) }
        })
        .await;

        assert!(matches!(result, Err(DispatchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_failed_attempt_reaches_the_sink() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let sink = RecordingSink::default();

        let _: Result<()> = run(&policy, far_deadline(), &sink, || async {
            Err(DispatchError::EmptyBody)
        })
        .await;

        let failed = sink.failed_attempts.lock().unwrap();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].0, 1);
        assert_eq!(failed[1].0, 2);
        assert!(failed[0].1.contains("response body is empty"));
    }
}
