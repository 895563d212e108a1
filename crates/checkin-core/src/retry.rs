//! ============================================================================
//! Retry Orchestrator - Bounded Retry Loop
//! ============================================================================
//! Wraps a fallible async operation in an explicit bounded loop: a budget of
//! N permits N + 1 total attempts. Every failure is logged; exhausting the
//! budget logs a terminal line and swallows the error so the caller simply
//! moves on to the next account. Retries are immediate; pacing between
//! protocol steps lives in `net::jittered_sleep`.
//! ============================================================================

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, error};

/// Run `op` until it succeeds or the budget is exhausted.
///
/// Returns `Some(value)` on success and `None` on give-up. The give-up path
/// never propagates the underlying error; the terminal log line is the only
/// trace of a permanently failed account.
pub async fn with_retries<T, E, F, Fut>(label: &str, budget: u32, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for attempt in 0..=budget {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", label, attempt + 1);
                }
                return Some(value);
            }
            Err(err) => {
                if attempt < budget {
                    error!(
                        "Attempt [{}/{}] failed: {}. Retrying...",
                        attempt + 1,
                        budget,
                        err
                    );
                } else {
                    error!(
                        "Failed to {} after [{}/{}] attempts.",
                        label,
                        attempt + 1,
                        budget
                    );
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};
    use tracing::instrument::WithSubscriber;
    use tracing_subscriber::fmt::MakeWriter;

    /// Shared buffer standing in for stderr so tests can assert on the
    /// exact log lines the retry loop emits.
    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capturing_subscriber(writer: &CaptureWriter) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish()
    }

    #[tokio::test]
    async fn test_always_failing_op_attempts_budget_plus_one() {
        let attempts = Cell::new(0u32);
        let writer = CaptureWriter::default();

        let result = with_retries("claim stamp", 3, || {
            attempts.set(attempts.get() + 1);
            async { Err::<(), _>("boom") }
        })
        .with_subscriber(capturing_subscriber(&writer))
        .await;

        assert!(result.is_none());
        assert_eq!(attempts.get(), 4);

        let logs = writer.contents();
        assert!(logs.contains("Attempt [1/3] failed: boom. Retrying..."));
        assert!(logs.contains("Attempt [3/3] failed: boom. Retrying..."));
        assert!(logs.contains("Failed to claim stamp after [4/3] attempts."));
    }

    #[tokio::test]
    async fn test_success_on_second_attempt_stops_early() {
        let attempts = Cell::new(0u32);
        let writer = CaptureWriter::default();

        let result = with_retries("claim stamp", 3, || {
            let n = attempts.get() + 1;
            attempts.set(n);
            async move {
                if n >= 2 {
                    Ok(n)
                } else {
                    Err("transient")
                }
            }
        })
        .with_subscriber(capturing_subscriber(&writer))
        .await;

        assert_eq!(result, Some(2));
        assert_eq!(attempts.get(), 2);

        // One failure logged, but never the terminal give-up line.
        let logs = writer.contents();
        assert!(logs.contains("Attempt [1/3] failed: transient. Retrying..."));
        assert!(!logs.contains("Failed to claim stamp"));
    }

    #[tokio::test]
    async fn test_zero_budget_means_single_attempt() {
        let attempts = Cell::new(0u32);

        let result = with_retries("claim stamp", 0, || {
            attempts.set(attempts.get() + 1);
            async { Err::<(), _>("boom") }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_immediate_success_is_single_attempt() {
        let attempts = Cell::new(0u32);

        let result = with_retries("claim stamp", 5, || {
            attempts.set(attempts.get() + 1);
            async { Ok::<_, &str>(42) }
        })
        .await;

        assert_eq!(result, Some(42));
        assert_eq!(attempts.get(), 1);
    }
}
