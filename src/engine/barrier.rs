//! Completion barrier.
//!
//! # Responsibilities
//! - Count down exactly N completions from any task, in any order
//! - Release every waiter once, and only once, the count hits zero
//!
//! # Design Decisions
//! - Atomic counter + `Notify`; waiters register before re-checking the
//!   counter so a release between check and await is never missed
//! - Arrivals past zero are rejected instead of wrapping

use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Error type for barrier misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("completion barrier already released; extra arrival rejected")]
    Overflow,
}

/// Counting barrier that releases after a fixed number of arrivals.
#[derive(Debug)]
pub struct CompletionBarrier {
    expected: usize,
    remaining: AtomicUsize,
    released: Notify,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            remaining: AtomicUsize::new(expected),
            released: Notify::new(),
        }
    }

    /// Signal one completion. Returns the number still outstanding.
    pub fn arrive(&self) -> Result<usize, BarrierError> {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| BarrierError::Overflow)?;

        let remaining = previous - 1;
        if remaining == 0 {
            tracing::debug!(expected = self.expected, "Completion barrier released");
            self.released.notify_waiters();
        }
        Ok(remaining)
    }

    /// Wait until every expected completion has arrived.
    pub async fn wait(&self) {
        loop {
            let mut notified = pin!(self.released.notified());
            notified.as_mut().enable();
            if self.is_released() {
                return;
            }
            notified.await;
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_expected_releases_immediately() {
        let barrier = CompletionBarrier::new(0);
        tokio::time::timeout(Duration::from_millis(100), barrier.wait())
            .await
            .expect("empty barrier must not block");
    }

    #[tokio::test]
    async fn test_does_not_release_early() {
        let barrier = Arc::new(CompletionBarrier::new(3));
        barrier.arrive().unwrap();
        barrier.arrive().unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(50), barrier.wait()).await;
        assert!(waited.is_err(), "released with one arrival outstanding");
        assert_eq!(barrier.remaining(), 1);

        assert_eq!(barrier.arrive(), Ok(0));
        tokio::time::timeout(Duration::from_millis(100), barrier.wait())
            .await
            .expect("barrier should release after the last arrival");
    }

    #[test]
    fn test_extra_arrival_is_rejected() {
        let barrier = CompletionBarrier::new(1);
        assert_eq!(barrier.arrive(), Ok(0));
        assert_eq!(barrier.arrive(), Err(BarrierError::Overflow));
        assert_eq!(barrier.remaining(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_releases_all_waiters() {
        let barrier = Arc::new(CompletionBarrier::new(1));
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                tokio::spawn(async move { barrier.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        barrier.arrive().unwrap();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter stuck")
                .unwrap();
        }
    }
}
