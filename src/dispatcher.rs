use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::warn;

use crate::progress::ProgressReporter;

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Runs an async operation over a lazy sequence with at most `limit`
/// operations in flight.
///
/// Items are pulled from the sequence only when a slot is free, so a slow
/// operation applies backpressure all the way back to the producer. A failed
/// operation is logged and counted; it never stops its siblings.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    limit: usize,
    reporter: ProgressReporter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub succeeded: u64,
    pub failed: u64,
}

impl DispatchSummary {
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Dispatcher {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            reporter: ProgressReporter::silent(),
        }
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drive `op` over every item and wait for all of them.
    ///
    /// Returns once the sequence is exhausted, every started operation has
    /// completed and the progress reporter has stopped.
    pub async fn run<I, F, Fut, E>(&self, items: I, op: F) -> DispatchSummary
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let (progress, rx) = watch::channel(0u64);
        let failed = AtomicU64::new(0);

        let work = async {
            // Owned by the work future; dropping it on completion stops the reporter.
            let progress = progress;
            stream::iter(items)
                .for_each_concurrent(Some(self.limit), |item| {
                    let op = &op;
                    let progress = &progress;
                    let failed = &failed;
                    async move {
                        match op(item).await {
                            Ok(()) => progress.send_modify(|n| *n += 1),
                            Err(err) => {
                                warn!(error = %err, "item failed");
                                failed.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                })
                .await;
        };

        let ((), succeeded) = tokio::join!(work, self.reporter.watch(rx));

        DispatchSummary {
            succeeded,
            failed: failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        for limit in [1, 3, 10] {
            let active = Cell::new(0usize);
            let peak = Cell::new(0usize);

            let summary = Dispatcher::new(limit)
                .run(0..50u64, |i| {
                    let active = &active;
                    let peak = &peak;
                    async move {
                        active.set(active.get() + 1);
                        peak.set(peak.get().max(active.get()));
                        tokio::time::sleep(Duration::from_millis(1 + i % 3)).await;
                        active.set(active.get() - 1);
                        Ok::<(), String>(())
                    }
                })
                .await;

            assert_eq!(summary.succeeded, 50);
            assert!(peak.get() <= limit, "peak {} > limit {}", peak.get(), limit);
            assert_eq!(peak.get(), limit);
        }
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let seen = Mutex::new(HashSet::new());

        let summary = Dispatcher::new(4)
            .run(0..20u32, |i| {
                let seen = &seen;
                async move {
                    tokio::task::yield_now().await;
                    seen.lock().unwrap().insert(i);
                    if i % 3 == 0 {
                        Err(format!("item {i} broke"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert_eq!(seen.lock().unwrap().len(), 20);
        assert_eq!(summary.failed, 7);
        assert_eq!(summary.succeeded, 13);
        assert_eq!(summary.attempted(), 20);
    }

    #[tokio::test]
    async fn test_pulls_lazily() {
        let pulled = Cell::new(0usize);
        let items = (0..100).inspect(|_| pulled.set(pulled.get() + 1));
        let max_ahead = Cell::new(0usize);
        let done = Cell::new(0usize);

        Dispatcher::new(2)
            .run(items, |_| {
                let pulled = &pulled;
                let max_ahead = &max_ahead;
                let done = &done;
                async move {
                    max_ahead.set(max_ahead.get().max(pulled.get() - done.get()));
                    tokio::task::yield_now().await;
                    done.set(done.get() + 1);
                    Ok::<(), String>(())
                }
            })
            .await;

        assert_eq!(pulled.get(), 100);
        assert!(max_ahead.get() <= 2, "pulled {} items ahead", max_ahead.get());
    }

    #[tokio::test]
    async fn test_empty_sequence_completes() {
        let summary = Dispatcher::default()
            .run(std::iter::empty::<u8>(), |_| async { Ok::<(), String>(()) })
            .await;
        assert_eq!(summary, DispatchSummary::default());
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(Dispatcher::new(0).limit(), 1);
    }
}
