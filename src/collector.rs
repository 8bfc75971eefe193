use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::classifier::{Classification, Classifier};
use crate::dispatcher::Dispatcher;
use crate::error::ItemError;
use crate::models::{ArtifactCoordinate, FailedItem, RunSummary, SizeRecord, UpdateOutcome};
use crate::sink::MetadataSink;
use crate::walker::{WalkStats, Walker};

/// Failures kept for the report; the rest are only counted.
const MAX_RECORDED_FAILURES: usize = 100;

/// Walks a repository tree, measures every artifact and hands the sizes to a sink.
pub struct Collector<S> {
    classifier: Classifier,
    dispatcher: Dispatcher,
    sink: S,
    strict: bool,
}

#[derive(Default)]
struct Tally {
    skipped: AtomicU64,
    malformed: AtomicU64,
    artifacts: AtomicU64,
    updated: AtomicU64,
    unmatched: AtomicU64,
    total_bytes: AtomicU64,
    failures: Mutex<Vec<FailedItem>>,
    failures_truncated: AtomicU64,
}

impl Tally {
    fn record_failure(&self, path: &Path, err: &ItemError) {
        let Ok(mut failures) = self.failures.lock() else {
            return;
        };
        if failures.len() < MAX_RECORDED_FAILURES {
            failures.push(FailedItem {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
        } else {
            self.failures_truncated.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<S: MetadataSink> Collector<S> {
    pub fn new(classifier: Classifier, dispatcher: Dispatcher, sink: S) -> Self {
        Self {
            classifier,
            dispatcher,
            sink,
            strict: false,
        }
    }

    /// Report artifacts with no matching record as failures.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn run(&self, root: &Path, walker: Walker) -> RunSummary {
        let stats = walker.stats();
        self.collect(root, walker, &stats).await
    }

    async fn collect(
        &self,
        root: &Path,
        paths: impl Iterator<Item = PathBuf>,
        stats: &WalkStats,
    ) -> RunSummary {
        let started = Instant::now();
        let tally = Tally::default();

        info!(
            root = %root.display(),
            concurrency = self.dispatcher.limit(),
            "starting collection"
        );

        let artifacts = paths.filter_map(|path| match self.classifier.classify(&path) {
            Classification::Artifact(coordinate) => {
                tally.artifacts.fetch_add(1, Ordering::Relaxed);
                Some((path, coordinate))
            }
            Classification::Skipped => {
                tally.skipped.fetch_add(1, Ordering::Relaxed);
                None
            }
            Classification::Malformed(reason) => {
                debug!(path = %path.display(), %reason, "artifact outside the repository layout");
                tally.malformed.fetch_add(1, Ordering::Relaxed);
                None
            }
        });

        let tally_ref = &tally;
        let dispatched = self
            .dispatcher
            .run(artifacts, move |(path, coordinate)| async move {
                let result = self.process(&path, coordinate, tally_ref).await;
                if let Err(err) = &result {
                    tally_ref.record_failure(&path, err);
                }
                result
            })
            .await;

        let summary = RunSummary {
            root: root.to_path_buf(),
            files_seen: stats.files(),
            skipped: tally.skipped.load(Ordering::Relaxed),
            malformed: tally.malformed.load(Ordering::Relaxed),
            artifacts: tally.artifacts.load(Ordering::Relaxed),
            updated: tally.updated.load(Ordering::Relaxed),
            unmatched: tally.unmatched.load(Ordering::Relaxed),
            failed: dispatched.failed,
            walk_errors: stats.errors(),
            total_bytes: tally.total_bytes.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
            failures: tally.failures.into_inner().unwrap_or_default(),
            failures_truncated: tally.failures_truncated.load(Ordering::Relaxed),
        };

        info!(
            files = summary.files_seen,
            dirs = stats.dirs(),
            special = stats.special(),
            artifacts = summary.artifacts,
            attempted = dispatched.attempted(),
            updated = summary.updated,
            unmatched = summary.unmatched,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "collection finished"
        );

        summary
    }

    async fn process(
        &self,
        path: &Path,
        coordinate: ArtifactCoordinate,
        tally: &Tally,
    ) -> Result<(), ItemError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| ItemError::Measure {
                path: path.to_path_buf(),
                source,
            })?;

        let record = SizeRecord {
            coordinate,
            size_bytes: metadata.len(),
        };

        let outcome = match self.sink.update(&record).await {
            Ok(outcome) => outcome,
            Err(source) => {
                return Err(ItemError::Sink {
                    coordinate: record.coordinate,
                    source,
                })
            }
        };

        match outcome {
            UpdateOutcome::NotFound => {
                tally.unmatched.fetch_add(1, Ordering::Relaxed);
                debug!(coordinate = %record.coordinate, "no record to update");
                if self.strict {
                    return Err(ItemError::Unmatched {
                        coordinate: record.coordinate,
                    });
                }
            }
            outcome => {
                tally.updated.fetch_add(1, Ordering::Relaxed);
                trace!(coordinate = %record.coordinate, %outcome, "size recorded");
            }
        }

        tally.total_bytes.fetch_add(record.size_bytes, Ordering::Relaxed);
        Ok(())
    }
}
