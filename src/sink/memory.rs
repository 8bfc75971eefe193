use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::SinkError;
use crate::models::{ArtifactCoordinate, SizeRecord, UpdateOutcome};

/// In-memory stand-in for the `libraries` table.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<HashMap<ArtifactCoordinate, Option<u64>>>,
    calls: Mutex<Vec<SizeRecord>>,
    failing: HashSet<ArtifactCoordinate>,
}

impl MemorySink {
    pub fn with_rows(coordinates: impl IntoIterator<Item = ArtifactCoordinate>) -> Self {
        Self {
            rows: Mutex::new(coordinates.into_iter().map(|c| (c, None)).collect()),
            ..Default::default()
        }
    }

    /// Make every update for `coordinate` fail.
    pub fn failing_on(mut self, coordinate: ArtifactCoordinate) -> Self {
        self.failing.insert(coordinate);
        self
    }

    pub fn calls(&self) -> Vec<SizeRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn disk_size(&self, coordinate: &ArtifactCoordinate) -> Option<u64> {
        self.rows.lock().unwrap().get(coordinate).copied().flatten()
    }

    pub fn snapshot(&self) -> HashMap<ArtifactCoordinate, Option<u64>> {
        self.rows.lock().unwrap().clone()
    }
}

impl super::MetadataSink for MemorySink {
    async fn update(&self, record: &SizeRecord) -> Result<UpdateOutcome, SinkError> {
        tokio::task::yield_now().await;
        self.calls.lock().unwrap().push(record.clone());

        if self.failing.contains(&record.coordinate) {
            return Err(SinkError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.get_mut(&record.coordinate) {
            Some(size) => {
                *size = Some(record.size_bytes);
                UpdateOutcome::Applied { rows: 1 }
            }
            None => UpdateOutcome::NotFound,
        })
    }
}
