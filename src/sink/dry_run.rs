use tracing::info;

use crate::error::SinkError;
use crate::models::{SizeRecord, UpdateOutcome};

/// Logs every record instead of writing it. Needs no database.
#[derive(Debug, Default)]
pub struct DryRunSink;

impl super::MetadataSink for DryRunSink {
    async fn update(&self, record: &SizeRecord) -> Result<UpdateOutcome, SinkError> {
        info!(
            coordinate = %record.coordinate,
            size_bytes = record.size_bytes,
            "dry run: would update disk_size"
        );
        Ok(UpdateOutcome::Simulated)
    }
}
