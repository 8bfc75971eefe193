//! Destinations for measured artifact sizes.
//!
//! Each sink exposes a single keyed update. A call that reaches the store
//! returns an [`UpdateOutcome`]; only transport or database failures surface
//! as [`SinkError`]. Sinks never retry: rerunning the walk is the retry, and
//! writing the same size twice is harmless.

pub mod dry_run;
pub mod mysql;

#[cfg(test)]
pub mod memory;

use crate::error::SinkError;
use crate::models::{SizeRecord, UpdateOutcome};

pub trait MetadataSink {
    async fn update(&self, record: &SizeRecord) -> Result<UpdateOutcome, SinkError>;
}
