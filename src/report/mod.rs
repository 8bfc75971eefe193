//! Report renderers for a collection run.
//!
//! - [`terminal`] — colored summary box and tally table; respects `--verbose` / `--quiet`.
//! - JSON output is a straight `serde_json` dump of [`RunSummary`](crate::models::RunSummary).

pub mod terminal;
