use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A directory entry as seen by the walker, before it is yielded or descended into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, FIFOs and devices. Never followed, never yielded.
    Other,
}

impl From<std::fs::FileType> for EntryKind {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        }
    }
}

/// Maven coordinate derived from a jar's location inside a repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ArtifactCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRecord {
    pub coordinate: ArtifactCoordinate,
    pub size_bytes: u64,
}

/// Result of a sink call that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one row matched the coordinate.
    Applied { rows: u64 },
    /// No row exists for the coordinate.
    NotFound,
    /// Nothing was written (dry run).
    Simulated,
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOutcome::Applied { rows } => write!(f, "applied ({} rows)", rows),
            UpdateOutcome::NotFound => write!(f, "not found"),
            UpdateOutcome::Simulated => write!(f, "simulated"),
        }
    }
}

/// A per-item failure kept for the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: String,
}

/// Tallies for one collection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub root: PathBuf,
    /// Regular files yielded by the walker.
    pub files_seen: u64,
    /// Files whose name does not carry the artifact suffix.
    pub skipped: u64,
    /// Suffix matched but the path does not follow the repository layout.
    pub malformed: u64,
    /// Artifacts handed to the dispatcher.
    pub artifacts: u64,
    /// Artifacts whose record was written (or simulated in a dry run).
    pub updated: u64,
    pub unmatched: u64,
    pub failed: u64,
    pub walk_errors: u64,
    pub total_bytes: u64,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub failures: Vec<FailedItem>,
    /// Failures beyond the recorded ones.
    pub failures_truncated: u64,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
