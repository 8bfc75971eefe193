use std::path::{Component, Path};

use crate::error::MalformedPath;
use crate::models::ArtifactCoordinate;

pub const DEFAULT_SUFFIX: &str = ".jar";
pub const DEFAULT_ANCHOR: &str = "repository";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not an artifact file; ignored without side effects.
    Skipped,
    /// Carries the suffix but does not follow the repository layout.
    Malformed(MalformedPath),
    Artifact(ArtifactCoordinate),
}

/// Derives Maven coordinates from paths laid out like a local repository:
///
/// ```text
/// <anything>/repository/com/example/lib/tool/1.2.3/tool-1.2.3.jar
///            ^anchor    ^group ...     ^art ^ver  ^discarded
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    suffix: String,
    anchor: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX, DEFAULT_ANCHOR)
    }
}

impl Classifier {
    pub fn new(suffix: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            anchor: anchor.into(),
        }
    }

    pub fn classify(&self, path: &Path) -> Classification {
        // Raw bytes, so a non-UTF-8 artifact name is reported as malformed.
        let matches_suffix = path
            .file_name()
            .is_some_and(|name| name.as_encoded_bytes().ends_with(self.suffix.as_bytes()));
        if !matches_suffix {
            return Classification::Skipped;
        }

        match self.coordinate(path) {
            Ok(coordinate) => Classification::Artifact(coordinate),
            Err(reason) => Classification::Malformed(reason),
        }
    }

    fn coordinate(&self, path: &Path) -> Result<ArtifactCoordinate, MalformedPath> {
        let segments = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_str()),
                _ => None,
            })
            .collect::<Option<Vec<&str>>>()
            .ok_or(MalformedPath::NonUtf8)?;

        // First occurrence: a group may itself contain a segment named like the anchor.
        let anchor = segments
            .iter()
            .position(|s| *s == self.anchor)
            .ok_or_else(|| MalformedPath::AnchorMissing {
                anchor: self.anchor.clone(),
            })?;

        let rest = &segments[anchor + 1..];
        let n = rest.len();
        if n < 3 {
            return Err(MalformedPath::TooFewSegments { found: n });
        }

        Ok(ArtifactCoordinate::new(
            rest[..n - 3].join("."),
            rest[n - 3],
            rest[n - 2],
        ))
    }
}
