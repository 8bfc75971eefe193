use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::models::{EntryKind, FileEntry};

/// Lazy, depth-first iterator over every regular file below a root directory.
///
/// Each directory is listed only when the iterator reaches it, and its entries
/// are shuffled before they are visited. Symlinks are never followed.
/// Unreadable directories are logged and counted in [`WalkStats`]; the walk
/// carries on with their siblings.
pub struct Walker {
    stack: Vec<std::vec::IntoIter<FileEntry>>,
    rng: StdRng,
    stats: Arc<WalkStats>,
}

/// Counters shared between a [`Walker`] and whoever wants to read them after
/// the walker has been moved into a pipeline.
#[derive(Debug, Default)]
pub struct WalkStats {
    files: AtomicU64,
    dirs: AtomicU64,
    special: AtomicU64,
    errors: AtomicU64,
}

impl WalkStats {
    pub fn files(&self) -> u64 {
        self.files.load(Ordering::Relaxed)
    }

    pub fn dirs(&self) -> u64 {
        self.dirs.load(Ordering::Relaxed)
    }

    pub fn special(&self) -> u64 {
        self.special.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

impl Walker {
    /// Walk `root` in a random order.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_rng(root.as_ref(), StdRng::from_entropy())
    }

    /// Walk `root` in an order fully determined by `seed`.
    pub fn with_seed(root: impl AsRef<Path>, seed: u64) -> Self {
        Self::with_rng(root.as_ref(), StdRng::seed_from_u64(seed))
    }

    fn with_rng(root: &Path, rng: StdRng) -> Self {
        let mut walker = Self {
            stack: Vec::new(),
            rng,
            stats: Arc::new(WalkStats::default()),
        };
        walker.descend(root);
        walker
    }

    pub fn stats(&self) -> Arc<WalkStats> {
        Arc::clone(&self.stats)
    }

    /// List `dir`, shuffle the listing and push it as the next frame to visit.
    fn descend(&mut self, dir: &Path) {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "cannot read directory, skipping subtree");
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "cannot read directory entry");
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };
            // DirEntry::file_type does not follow symlinks.
            match entry.file_type() {
                Ok(file_type) => entries.push(FileEntry {
                    path: entry.path(),
                    kind: file_type.into(),
                }),
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "cannot determine file type");
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        entries.shuffle(&mut self.rng);
        self.stats.dirs.fetch_add(1, Ordering::Relaxed);
        self.stack.push(entries.into_iter());
    }
}

impl Iterator for Walker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.next() else {
                self.stack.pop();
                continue;
            };

            match entry.kind {
                EntryKind::File => {
                    self.stats.files.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.path);
                }
                EntryKind::Directory => self.descend(&entry.path),
                EntryKind::Other => {
                    debug!(path = %entry.path.display(), "skipping symlink or special file");
                    self.stats.special.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    fn sample_tree() -> (TempDir, HashSet<PathBuf>) {
        let td = TempDir::new().unwrap();
        let mut expected = HashSet::new();
        for rel in [
            "a.txt",
            "one/b.jar",
            "one/two/c.jar",
            "one/two/three/d.pom",
            "other/e.jar",
            "other/deep/er/f.sha1",
        ] {
            expected.insert(touch(td.path(), rel));
        }
        fs::create_dir_all(td.path().join("empty/nested")).unwrap();
        (td, expected)
    }

    #[test]
    fn test_yields_every_file_exactly_once() {
        let (td, expected) = sample_tree();
        for seed in 0..8 {
            let yielded: Vec<PathBuf> = Walker::with_seed(td.path(), seed).collect();
            let unique: HashSet<PathBuf> = yielded.iter().cloned().collect();
            assert_eq!(yielded.len(), unique.len(), "duplicates with seed {seed}");
            assert_eq!(unique, expected, "mismatch with seed {seed}");
        }
    }

    #[test]
    fn test_same_seed_same_order() {
        let (td, _) = sample_tree();
        let first: Vec<PathBuf> = Walker::with_seed(td.path(), 42).collect();
        let second: Vec<PathBuf> = Walker::with_seed(td.path(), 42).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unseeded_walk_is_complete() {
        let (td, expected) = sample_tree();
        let yielded: HashSet<PathBuf> = Walker::new(td.path()).collect();
        assert_eq!(yielded, expected);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let td = TempDir::new().unwrap();
        fs::create_dir_all(td.path().join("a/b/c")).unwrap();
        let walker = Walker::with_seed(td.path(), 1);
        let stats = walker.stats();
        assert_eq!(walker.count(), 0);
        assert_eq!(stats.dirs(), 4);
        assert_eq!(stats.errors(), 0);
    }

    #[test]
    fn test_missing_root_counts_error() {
        let td = TempDir::new().unwrap();
        let walker = Walker::with_seed(td.path().join("nope"), 1);
        let stats = walker.stats();
        assert_eq!(walker.count(), 0);
        assert_eq!(stats.errors(), 1);
    }

    #[test]
    fn test_unreadable_subtree_spares_siblings() {
        let td = TempDir::new().unwrap();
        let a = touch(td.path(), "a/x.jar");
        touch(td.path(), "b/y.jar");
        let c = touch(td.path(), "c/z.jar");

        // The root is listed on construction; `b` only when the walk reaches it.
        let walker = Walker::with_seed(td.path(), 5);
        let stats = walker.stats();
        fs::remove_dir_all(td.path().join("b")).unwrap();

        let yielded: HashSet<PathBuf> = walker.collect();
        assert_eq!(yielded, HashSet::from([a, c]));
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.dirs(), 3);
    }

    #[test]
    fn test_stops_early_without_listing_everything() {
        let (td, _) = sample_tree();
        let mut walker = Walker::with_seed(td.path(), 3);
        let stats = walker.stats();
        assert!(walker.next().is_some());
        assert_eq!(stats.files(), 1);
        // Nine directories in total; reaching any file leaves some unlisted.
        assert!(stats.dirs() < 9);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let (td, expected) = sample_tree();
        // A cycle back to the root and a link to a file.
        std::os::unix::fs::symlink(td.path(), td.path().join("one/loop")).unwrap();
        std::os::unix::fs::symlink(td.path().join("a.txt"), td.path().join("link.txt")).unwrap();

        let walker = Walker::with_seed(td.path(), 9);
        let stats = walker.stats();
        let yielded: HashSet<PathBuf> = walker.collect();
        assert_eq!(yielded, expected);
        assert_eq!(stats.special(), 2);
    }
}
