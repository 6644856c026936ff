/// Scanner module: turns a root directory into an immutable [`Snapshot`].
///
/// The scan runs to completion on the calling thread in two phases:
///
/// 1. **Discovery** ([`walk`]): a `jwalk` traversal assigns ids, records
///    parent ids and tallies the files directly inside each directory.
/// 2. **Aggregation** ([`aggregate`]): per-directory totals are rolled up
///    bottom-up, or recomputed per node on a rayon pool.
///
/// Unreadable subdirectories become [`ScanWarning`](crate::error::ScanWarning)s
/// on the snapshot; only an invalid root aborts the scan.
pub mod aggregate;
pub mod progress;
pub mod walk;

use crate::error::ScanError;
use crate::snapshot::Snapshot;
use progress::ScanProgress;

use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Maximum number of progress messages that may queue up in the channel
/// returned by [`progress_channel`].
///
/// The scanner never blocks on a full channel; excess updates are dropped.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Walker entries between two `ScanProgress::Update` messages.
pub const PROGRESS_INTERVAL: u64 = 5_000;

/// How aggregate sizes and file counts are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationMode {
    /// Single O(n) roll-up after discovery.
    #[default]
    BottomUp,
    /// Independent recursive walk per directory, run in parallel.
    PerNodeWalk,
}

/// Scan configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub aggregation: AggregationMode,
    /// Worker threads for directory reading and per-node aggregation.
    /// `1` keeps everything on the calling thread.
    pub threads: usize,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            aggregation: AggregationMode::BottomUp,
            threads: num_cpus::get(),
            skip_hidden: false,
        }
    }
}

impl ScanOptions {
    /// Single-threaded options, mainly for deterministic tests.
    pub fn serial() -> Self {
        Self {
            threads: 1,
            ..Self::default()
        }
    }
}

/// Create a bounded channel suitable for [`Scanner::with_progress`].
pub fn progress_channel() -> (Sender<ScanProgress>, Receiver<ScanProgress>) {
    crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY)
}

/// A configured scanner. Cheap to clone and reusable across scans.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
    progress_tx: Option<Sender<ScanProgress>>,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            progress_tx: None,
        }
    }

    /// Report progress on `tx` while scanning.
    pub fn with_progress(mut self, tx: Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan `root` and build a snapshot.
    ///
    /// Fails with [`ScanError::RootMissing`] or [`ScanError::NotADirectory`]
    /// before touching anything else.
    pub fn scan(&self, root: &Path) -> Result<Snapshot, ScanError> {
        let root = validate_root(root)?;
        let start = Instant::now();
        info!("Starting scan of {}", root.display());

        let discovery = walk::discover(&root, &self.options, self.progress_tx.as_ref())?;
        debug!(
            "Discovery complete: {} dirs, {} files in {:?}. Running aggregation...",
            discovery.nodes.len(),
            discovery.files_found,
            start.elapsed()
        );

        let mut nodes = discovery.nodes;
        match self.options.aggregation {
            AggregationMode::BottomUp => aggregate::aggregate_bottom_up(&mut nodes),
            AggregationMode::PerNodeWalk => aggregate::aggregate_per_node(&mut nodes, &self.options),
        }

        let duration = start.elapsed();
        let snapshot = Snapshot::from_parts(root, nodes, discovery.index, discovery.warnings, duration);
        info!(
            "Scan complete: {} directories, {} files, {} bytes, {} warnings in {duration:?}",
            snapshot.len(),
            snapshot.total_files(),
            snapshot.total_size(),
            snapshot.warnings().len()
        );

        if let Some(tx) = &self.progress_tx {
            let _ = tx.try_send(ScanProgress::Complete {
                duration,
                dirs_found: snapshot.len() as u64,
                warning_count: snapshot.warnings().len() as u64,
            });
        }

        Ok(snapshot)
    }
}

/// Scan `root` with default options.
pub fn scan(root: &Path) -> Result<Snapshot, ScanError> {
    Scanner::default().scan(root)
}

/// Check that `root` exists and is a directory, and return it as an
/// absolute path without trailing separators.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let meta = match std::fs::metadata(root) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootMissing(root.to_path_buf()))
        }
        Err(source) => {
            return Err(ScanError::Io {
                path: root.to_path_buf(),
                source,
            })
        }
    };
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let absolute = std::path::absolute(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(absolute.components().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            Scanner::new(ScanOptions::serial()).scan(&missing),
            Err(ScanError::RootMissing(p)) if p == missing
        ));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            Scanner::new(ScanOptions::serial()).scan(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_trailing_separator_is_normalised() {
        let tmp = tempfile::TempDir::new().unwrap();
        let with_slash = PathBuf::from(format!("{}/", tmp.path().display()));
        let root = validate_root(&with_slash).unwrap();
        assert_eq!(root, std::path::absolute(tmp.path()).unwrap());
    }
}
