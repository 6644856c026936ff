/// Error types for every phase: scan, index, tree queries, resolution and copy.
///
/// Scan-phase errors abort the scan and leave any previous snapshot intact.
/// Resolution-phase errors abort only that resolution.
use crate::model::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while scanning a root directory.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan root does not exist: {}", .0.display())]
    RootMissing(PathBuf),

    #[error("scan root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read scan root {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Misuse of a [`PathIndex`](crate::model::PathIndex).
///
/// These indicate a sequencing bug rather than a user error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("path already assigned an id in this scan: {}", .0.display())]
    DuplicatePath(PathBuf),

    #[error("path not present in index: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("id not present in index: {0}")]
    IdNotFound(NodeId),
}

/// Errors raised by [`FamilyTree`](crate::model::FamilyTree) queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown node id: {0}")]
    UnknownId(NodeId),

    #[error("cycle detected while collecting descendants of {start}: revisited {revisited}")]
    CycleDetected { start: NodeId, revisited: NodeId },
}

/// Errors raised by [`resolve`](crate::resolver::resolve).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("exclusion refers to an id not present in the current snapshot: {0}")]
    UnknownId(NodeId),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Errors raised by [`SnapshotStore`](crate::snapshot::SnapshotStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a scan is already in progress")]
    ScanInProgress,

    #[error("no snapshot available; scan a root directory first")]
    NoSnapshot,

    #[error("snapshot version {requested} is stale (current is {current})")]
    StaleSnapshot { requested: u64, current: u64 },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised by the copy collaborator: plan persistence and execution.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("invalid copy plan: {reason}")]
    InvalidPlan { reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plan serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

/// A non-fatal problem encountered during a scan (e.g. access denied on one
/// subdirectory). The walk continues over siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    /// Path that could not be read, if the walker reported one.
    pub path: Option<PathBuf>,
    pub message: String,
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(p) => write!(f, "{}: {}", p.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}
