/// Immutable scan results and the versioned store that guards re-scans.
///
/// A [`Snapshot`] bundles the node set, its [`PathIndex`] and its
/// [`FamilyTree`]. Nothing mutates it after construction; a re-scan builds a
/// new one. [`SnapshotStore`] keeps the current snapshot behind a version
/// number so that scanning and resolving stay mutually exclusive phases.
use crate::error::{ResolveError, ScanWarning, StoreError};
use crate::model::{DirectoryNode, FamilyTree, NodeId, PathIndex};
use crate::resolver::{self, ExclusionRequest};
use crate::scanner::Scanner;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The (PathIndex, node set, FamilyTree) triple produced by one scan.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: PathBuf,
    nodes: Vec<DirectoryNode>,
    index: PathIndex,
    tree: FamilyTree,
    warnings: Vec<ScanWarning>,
    duration: Duration,
}

impl Snapshot {
    /// Assemble a snapshot, building the family tree from `nodes`.
    ///
    /// `nodes[i].id` must equal `i` and match `index`; the scanner guarantees
    /// both.
    pub fn from_parts(
        root: PathBuf,
        nodes: Vec<DirectoryNode>,
        index: PathIndex,
        warnings: Vec<ScanWarning>,
        duration: Duration,
    ) -> Self {
        debug_assert_eq!(nodes.len(), index.len());
        let tree = FamilyTree::build(&nodes);
        Self {
            root,
            nodes,
            index,
            tree,
            warnings,
            duration,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn nodes(&self) -> &[DirectoryNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.nodes.get(id.idx())
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Aggregate bytes under the root.
    pub fn total_size(&self) -> u64 {
        self.nodes.first().map_or(0, |n| n.aggregate_size_bytes)
    }

    /// Aggregate file count under the root.
    pub fn total_files(&self) -> u64 {
        self.nodes.first().map_or(0, |n| n.file_count)
    }

    /// Number of directories, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The universe of discovered directory paths.
    pub fn all_paths(&self) -> BTreeSet<PathBuf> {
        self.nodes.iter().map(|n| n.path.clone()).collect()
    }

    /// Look up a node by path. Relative paths are taken relative to the root.
    pub fn find(&self, path: &Path) -> Option<&DirectoryNode> {
        let candidate = if path.is_absolute() {
            path.components().collect::<PathBuf>()
        } else {
            self.root.join(path).components().collect()
        };
        self.index.id_of(&candidate).ok().and_then(|id| self.node(id))
    }

    /// Resolve `request` against every directory in this snapshot.
    ///
    /// See [`resolver::resolve`] for the semantics, including the root
    /// sentinel.
    pub fn resolve(&self, request: &ExclusionRequest) -> Result<BTreeSet<PathBuf>, ResolveError> {
        resolver::resolve(&self.all_paths(), request, &self.tree, &self.index)
    }
}

/// A snapshot paired with the store version it was published under.
#[derive(Debug, Clone)]
pub struct VersionedSnapshot {
    pub version: u64,
    pub snapshot: Arc<Snapshot>,
}

/// Holder of the current snapshot with a single-flight scan guard.
///
/// - Only one scan runs at a time; a concurrent attempt fails with
///   [`StoreError::ScanInProgress`].
/// - A failed scan leaves the previous snapshot and version untouched.
/// - Each successful scan bumps the version; resolving against an older
///   version fails with [`StoreError::StaleSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotStore {
    state: RwLock<StoreState>,
    scan_gate: Mutex<()>,
}

#[derive(Debug, Default)]
struct StoreState {
    current: Option<VersionedSnapshot>,
    /// Last version handed out. Never decreases, even across `clear`.
    last_version: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` and publish the result as the new current snapshot.
    pub fn rescan(&self, root: &Path, scanner: &Scanner) -> Result<VersionedSnapshot, StoreError> {
        let _gate = self.scan_gate.try_lock().ok_or(StoreError::ScanInProgress)?;

        let snapshot = scanner.scan(root)?;
        Ok(self.publish(snapshot))
    }

    /// Install an already-built snapshot as current.
    pub fn publish(&self, snapshot: Snapshot) -> VersionedSnapshot {
        let mut state = self.state.write();
        state.last_version += 1;
        let version = state.last_version;
        let published = VersionedSnapshot {
            version,
            snapshot: Arc::new(snapshot),
        };
        info!(
            "Published snapshot v{version} of {}",
            published.snapshot.root().display()
        );
        state.current = Some(published.clone());
        published
    }

    pub fn current(&self) -> Option<VersionedSnapshot> {
        self.state.read().current.clone()
    }

    pub fn version(&self) -> Option<u64> {
        self.state.read().current.as_ref().map(|c| c.version)
    }

    /// Resolve `request` against the snapshot published as `version`.
    pub fn resolve(
        &self,
        version: u64,
        request: &ExclusionRequest,
    ) -> Result<BTreeSet<PathBuf>, StoreError> {
        let state = self.state.read();
        let current = state.current.as_ref().ok_or(StoreError::NoSnapshot)?;
        if current.version != version {
            return Err(StoreError::StaleSnapshot {
                requested: version,
                current: current.version,
            });
        }
        Ok(current.snapshot.resolve(request)?)
    }

    /// Drop the current snapshot. Versions keep counting up, so handles to
    /// the dropped snapshot stay stale.
    pub fn clear(&self) {
        self.state.write().current = None;
    }
}
