/// Session state management.
///
/// Centralises everything the frontend reads and writes between phases:
/// the snapshot store, the marked exclusions, the last resolution and the
/// last copy report. Scanning and resolving never overlap; picking a new
/// root discards the marks made against the previous snapshot.
use anyhow::{anyhow, Context};
use backup_pusher_core::copy::{self, CopyPlan, CopyReport};
use backup_pusher_core::scanner::progress::ScanProgress;
use backup_pusher_core::scanner::{progress_channel, Scanner};
use backup_pusher_core::{
    ExclusionRequest, NodeId, ResolveError, Snapshot, SnapshotStore, VersionedSnapshot,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// The current phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No root selected yet.
    Idle,
    /// A snapshot is available; exclusions can be marked.
    Scanned,
    /// A copy ran against the current snapshot.
    Copied,
}

/// All session state.
pub struct Session {
    pub phase: SessionPhase,
    store: SnapshotStore,
    scanner: Scanner,
    /// Log `ScanProgress` messages while scanning.
    pub report_progress: bool,
    exclusions: ExclusionRequest,
    /// Include set from the most recent [`Session::resolve`].
    pub last_resolution: Option<BTreeSet<PathBuf>>,
    pub last_report: Option<CopyReport>,
}

impl Session {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            phase: SessionPhase::Idle,
            store: SnapshotStore::new(),
            scanner,
            report_progress: false,
            exclusions: ExclusionRequest::new(),
            last_resolution: None,
            last_report: None,
        }
    }

    /// Scan `root` and make it the current snapshot.
    ///
    /// On failure the previous snapshot, marks and phase are left as they were.
    pub fn select_root(&mut self, root: &Path) -> anyhow::Result<VersionedSnapshot> {
        let published = if self.report_progress {
            self.rescan_with_progress(root)
        } else {
            self.store.rescan(root, &self.scanner)
        }
        .with_context(|| format!("failed to scan {}", root.display()))?;

        self.phase = SessionPhase::Scanned;
        self.exclusions.clear();
        self.last_resolution = None;
        self.last_report = None;
        Ok(published)
    }

    /// Scan with a progress channel drained on a helper thread.
    fn rescan_with_progress(
        &self,
        root: &Path,
    ) -> Result<VersionedSnapshot, backup_pusher_core::StoreError> {
        let (tx, rx) = progress_channel();
        let logger = thread::Builder::new()
            .name("backup-pusher-progress".into())
            .spawn(move || {
                for msg in rx {
                    match msg {
                        ScanProgress::Update {
                            files_found,
                            dirs_found,
                            total_size,
                            current_path,
                        } => info!(
                            "{dirs_found} dirs, {files_found} files, {total_size} bytes ... {current_path}"
                        ),
                        ScanProgress::Warning { path, message } => {
                            warn!("Skipped {path}: {message}")
                        }
                        ScanProgress::Complete { duration, .. } => {
                            info!("Walk finished in {duration:?}")
                        }
                    }
                }
            });

        let scanner = self.scanner.clone().with_progress(tx);
        let result = self.store.rescan(root, &scanner);
        // Dropping the last sender ends the logger's loop.
        drop(scanner);
        if let Ok(handle) = logger {
            let _ = handle.join();
        }
        result
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.current().map(|c| c.snapshot)
    }

    fn require_snapshot(&self) -> anyhow::Result<VersionedSnapshot> {
        self.store
            .current()
            .ok_or_else(|| anyhow!("no directory selected; scan a root first"))
    }

    pub fn exclusions(&self) -> &ExclusionRequest {
        &self.exclusions
    }

    /// Flip the exclusion mark on `id`. Returns whether it is now marked.
    pub fn toggle_exclusion(&mut self, id: NodeId) -> anyhow::Result<bool> {
        let current = self.require_snapshot()?;
        if !current.snapshot.index().contains_id(id) {
            return Err(ResolveError::UnknownId(id).into());
        }
        self.last_resolution = None;
        Ok(self.exclusions.toggle(id))
    }

    /// Mark a directory given as `#ID`, a path (absolute, or relative to the
    /// root), or a bare numeric id.
    ///
    /// A bare number that names both a directory and a different id is
    /// rejected as ambiguous.
    pub fn exclude(&mut self, selector: &str) -> anyhow::Result<NodeId> {
        let current = self.require_snapshot()?;
        let id = select_node(&current.snapshot, selector)?;
        self.exclusions.insert(id);
        self.last_resolution = None;
        Ok(id)
    }

    pub fn clear_exclusions(&mut self) {
        self.exclusions.clear();
        self.last_resolution = None;
    }

    /// Resolve the marked exclusions against the current snapshot.
    pub fn resolve(&mut self) -> anyhow::Result<&BTreeSet<PathBuf>> {
        let current = self.require_snapshot()?;
        let included = self.store.resolve(current.version, &self.exclusions)?;
        Ok(self.last_resolution.insert(included))
    }

    /// Build a copy plan for `destination` from the current resolution.
    pub fn plan(&mut self, destination: &str) -> anyhow::Result<CopyPlan> {
        let current = self.require_snapshot()?;
        if self.last_resolution.is_none() {
            self.resolve()?;
        }
        let included = self.last_resolution.clone().unwrap_or_default();
        Ok(CopyPlan::new(destination, &current.snapshot, &included))
    }

    /// Resolve, plan and copy to `destination`.
    pub fn copy_to(&mut self, destination: &str, dry_run: bool) -> anyhow::Result<&CopyReport> {
        let plan = self.plan(destination)?;
        let report = copy::execute(&plan, dry_run)
            .with_context(|| format!("failed to copy to {destination}"))?;
        if !dry_run {
            self.phase = SessionPhase::Copied;
        }
        Ok(self.last_report.insert(report))
    }
}

/// Turn an exclusion selector into a node id of `snapshot`.
fn select_node(snapshot: &Snapshot, selector: &str) -> anyhow::Result<NodeId> {
    let known = |id: NodeId| -> anyhow::Result<NodeId> {
        if snapshot.index().contains_id(id) {
            Ok(id)
        } else {
            Err(ResolveError::UnknownId(id).into())
        }
    };

    if let Some(raw) = selector.strip_prefix('#') {
        let id = raw
            .parse::<NodeId>()
            .with_context(|| format!("{selector} is not a valid #ID"))?;
        return known(id);
    }

    let by_path = snapshot.find(Path::new(selector)).map(|n| n.id);
    match (by_path, selector.parse::<NodeId>()) {
        (Some(path_id), Ok(id)) if path_id != id && snapshot.index().contains_id(id) => Err(
            anyhow!(
                "{selector} matches both directory [{path_id}] and id {id}; \
                 use #{id} for the id or ./{selector} for the directory"
            ),
        ),
        (Some(path_id), _) => Ok(path_id),
        (None, Ok(id)) => known(id),
        (None, Err(_)) => Err(anyhow!("{selector} is not a scanned directory")),
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Scanner::default())
    }
}
