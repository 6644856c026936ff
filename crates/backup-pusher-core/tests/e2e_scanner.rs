/// End-to-end scanner integration tests.
///
/// These tests run the real `jwalk` discovery and both aggregation modes
/// against a real temporary filesystem, verifying ids, parent links,
/// aggregate sizes and file counts, and progress reporting.
use backup_pusher_core::scanner::progress::ScanProgress;
use backup_pusher_core::scanner::{progress_channel, AggregationMode, ScanOptions, Scanner};
use backup_pusher_core::{NodeId, ScanError, Snapshot};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Create a reproducible directory tree:
///
/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///     deep/
///       e.log (50 bytes)
///   beta/
///     c.png   (300 bytes)
///   gamma/    (empty)
///   d.zip     (400 bytes)
/// ```
///
/// Total file bytes: 1 050 across 5 files.
fn build_test_tree(root: &Path) {
    let alpha = root.join("alpha");
    let beta = root.join("beta");
    fs::create_dir_all(alpha.join("deep")).unwrap();
    fs::create_dir_all(&beta).unwrap();
    fs::create_dir_all(root.join("gamma")).unwrap();

    write_bytes(&alpha.join("a.txt"), 100);
    write_bytes(&alpha.join("b.rs"), 200);
    write_bytes(&alpha.join("deep").join("e.log"), 50);
    write_bytes(&beta.join("c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn scan_with(root: &Path, aggregation: AggregationMode, threads: usize) -> Snapshot {
    let options = ScanOptions {
        aggregation,
        threads,
        skip_hidden: false,
    };
    Scanner::new(options).scan(root).expect("scan must succeed")
}

fn node_by_name<'a>(snapshot: &'a Snapshot, name: &str) -> &'a backup_pusher_core::DirectoryNode {
    snapshot
        .nodes()
        .iter()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Every directory is discovered exactly once and the root is id 0.
#[test]
fn scan_discovers_all_directories() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    assert_eq!(snap.len(), 5, "root, alpha, deep, beta, gamma");
    assert_eq!(snap.nodes()[0].id, NodeId::ROOT);
    assert!(snap.nodes()[0].is_root());
    assert_eq!(
        snap.nodes().iter().filter(|n| n.parent.is_none()).count(),
        1,
        "exactly one root"
    );
}

/// `path → id` and `id → path` agree for every node.
#[test]
fn index_lookups_are_mutual_inverses() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    for node in snap.nodes() {
        assert_eq!(snap.index().id_of(&node.path).unwrap(), node.id);
        assert_eq!(snap.index().path_of(node.id).unwrap(), node.path.as_path());
    }
}

/// Root aggregates equal the sum over every file in the tree, and each node
/// equals its own files plus its children.
#[test]
fn aggregates_are_consistent() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    assert_eq!(snap.total_size(), 1_050);
    assert_eq!(snap.total_files(), 5);

    let alpha = node_by_name(&snap, "alpha");
    assert_eq!(alpha.aggregate_size_bytes, 350);
    assert_eq!(alpha.file_count, 3);
    assert_eq!(alpha.own_file_count, 2);
    assert_eq!(node_by_name(&snap, "gamma").file_count, 0);

    for node in snap.nodes() {
        let children = snap.tree().children(node.id).unwrap();
        let child_bytes: u64 = children
            .iter()
            .map(|c| snap.node(*c).unwrap().aggregate_size_bytes)
            .sum();
        let child_files: u64 = children.iter().map(|c| snap.node(*c).unwrap().file_count).sum();
        assert_eq!(node.aggregate_size_bytes, node.own_size_bytes + child_bytes);
        assert_eq!(node.file_count, node.own_file_count + child_files);
    }
}

/// The family tree lists every non-root node under exactly its recorded parent.
#[test]
fn family_tree_matches_parent_ids() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    for node in &snap.nodes()[1..] {
        let parent = node.parent.unwrap();
        assert_eq!(node.path.parent().unwrap(), snap.node(parent).unwrap().path);
        assert!(snap.tree().children(parent).unwrap().contains(&node.id));
    }
}

/// Per-node walks on a worker pool must agree exactly with the roll-up.
#[test]
fn aggregation_modes_agree() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let bottom_up = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    let per_node = scan_with(tmp.path(), AggregationMode::PerNodeWalk, 4);

    assert_eq!(bottom_up.len(), per_node.len());
    for (a, b) in bottom_up.nodes().iter().zip(per_node.nodes()) {
        assert_eq!(a.path, b.path);
        assert_eq!(a.aggregate_size_bytes, b.aggregate_size_bytes, "{}", a.path.display());
        assert_eq!(a.file_count, b.file_count, "{}", a.path.display());
    }
}

/// A parallel directory reader must produce the same ids as a serial one.
#[test]
fn ids_are_stable_across_parallelism() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let serial = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    let parallel = scan_with(tmp.path(), AggregationMode::BottomUp, 4);
    let ids = |s: &Snapshot| -> Vec<_> { s.nodes().iter().map(|n| (n.id, n.path.clone())).collect() };
    assert_eq!(ids(&serial), ids(&parallel));
}

/// An empty root yields exactly one node with zero totals.
#[test]
fn scan_empty_directory() {
    let tmp = TempDir::new().unwrap();

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.total_size(), 0);
    assert_eq!(snap.total_files(), 0);
    assert!(snap.warnings().is_empty());
}

#[test]
fn scan_rejects_missing_root() {
    let tmp = TempDir::new().unwrap();
    let err = Scanner::default()
        .scan(&tmp.path().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, ScanError::RootMissing(_)));
}

/// Hidden directories are kept by default and dropped with `skip_hidden`.
#[test]
fn skip_hidden_is_honoured() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".cache")).unwrap();
    write_bytes(&tmp.path().join(".cache").join("blob"), 10);

    let all = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    assert_eq!(all.len(), 2);
    assert_eq!(all.total_size(), 10);

    let options = ScanOptions {
        skip_hidden: true,
        ..ScanOptions::serial()
    };
    let visible = Scanner::new(options).scan(tmp.path()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible.total_size(), 0);
}

/// Symlinked directories are neither recorded nor descended into.
#[cfg(unix)]
#[test]
fn symlinked_directories_are_skipped() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    std::os::unix::fs::symlink(tmp.path().join("alpha"), tmp.path().join("alias")).unwrap();

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    assert_eq!(snap.len(), 5);
    assert_eq!(snap.total_size(), 1_050);
}

/// An unreadable subdirectory is reported as a warning and its siblings are
/// still scanned.
#[cfg(unix)]
#[test]
fn unreadable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let locked = tmp.path().join("beta");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe in that case.
    let readable_anyway = fs::read_dir(&locked).is_ok();

    let snap = scan_with(tmp.path(), AggregationMode::BottomUp, 1);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    if readable_anyway {
        return;
    }
    assert!(!snap.warnings().is_empty());
    assert_eq!(node_by_name(&snap, "beta").file_count, 0);
    assert_eq!(node_by_name(&snap, "alpha").aggregate_size_bytes, 350);
}

/// Progress messages end with `Complete` carrying the directory count.
#[test]
fn progress_ends_with_complete() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let (tx, rx) = progress_channel();
    let snap = Scanner::new(ScanOptions::serial())
        .with_progress(tx)
        .scan(tmp.path())
        .unwrap();

    let last = rx.try_iter().last().expect("at least one progress message");
    match last {
        ScanProgress::Complete {
            dirs_found,
            warning_count,
            ..
        } => {
            assert_eq!(dirs_found, snap.len() as u64);
            assert_eq!(warning_count, 0);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}
