/// Aggregate size and file-count computation.
///
/// Two strategies produce identical numbers:
///
/// - [`aggregate_bottom_up`]: O(n) roll-up of the per-directory tallies
///   gathered during discovery. Parents always have smaller ids than their
///   children, so a reverse pass visits every child before its parent with
///   no recursion and no stack.
/// - [`aggregate_per_node`]: an independent recursive walk of each
///   directory's own subtree, fanned out over a rayon pool. Quadratic in
///   nesting depth, but every node is self-contained, which makes it a
///   useful cross-check against the roll-up.
use super::walk::walker;
use super::ScanOptions;
use crate::model::DirectoryNode;
use rayon::prelude::*;
use std::path::Path;
use tracing::warn;

/// Sum each directory's own files plus its children's aggregates.
///
/// Safe to call repeatedly: aggregates are reset from the own-file tallies
/// before each pass.
pub fn aggregate_bottom_up(nodes: &mut [DirectoryNode]) {
    for node in nodes.iter_mut() {
        node.aggregate_size_bytes = node.own_size_bytes;
        node.file_count = node.own_file_count;
    }

    // Reverse pass: children before parents.
    for i in (0..nodes.len()).rev() {
        let (size, count, parent) = {
            let node = &nodes[i];
            (node.aggregate_size_bytes, node.file_count, node.parent)
        };
        if let Some(parent_id) = parent {
            debug_assert!(parent_id.idx() < i, "parent must precede child");
            let parent = &mut nodes[parent_id.idx()];
            parent.aggregate_size_bytes += size;
            parent.file_count += count;
        }
    }
}

/// Recompute every node's aggregates by walking its subtree independently.
///
/// Runs on a dedicated rayon pool sized by `options.threads`; each per-node
/// walk is serial so pools do not nest.
pub fn aggregate_per_node(nodes: &mut [DirectoryNode], options: &ScanOptions) {
    let serial = ScanOptions {
        threads: 1,
        ..options.clone()
    };
    let work = |nodes: &mut [DirectoryNode]| {
        nodes.par_iter_mut().for_each(|node| {
            let (bytes, count) = subtree_totals(&node.path, &serial);
            node.aggregate_size_bytes = bytes;
            node.file_count = count;
        });
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .thread_name(|i| format!("backup-pusher-aggregate-{i}"))
        .build()
    {
        Ok(pool) => pool.install(|| work(nodes)),
        Err(err) => {
            warn!("Could not build aggregation pool ({err}); using the global pool");
            work(nodes);
        }
    }
}

/// Total bytes and file count of every regular file under `dir`.
///
/// Entries that cannot be read are skipped; discovery has already reported
/// them as warnings.
pub fn subtree_totals(dir: &Path, options: &ScanOptions) -> (u64, u64) {
    let mut bytes: u64 = 0;
    let mut count: u64 = 0;
    for entry in walker(dir, options).into_iter().flatten() {
        let file_type = entry.file_type();
        if file_type.is_dir() || file_type.is_symlink() {
            continue;
        }
        if let Ok(meta) = std::fs::symlink_metadata(entry.path()) {
            bytes += meta.len();
            count += 1;
        }
    }
    (bytes, count)
}
