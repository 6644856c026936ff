/// Directory discovery using `jwalk`.
///
/// One pass over the tree assigns every directory an id, records its parent
/// id, and tallies the files directly inside each directory. Aggregates are
/// filled in afterwards by [`aggregate`](super::aggregate).
///
/// Symbolic links are skipped entirely: a link to a directory is neither
/// recorded nor descended into, and a link to a file is not counted.
use super::progress::ScanProgress;
use super::{ScanOptions, PROGRESS_INTERVAL};
use crate::error::{ScanError, ScanWarning};
use crate::model::{DirectoryNode, NodeId, PathIndex};
use crossbeam_channel::Sender;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Raw result of the discovery pass, before aggregation.
#[derive(Debug)]
pub struct Discovery {
    pub nodes: Vec<DirectoryNode>,
    pub index: PathIndex,
    pub warnings: Vec<ScanWarning>,
    pub files_found: u64,
}

/// Build a `jwalk` walker configured from `options`.
pub(crate) fn walker(root: &Path, options: &ScanOptions) -> jwalk::WalkDir {
    let parallelism = if options.threads <= 1 {
        jwalk::Parallelism::Serial
    } else {
        jwalk::Parallelism::RayonNewPool(options.threads)
    };
    jwalk::WalkDir::new(root)
        .skip_hidden(options.skip_hidden)
        .follow_links(false)
        .sort(true)
        .parallelism(parallelism)
}

/// Walk `root` and discover every directory beneath it.
///
/// `root` must already be validated as an existing directory.
pub fn discover(
    root: &Path,
    options: &ScanOptions,
    progress_tx: Option<&Sender<ScanProgress>>,
) -> Result<Discovery, ScanError> {
    let mut index = PathIndex::with_capacity(1_024);
    let mut nodes: Vec<DirectoryNode> = Vec::with_capacity(1_024);
    let mut warnings: Vec<ScanWarning> = Vec::new();
    let mut warned: HashSet<PathBuf> = HashSet::new();

    let root_id = index.assign(root)?;
    nodes.push(DirectoryNode::new(root_id, root.to_path_buf(), None));

    let mut files_found: u64 = 0;
    let mut total_size: u64 = 0;
    let mut update_counter: u64 = 0;

    for entry_result in walker(root, options) {
        update_counter += 1;

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                // jwalk errors are typically access-denied on a directory read.
                // The directory itself is already a node; only its contents are lost.
                let err_path = err.path().map(Path::to_path_buf);
                if let Some(p) = &err_path {
                    if !warned.insert(p.clone()) {
                        continue;
                    }
                }
                let warning = ScanWarning {
                    path: err_path,
                    message: err.to_string(),
                };
                report_warning(progress_tx, &warning);
                warnings.push(warning);
                continue;
            }
        };

        let path = entry.path();

        // jwalk attaches a failed `read_dir` to the directory entry itself.
        if let Some(err) = &entry.read_children_error {
            if warned.insert(path.clone()) {
                let warning = ScanWarning {
                    path: Some(path.clone()),
                    message: err.to_string(),
                };
                report_warning(progress_tx, &warning);
                warnings.push(warning);
            }
        }

        if path == root {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!("Skipping symlink {}", path.display());
            continue;
        }

        let parent_path = match path.parent() {
            Some(p) => p.to_path_buf(),
            None => continue,
        };
        let parent_id = match index.id_of(&parent_path) {
            Ok(id) => id,
            Err(_) => ensure_ancestors(&mut index, &mut nodes, &parent_path, root)?,
        };

        if file_type.is_dir() {
            let id = index.assign(path.clone())?;
            nodes.push(DirectoryNode::new(id, path, Some(parent_id)));
        } else {
            let size = match std::fs::symlink_metadata(&path) {
                Ok(meta) => meta.len(),
                Err(err) => {
                    let warning = ScanWarning {
                        path: Some(path),
                        message: err.to_string(),
                    };
                    report_warning(progress_tx, &warning);
                    warnings.push(warning);
                    continue;
                }
            };
            let parent = &mut nodes[parent_id.idx()];
            parent.own_size_bytes += size;
            parent.own_file_count += 1;
            files_found += 1;
            total_size += size;
        }

        if update_counter.is_multiple_of(PROGRESS_INTERVAL) {
            if let Some(tx) = progress_tx {
                let _ = tx.try_send(ScanProgress::Update {
                    files_found,
                    dirs_found: nodes.len() as u64,
                    total_size,
                    current_path: path_display(&parent_path),
                });
            }
        }
    }

    Ok(Discovery {
        nodes,
        index,
        warnings,
        files_found,
    })
}

/// Register any ancestors of `target` missing from the index, outermost
/// first, and return the id of `target` itself.
///
/// Only reached if the walker yields an entry before its parent directory,
/// which `jwalk` does not do in practice. Keeps the parent-before-child id
/// ordering intact regardless.
fn ensure_ancestors(
    index: &mut PathIndex,
    nodes: &mut Vec<DirectoryNode>,
    target: &Path,
    root: &Path,
) -> Result<NodeId, ScanError> {
    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = target.to_path_buf();

    while !index.contains_path(&current) && current != root {
        missing.push(current.clone());
        match current.parent() {
            Some(p) => current = p.to_path_buf(),
            None => break,
        }
    }

    let mut parent_id = index.id_of(&current).unwrap_or(NodeId::ROOT);

    for ancestor in missing.into_iter().rev() {
        warn!("Walker yielded {} before its parent", ancestor.display());
        let id = index.assign(ancestor.clone())?;
        nodes.push(DirectoryNode::new(id, ancestor, Some(parent_id)));
        parent_id = id;
    }

    Ok(parent_id)
}

fn report_warning(progress_tx: Option<&Sender<ScanProgress>>, warning: &ScanWarning) {
    warn!("Skipping unreadable entry: {warning}");
    if let Some(tx) = progress_tx {
        let _ = tx.try_send(ScanProgress::Warning {
            path: warning
                .path
                .as_deref()
                .map(path_display)
                .unwrap_or_default(),
            message: warning.message.clone(),
        });
    }
}

fn path_display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parents_get_smaller_ids() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b/c")).unwrap();
        fs::create_dir_all(tmp.path().join("d")).unwrap();

        let found = discover(tmp.path(), &ScanOptions::serial(), None).unwrap();
        assert_eq!(found.nodes.len(), 5);
        for node in &found.nodes[1..] {
            let parent = node.parent.expect("non-root must have a parent");
            assert!(parent < node.id);
        }
    }

    #[test]
    fn test_own_counts_only_direct_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("top.bin"), [0u8; 10]).unwrap();
        fs::write(tmp.path().join("sub/inner.bin"), [0u8; 5]).unwrap();

        let found = discover(tmp.path(), &ScanOptions::serial(), None).unwrap();
        let root = &found.nodes[0];
        assert_eq!(root.own_file_count, 1);
        assert_eq!(root.own_size_bytes, 10);
        assert_eq!(found.files_found, 2);
    }

    #[test]
    fn test_ensure_ancestors_fills_gap() {
        let root = Path::new("/r");
        let mut index = PathIndex::new();
        let mut nodes = vec![DirectoryNode::new(index.assign(root).unwrap(), root.into(), None)];

        let id = ensure_ancestors(&mut index, &mut nodes, Path::new("/r/x/y"), root).unwrap();
        assert_eq!(id, NodeId(2));
        assert_eq!(nodes[1].path, PathBuf::from("/r/x"));
        assert_eq!(nodes[1].parent, Some(NodeId::ROOT));
        assert_eq!(nodes[2].parent, Some(NodeId(1)));
    }
}
