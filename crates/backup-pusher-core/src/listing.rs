/// Tree listing and CSV export of a snapshot.
///
/// The listing flattens the tree depth-first in discovery order, one row per
/// directory, with the "Size (MB)" and "Files" columns the selection view
/// shows next to each name.
use crate::error::CopyError;
use crate::model::{size::whole_megabytes, NodeId};
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::io::Write;

/// One row of a flattened tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: NodeId,
    /// Nesting depth (0 = root).
    pub depth: u16,
    pub name: String,
    pub size_mb: u64,
    pub file_count: u64,
}

/// Flatten `snapshot` depth-first, stopping below `max_depth` if given.
///
/// Uses an explicit stack; children are emitted in discovery order.
pub fn tree_listing(snapshot: &Snapshot, max_depth: Option<u16>) -> Vec<ListingRow> {
    let mut rows = Vec::with_capacity(snapshot.len());
    let tree = snapshot.tree();
    let mut stack: Vec<(NodeId, u16)> = tree.roots().iter().rev().map(|&r| (r, 0)).collect();

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = snapshot.node(id) else {
            continue;
        };
        rows.push(ListingRow {
            id,
            depth,
            name: node.name.to_string(),
            size_mb: node.size_mb(),
            file_count: node.file_count,
        });
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        if let Ok(children) = tree.children(id) {
            stack.extend(children.iter().rev().map(|&c| (c, depth + 1)));
        }
    }
    rows
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: u32,
    parent_id: Option<u32>,
    path: &'a str,
    size_bytes: u64,
    size_mb: u64,
    file_count: u64,
}

/// Write every node as CSV: `id,parent_id,path,size_bytes,size_mb,file_count`.
///
/// The root's `parent_id` column is empty.
pub fn export_csv<W: Write>(snapshot: &Snapshot, writer: W) -> Result<(), CopyError> {
    let mut csv = csv::Writer::from_writer(writer);
    for node in snapshot.nodes() {
        let path = node.path.to_string_lossy();
        csv.serialize(CsvRow {
            id: node.id.0,
            parent_id: node.parent.map(|p| p.0),
            path: &path,
            size_bytes: node.aggregate_size_bytes,
            size_mb: whole_megabytes(node.aggregate_size_bytes),
            file_count: node.file_count,
        })?;
    }
    csv.flush().map_err(|source| CopyError::Io {
        path: "<csv output>".into(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DirectoryNode, PathIndex};
    use std::path::PathBuf;
    use std::time::Duration;

    /// root -> a -> c
    ///      -> b
    fn snapshot() -> Snapshot {
        let layout: [(&str, Option<u32>, u64); 4] = [
            ("/r", None, 3_500_000),
            ("/r/a", Some(0), 2_000_000),
            ("/r/b", Some(0), 1_500_000),
            ("/r/a/c", Some(1), 999_999),
        ];
        let mut index = PathIndex::new();
        let mut nodes = Vec::new();
        for (path, parent, size) in layout {
            let id = index.assign(path).unwrap();
            let mut node = DirectoryNode::new(id, PathBuf::from(path), parent.map(NodeId));
            node.aggregate_size_bytes = size;
            node.file_count = 1;
            nodes.push(node);
        }
        Snapshot::from_parts("/r".into(), nodes, index, Vec::new(), Duration::ZERO)
    }

    #[test]
    fn test_listing_is_depth_first() {
        let rows = tree_listing(&snapshot(), None);
        let order: Vec<(&str, u16)> = rows.iter().map(|r| (r.name.as_str(), r.depth)).collect();
        assert_eq!(order, vec![("r", 0), ("a", 1), ("c", 2), ("b", 1)]);
        assert_eq!(rows[0].size_mb, 3);
        assert_eq!(rows[2].size_mb, 0);
    }

    #[test]
    fn test_listing_respects_max_depth() {
        let rows = tree_listing(&snapshot(), Some(1));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.depth <= 1));
    }

    #[test]
    fn test_export_csv() {
        let mut out = Vec::new();
        export_csv(&snapshot(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,parent_id,path,size_bytes,size_mb,file_count")
        );
        assert_eq!(lines.next(), Some("0,,/r,3500000,3,1"));
        assert_eq!(lines.next(), Some("1,0,/r/a,2000000,2,1"));
    }
}
