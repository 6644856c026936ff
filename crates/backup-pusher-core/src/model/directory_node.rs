/// A single discovered directory in a scan snapshot.
///
/// Nodes are stored in a flat `Vec<DirectoryNode>` indexed by [`NodeId`].
/// The parent relation is captured once at discovery time as an id rather
/// than re-derived from path strings later.
use compact_str::CompactString;
use std::fmt;
use std::path::PathBuf;

/// Identifier of a directory within one scan.
///
/// Assigned in discovery order starting at 0. Uses `u32` to keep nodes
/// small, which is more than enough for any real directory tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The scan root always receives the first id.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new `NodeId` from a `usize`, panicking in debug builds if it
    /// exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeId overflow");
        Self(index as u32)
    }

    /// Return the id as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(NodeId)
    }
}

/// One directory and its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub id: NodeId,

    /// Absolute path as discovered by the walker. Unique within a snapshot.
    pub path: PathBuf,

    /// Display name: last path component, or the full path for roots such
    /// as `/` or `C:\` that have no file name.
    pub name: CompactString,

    /// `None` only for the root.
    pub parent: Option<NodeId>,

    /// Bytes of files directly inside this directory.
    pub own_size_bytes: u64,

    /// Files directly inside this directory.
    pub own_file_count: u64,

    /// Bytes of every file under this directory, recursively.
    pub aggregate_size_bytes: u64,

    /// Number of files under this directory, recursively.
    pub file_count: u64,
}

impl DirectoryNode {
    /// Create a directory node with zeroed statistics.
    pub fn new(id: NodeId, path: PathBuf, parent: Option<NodeId>) -> Self {
        let name = display_name(&path);
        Self {
            id,
            path,
            name,
            parent,
            own_size_bytes: 0,
            own_file_count: 0,
            aggregate_size_bytes: 0,
            file_count: 0,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Aggregate size in whole megabytes, for display.
    #[inline]
    pub fn size_mb(&self) -> u64 {
        super::size::whole_megabytes(self.aggregate_size_bytes)
    }
}

/// Derive a display name for a directory path.
fn display_name(path: &std::path::Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}
