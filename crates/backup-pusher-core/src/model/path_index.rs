/// Bidirectional path ↔ id index for one scan.
///
/// Ids are handed out sequentially in discovery order and never reused, so
/// the reverse direction is a plain `Vec` indexed by [`NodeId`].
use super::directory_node::NodeId;
use crate::error::IndexError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    by_path: HashMap<PathBuf, NodeId>,
    by_id: Vec<PathBuf>,
}

impl PathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with pre-allocated capacity for `estimated_dirs` paths.
    pub fn with_capacity(estimated_dirs: usize) -> Self {
        Self {
            by_path: HashMap::with_capacity(estimated_dirs),
            by_id: Vec::with_capacity(estimated_dirs),
        }
    }

    /// Allocate the next sequential id for a path not seen before.
    pub fn assign(&mut self, path: impl Into<PathBuf>) -> Result<NodeId, IndexError> {
        let path = path.into();
        if self.by_path.contains_key(&path) {
            return Err(IndexError::DuplicatePath(path));
        }
        let id = NodeId::new(self.by_id.len());
        self.by_path.insert(path.clone(), id);
        self.by_id.push(path);
        Ok(id)
    }

    pub fn id_of(&self, path: &Path) -> Result<NodeId, IndexError> {
        self.by_path
            .get(path)
            .copied()
            .ok_or_else(|| IndexError::PathNotFound(path.to_path_buf()))
    }

    pub fn path_of(&self, id: NodeId) -> Result<&Path, IndexError> {
        self.by_id
            .get(id.idx())
            .map(PathBuf::as_path)
            .ok_or(IndexError::IdNotFound(id))
    }

    #[inline]
    pub fn contains_id(&self, id: NodeId) -> bool {
        id.idx() < self.by_id.len()
    }

    #[inline]
    pub fn contains_path(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    /// Iterate `(id, path)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Path)> + '_ {
        self.by_id
            .iter()
            .enumerate()
            .map(|(i, p)| (NodeId::new(i), p.as_path()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
