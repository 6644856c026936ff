/// Exclusion resolution: turns a set of marked directories into the set of
/// directories to copy.
///
/// Excluding a directory excludes its whole subtree. The computation is pure:
/// it reads a snapshot's index and tree and never mutates them.
use crate::error::ResolveError;
use crate::model::{FamilyTree, NodeId, PathIndex};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

/// The set of node ids the user marked for exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRequest {
    ids: BTreeSet<NodeId>,
}

impl ExclusionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id`. Returns `false` if it was already marked.
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.ids.insert(id)
    }

    /// Unmark `id`. Returns `false` if it was not marked.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.ids.remove(&id)
    }

    /// Flip the mark on `id` and return whether it is now marked.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<NodeId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `true` for the empty set and for exactly `{root}`; both mean
    /// "include everything".
    pub fn includes_everything(&self) -> bool {
        match self.ids.len() {
            0 => true,
            1 => self.ids.contains(&NodeId::ROOT),
            _ => false,
        }
    }
}

impl FromIterator<NodeId> for ExclusionRequest {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExclusionRequest {
    type Item = &'a NodeId;
    type IntoIter = std::collections::btree_set::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Compute the directories to include.
///
/// 1. If `excluded` is empty, or is exactly `{root}`, `all_paths` is returned
///    unchanged. **Selecting only the root means "include everything", not
///    "exclude everything".** This mirrors the selection widget, where the
///    root row is how a user says "no exclusions". If the root is marked
///    together with other ids it is a genuine exclusion and removes every
///    path.
/// 2. Every marked id is removed together with all of its descendants.
/// 3. The remaining paths of `all_paths` are returned.
///
/// Every id in `excluded` is validated first: an id absent from `index`
/// fails with [`ResolveError::UnknownId`] and nothing else is computed.
///
/// The result is idempotent (feeding it back in with the same request yields
/// the same set) and monotonic (more exclusions never add paths). Marking
/// both a directory and one of its ancestors is redundant but harmless.
pub fn resolve(
    all_paths: &BTreeSet<PathBuf>,
    excluded: &ExclusionRequest,
    tree: &FamilyTree,
    index: &PathIndex,
) -> Result<BTreeSet<PathBuf>, ResolveError> {
    if let Some(&unknown) = excluded.ids.iter().find(|&&id| !index.contains_id(id)) {
        return Err(ResolveError::UnknownId(unknown));
    }

    if excluded.includes_everything() {
        return Ok(all_paths.clone());
    }

    let mut to_remove: BTreeSet<NodeId> = excluded.ids.clone();
    for &id in &excluded.ids {
        to_remove.extend(tree.descendants(id)?);
    }

    let mut remove_paths = BTreeSet::new();
    for &id in &to_remove {
        remove_paths.insert(index.path_of(id)?.to_path_buf());
    }

    let included: BTreeSet<PathBuf> = all_paths.difference(&remove_paths).cloned().collect();
    debug!(
        "Resolved {} exclusions: removed {} of {} directories",
        excluded.len(),
        all_paths.len() - included.len(),
        all_paths.len()
    );
    Ok(included)
}
