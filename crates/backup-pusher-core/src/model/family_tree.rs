/// Parent → children adjacency over a scan's directories.
///
/// Children are kept in the order they were discovered. Descendant queries
/// use an explicit worklist, so very deep trees cannot exhaust the stack.
use super::directory_node::{DirectoryNode, NodeId};
use crate::error::TreeError;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    /// `children[id]` lists the direct children of `id`.
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl FamilyTree {
    /// Build adjacency from a node sequence whose ids are `0..nodes.len()`.
    ///
    /// A node whose parent id is outside the node set is treated as a root so
    /// that the returned tree never references missing slots.
    pub fn build(nodes: &[DirectoryNode]) -> Self {
        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for node in nodes {
            match node.parent {
                Some(parent) if parent.idx() < children.len() => {
                    children[parent.idx()].push(node.id)
                }
                _ => roots.push(node.id),
            }
        }
        Self { children, roots }
    }

    /// Nodes with no parent. A well-formed scan has exactly one: id 0.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct children of `id`, in discovery order.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        self.children
            .get(id.idx())
            .map(Vec::as_slice)
            .ok_or(TreeError::UnknownId(id))
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.idx() < self.children.len()
    }

    /// Transitive closure of children under `id`, not including `id` itself.
    ///
    /// Reaching `id` again, or any node a second time, means the adjacency is
    /// not a tree and fails with [`TreeError::CycleDetected`].
    pub fn descendants(&self, id: NodeId) -> Result<BTreeSet<NodeId>, TreeError> {
        let mut found = BTreeSet::new();
        let mut stack: Vec<NodeId> = self.children(id)?.to_vec();

        while let Some(current) = stack.pop() {
            if current == id || !found.insert(current) {
                return Err(TreeError::CycleDetected {
                    start: id,
                    revisited: current,
                });
            }
            stack.extend_from_slice(self.children(current)?);
        }

        Ok(found)
    }

    /// Number of slots (directories) the tree covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn node(id: u32, path: &str, parent: Option<u32>) -> DirectoryNode {
        DirectoryNode::new(NodeId(id), PathBuf::from(path), parent.map(NodeId))
    }

    /// Append a raw parent/child edge, bypassing `build`, so malformed
    /// adjacency can be constructed.
    fn add_child(tree: &mut FamilyTree, parent: NodeId, child: NodeId) {
        let needed = parent.idx().max(child.idx()) + 1;
        if tree.children.len() < needed {
            tree.children.resize_with(needed, Vec::new);
        }
        tree.children[parent.idx()].push(child);
    }

    /// root(0) -> a(1) -> c(3)
    ///         -> b(2)
    fn sample() -> FamilyTree {
        FamilyTree::build(&[
            node(0, "/r", None),
            node(1, "/r/a", Some(0)),
            node(2, "/r/b", Some(0)),
            node(3, "/r/a/c", Some(1)),
        ])
    }

    #[test]
    fn test_build_adjacency() {
        let tree = sample();
        assert_eq!(tree.roots(), &[NodeId(0)]);
        assert_eq!(tree.children(NodeId(0)).unwrap(), &[NodeId(1), NodeId(2)]);
        assert_eq!(tree.children(NodeId(1)).unwrap(), &[NodeId(3)]);
        assert!(tree.children(NodeId(3)).unwrap().is_empty());
    }

    #[test]
    fn test_every_non_root_has_exactly_one_parent() {
        let tree = sample();
        let mut seen = vec![0usize; tree.len()];
        for i in 0..tree.len() {
            for child in tree.children(NodeId::new(i)).unwrap() {
                seen[child.idx()] += 1;
            }
        }
        assert_eq!(seen, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_descendants() {
        let tree = sample();
        let all: BTreeSet<_> = [NodeId(1), NodeId(2), NodeId(3)].into_iter().collect();
        assert_eq!(tree.descendants(NodeId(0)).unwrap(), all);
        assert_eq!(
            tree.descendants(NodeId(1)).unwrap(),
            [NodeId(3)].into_iter().collect()
        );
        assert!(tree.descendants(NodeId(2)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id() {
        let tree = sample();
        assert_eq!(
            tree.descendants(NodeId(9)),
            Err(TreeError::UnknownId(NodeId(9)))
        );
    }

    #[test]
    fn test_cycle_is_detected_not_looped() {
        let mut tree = FamilyTree::default();
        add_child(&mut tree, NodeId(0), NodeId(1));
        add_child(&mut tree, NodeId(1), NodeId(2));
        add_child(&mut tree, NodeId(2), NodeId(1));
        assert!(matches!(
            tree.descendants(NodeId(0)),
            Err(TreeError::CycleDetected { start: NodeId(0), .. })
        ));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut tree = FamilyTree::default();
        for i in 0..100_000u32 {
            add_child(&mut tree, NodeId(i), NodeId(i + 1));
        }
        assert_eq!(tree.descendants(NodeId(0)).unwrap().len(), 100_000);
    }
}
