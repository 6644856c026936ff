/// Data model for one scan: directory nodes, the path index and the
/// parent/child adjacency.
pub mod directory_node;
pub mod family_tree;
pub mod path_index;
pub mod size;

pub use directory_node::{DirectoryNode, NodeId};
pub use family_tree::FamilyTree;
pub use path_index::PathIndex;
