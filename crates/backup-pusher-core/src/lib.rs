/// Backup Pusher Core: directory-tree model, scanner and exclusion resolver.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`model`]: Directory nodes, the path ↔ id index and the family tree.
/// - [`scanner`]: Root validation, `jwalk` discovery and size aggregation.
/// - [`snapshot`]: Immutable scan results and the versioned snapshot store.
/// - [`resolver`]: Subtree exclusion resolution.
/// - [`listing`]: Flattened tree listing and CSV export.
/// - [`copy`]: Copy plans and their execution.
/// - [`error`]: Error and warning types for every phase.
pub mod copy;
pub mod error;
pub mod listing;
pub mod model;
pub mod resolver;
pub mod scanner;
pub mod snapshot;

pub use error::{CopyError, IndexError, ResolveError, ScanError, ScanWarning, StoreError, TreeError};
pub use model::{DirectoryNode, FamilyTree, NodeId, PathIndex};
pub use resolver::{resolve, ExclusionRequest};
pub use scanner::{scan, AggregationMode, ScanOptions, Scanner};
pub use snapshot::{Snapshot, SnapshotStore, VersionedSnapshot};
