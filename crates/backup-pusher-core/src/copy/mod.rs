/// Copy collaborator: consumes a resolution and writes the backup.
///
/// Split into the persisted [`plan`] and its [`execute`]ion so the include
/// list can be reviewed between the two.
pub mod execute;
pub mod plan;

pub use execute::{execute, CopyFailure, CopyReport};
pub use plan::CopyPlan;
