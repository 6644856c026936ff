/// Backup Pusher CLI: argument parsing, session state and subcommands.
///
/// The binary is a thin wrapper around [`run`]; all state transitions live
/// in [`state::Session`] so they can be tested without a terminal.
pub mod args;
pub mod commands;
pub mod state;

pub use args::Cli;
pub use commands::run;
pub use state::{Session, SessionPhase};
