/// Command-line arguments, parsed with `clap` derive.
use backup_pusher_core::{AggregationMode, ScanOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Backup Pusher - copy a directory tree, skipping the subtrees you exclude
#[derive(Parser, Debug)]
#[command(name = "backup-pusher")]
#[command(about = "Copy a directory tree to a backup destination, skipping excluded subtrees")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Worker threads for scanning (defaults to the number of CPUs)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Skip dot-files and dot-directories while scanning
    #[arg(long, global = true)]
    pub skip_hidden: bool,

    /// Recompute every directory's totals with its own walk
    #[arg(long, global = true)]
    pub per_node: bool,

    /// Log scan progress while walking
    #[arg(long, global = true)]
    pub progress: bool,
}

impl GlobalArgs {
    pub fn scan_options(&self) -> ScanOptions {
        let defaults = ScanOptions::default();
        ScanOptions {
            aggregation: if self.per_node {
                AggregationMode::PerNodeWalk
            } else {
                AggregationMode::BottomUp
            },
            threads: self.threads.unwrap_or(defaults.threads).max(1),
            skip_hidden: self.skip_hidden,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the directory tree with ids, sizes and file counts
    Scan(ScanArgs),
    /// Resolve exclusions and write a copy plan without copying
    Plan(PlanArgs),
    /// Resolve exclusions and copy to the destination
    Copy(CopyArgs),
    /// Execute a previously written copy plan
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory to inspect
    pub root: PathBuf,

    /// Only list directories up to this depth (0 = root only)
    #[arg(long)]
    pub max_depth: Option<u16>,

    /// Also write every directory as CSV to this file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Root, destination and exclusions shared by `plan` and `copy`.
#[derive(Args, Debug)]
pub struct SelectionArgs {
    /// Root directory to back up
    pub root: PathBuf,

    /// Backup destination, used verbatim
    pub destination: String,

    /// Directory to exclude with everything under it: `#ID` with an id from
    /// `scan`, or a path (absolute or relative to ROOT). A bare number is
    /// accepted when it is not also a different directory's name. Repeatable.
    #[arg(short, long = "exclude", value_name = "#ID|PATH")]
    pub excludes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Where to write the plan
    #[arg(short, long, default_value = "backup-plan.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Report what would be copied without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Plan file written by `plan`
    pub plan: PathBuf,

    /// Report what would be copied without writing anything
    #[arg(long)]
    pub dry_run: bool,
}
