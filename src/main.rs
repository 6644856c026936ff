//! Backup Pusher: copy a directory tree, skipping the subtrees you exclude.
//!
//! Thin binary entry point. All logic lives in the `backup-pusher-core`
//! and `backup-pusher-cli` crates.

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = backup_pusher_cli::Cli::parse();

    // Initialise structured logging on stderr so stdout stays clean for listings.
    let default_level = if cli.global.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Backup Pusher starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    backup_pusher_cli::run(cli, &mut out)
}
