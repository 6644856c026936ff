/// Scan progress reporting: lightweight messages sent from the scanner to
/// whoever holds the receiving end of a crossbeam channel.
use std::time::Duration;

/// Progress updates emitted while a scan runs.
///
/// Delivery is best-effort: the scanner uses `try_send`, so a full channel
/// drops messages instead of stalling the walk. Warnings are also kept on
/// the finished [`Snapshot`](crate::snapshot::Snapshot), so nothing is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        files_found: u64,
        dirs_found: u64,
        total_size: u64,
        current_path: String,
    },
    /// A directory or file could not be read; the walk continues.
    Warning { path: String, message: String },
    /// Walk and aggregation finished.
    Complete {
        duration: Duration,
        dirs_found: u64,
        warning_count: u64,
    },
}
