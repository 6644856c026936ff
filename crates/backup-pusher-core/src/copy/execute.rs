/// Plan execution: copies every included directory's own files.
///
/// Each included directory is copied non-recursively: the target directory
/// is created and the regular files directly inside the source are copied
/// into it. Because every non-excluded directory is in the plan, the union
/// reproduces the source tree minus the excluded subtrees.
///
/// Failures on individual files or directories are recorded on the report
/// and logged; they never abort the remaining work.
use super::plan::CopyPlan;
use crate::error::CopyError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single failed copy step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of executing a [`CopyPlan`].
#[derive(Debug, Clone)]
pub struct CopyReport {
    pub dirs_copied: u64,
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub failures: Vec<CopyFailure>,
    pub dry_run: bool,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl CopyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Execute `plan`. With `dry_run`, nothing is written but the report counts
/// what would have been copied.
pub fn execute(plan: &CopyPlan, dry_run: bool) -> Result<CopyReport, CopyError> {
    plan.validate()?;

    let mut report = CopyReport {
        dirs_copied: 0,
        files_copied: 0,
        bytes_copied: 0,
        failures: Vec::new(),
        dry_run,
        started: Utc::now(),
        finished: Utc::now(),
    };
    info!(
        "Copying {} directories from {} to {}{}",
        plan.include.len(),
        plan.source_root.display(),
        plan.destination,
        if dry_run { " (dry run)" } else { "" }
    );

    for source_dir in &plan.include {
        let target_dir = plan.target_for(source_dir)?;
        if let Err(err) = copy_directory_files(source_dir, &target_dir, dry_run, &mut report) {
            warn!("Failed to copy {}: {err}", source_dir.display());
            report.failures.push(CopyFailure {
                path: source_dir.clone(),
                message: err.to_string(),
            });
            continue;
        }
        report.dirs_copied += 1;
    }

    report.finished = Utc::now();
    info!(
        "Copy finished: {} dirs, {} files, {} bytes, {} failures",
        report.dirs_copied,
        report.files_copied,
        report.bytes_copied,
        report.failures.len()
    );
    Ok(report)
}

/// Copy the regular files directly inside `source_dir` into `target_dir`.
///
/// Errors creating the target or listing the source are returned; per-file
/// errors are pushed onto `report`.
fn copy_directory_files(
    source_dir: &Path,
    target_dir: &Path,
    dry_run: bool,
    report: &mut CopyReport,
) -> std::io::Result<()> {
    let entries = fs::read_dir(source_dir)?;
    if !dry_run {
        fs::create_dir_all(target_dir)?;
    }

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                report.failures.push(CopyFailure {
                    path: source_dir.to_path_buf(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        // `DirEntry::file_type` does not follow symlinks, so links are skipped.
        match entry.file_type() {
            Ok(ft) if ft.is_file() => {}
            Ok(_) => continue,
            Err(err) => {
                report.failures.push(CopyFailure {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        }

        let target = target_dir.join(entry.file_name());
        let copied = if dry_run {
            entry.metadata().map(|m| m.len())
        } else {
            fs::copy(&path, &target)
        };
        match copied {
            Ok(bytes) => {
                debug!("Copied {} -> {}", path.display(), target.display());
                report.files_copied += 1;
                report.bytes_copied += bytes;
            }
            Err(err) => {
                warn!("Failed to copy {}: {err}", path.display());
                report.failures.push(CopyFailure {
                    path,
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(())
}
