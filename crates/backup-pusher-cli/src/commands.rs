/// Subcommand implementations.
///
/// Every command writes its human-readable output to the supplied writer so
/// tests can capture it; logging goes through `tracing` separately.
use crate::args::{ApplyArgs, Cli, Commands, CopyArgs, PlanArgs, ScanArgs, SelectionArgs};
use crate::state::Session;
use anyhow::Context;
use backup_pusher_core::copy::{self, CopyPlan, CopyReport};
use backup_pusher_core::listing::{export_csv, tree_listing};
use backup_pusher_core::model::size::{format_count, format_size};
use backup_pusher_core::scanner::Scanner;
use backup_pusher_core::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Run the parsed command line.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    let mut session = Session::new(Scanner::new(cli.global.scan_options()));
    session.report_progress = cli.global.progress;

    match cli.command {
        Commands::Scan(args) => scan(&mut session, args, out),
        Commands::Plan(args) => plan(&mut session, args, out),
        Commands::Copy(args) => copy_now(&mut session, args, out),
        Commands::Apply(args) => apply(args, out),
    }
}

fn scan<W: Write>(session: &mut Session, args: ScanArgs, out: &mut W) -> anyhow::Result<()> {
    let published = session.select_root(&args.root)?;
    let snapshot = &published.snapshot;

    print_tree(snapshot, args.max_depth, out)?;
    print_warnings(snapshot, out)?;

    if let Some(path) = args.csv {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        export_csv(snapshot, BufWriter::new(file))?;
        info!("Wrote CSV listing to {}", path.display());
    }
    Ok(())
}

fn plan<W: Write>(session: &mut Session, args: PlanArgs, out: &mut W) -> anyhow::Result<()> {
    select(session, &args.selection)?;
    let plan = session.plan(&args.selection.destination)?;
    plan.save(&args.output)?;

    writeln!(
        out,
        "Plan: {} of {} directories to {}",
        plan.include.len(),
        session.snapshot().map_or(0, |s| s.len()),
        plan.destination
    )?;
    for path in &plan.include {
        writeln!(out, "  {}", path.display())?;
    }
    writeln!(out, "Written to {}", args.output.display())?;
    Ok(())
}

fn copy_now<W: Write>(session: &mut Session, args: CopyArgs, out: &mut W) -> anyhow::Result<()> {
    select(session, &args.selection)?;
    let report = session.copy_to(&args.selection.destination, args.dry_run)?;
    print_report(report, out)
}

fn apply<W: Write>(args: ApplyArgs, out: &mut W) -> anyhow::Result<()> {
    let plan = CopyPlan::load(&args.plan)
        .with_context(|| format!("failed to load plan {}", args.plan.display()))?;
    let report = copy::execute(&plan, args.dry_run)?;
    print_report(&report, out)
}

/// Scan the selection's root and mark its exclusions.
fn select(session: &mut Session, selection: &SelectionArgs) -> anyhow::Result<()> {
    session.select_root(&selection.root)?;
    for selector in &selection.excludes {
        let id = session.exclude(selector)?;
        info!("Excluding [{id}] {selector}");
    }
    Ok(())
}

fn print_tree<W: Write>(
    snapshot: &Snapshot,
    max_depth: Option<u16>,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "{:>6}  {:>10}  {:>10}  NAME", "ID", "SIZE (MB)", "FILES")?;
    for row in tree_listing(snapshot, max_depth) {
        writeln!(
            out,
            "{:>6}  {:>10}  {:>10}  {}{}",
            row.id,
            row.size_mb,
            format_count(row.file_count),
            "  ".repeat(row.depth as usize),
            row.name
        )?;
    }
    writeln!(
        out,
        "{} directories, {} files, {}",
        format_count(snapshot.len() as u64),
        format_count(snapshot.total_files()),
        format_size(snapshot.total_size())
    )?;
    Ok(())
}

fn print_warnings<W: Write>(snapshot: &Snapshot, out: &mut W) -> anyhow::Result<()> {
    if snapshot.warnings().is_empty() {
        return Ok(());
    }
    writeln!(out, "{} entries could not be read:", snapshot.warnings().len())?;
    for warning in snapshot.warnings() {
        writeln!(out, "  {warning}")?;
    }
    Ok(())
}

fn print_report<W: Write>(report: &CopyReport, out: &mut W) -> anyhow::Result<()> {
    let verb = if report.dry_run { "Would copy" } else { "Copied" };
    writeln!(
        out,
        "{verb} {} directories, {} files, {} in {:.1}s",
        format_count(report.dirs_copied),
        format_count(report.files_copied),
        format_size(report.bytes_copied),
        (report.finished - report.started).num_milliseconds() as f64 / 1_000.0
    )?;
    if !report.failures.is_empty() {
        writeln!(out, "{} failures:", report.failures.len())?;
        for failure in &report.failures {
            writeln!(out, "  {}: {}", failure.path.display(), failure.message)?;
        }
    }
    Ok(())
}
