//! Status command implementation

use std::path::Path;

use colored::{ColoredString, Colorize};

use lineage_core::{BranchStatus, Reference, StatusReport, SyncEngine, SyncStatus};

use super::open;
use crate::error::Result;

/// Run the status command.
///
/// Prints one line per local branch; `--json` prints the report instead.
pub fn run_status(path: &Path, parent: bool, json: bool) -> Result<()> {
    let ctx = open(path)?;
    let reference = if parent {
        Reference::Parent
    } else {
        Reference::Remote
    };
    let report = SyncEngine::new(&ctx).report(reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &StatusReport) {
    println!(
        "{} Branch status against {}:",
        "=>".blue().bold(),
        report.reference.to_string().yellow()
    );

    for row in &report.branches {
        let marker = if report.current.as_deref() == Some(row.name.as_str()) {
            format!("  {} ", "*".green())
        } else {
            "    ".to_string()
        };
        println!("{marker}{:<30} {}", row.name, describe(row));
    }

    let count = report.out_of_sync();
    if count == 0 && report.errors().count() == 0 {
        println!("{} All branches are in sync.", "OK".green().bold());
    } else if count > 0 {
        println!(
            "{} {count} branch(es) out of sync; run {} to update them.",
            "!!".yellow().bold(),
            "lineage sync --all".cyan()
        );
    }
}

fn describe(row: &BranchStatus) -> String {
    if let Some(error) = &row.error {
        return error.red().to_string();
    }
    let Some(status) = row.status else {
        return String::new();
    };

    let mut text = paint(status).to_string();
    match (row.ahead, row.behind) {
        (Some(ahead), Some(behind)) if ahead > 0 || behind > 0 => {
            text.push_str(&format!(" (+{ahead}/-{behind})"));
        }
        _ => {}
    }
    if row.root {
        text.push_str(&format!(" {}", "(root)".dimmed()));
    }
    text
}

fn paint(status: SyncStatus) -> ColoredString {
    match status {
        SyncStatus::InSync => status.as_str().green(),
        SyncStatus::Ahead | SyncStatus::Behind => status.as_str().yellow(),
        SyncStatus::Diverged | SyncStatus::RemoteGone => status.as_str().red(),
        SyncStatus::LocalOnly => status.as_str().dimmed(),
    }
}
