//! Audit command
//!
//! Report broken reply links in a comment snapshot.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use ct_core::comment::{AuditReport, ThreadAudit};

use super::input;

/// Arguments for the audit command
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Snapshot file: a JSON array of records or a feed file (`-` for stdin)
    pub input: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with an error when any issue is found
    #[arg(long)]
    pub strict: bool,

    /// Skip the creation-order check
    #[arg(long)]
    pub no_order_check: bool,
}

/// Execute the audit command
pub fn execute(args: AuditArgs) -> Result<()> {
    let records = input::load_records(&args.input)?;
    let report = ThreadAudit::new()
        .with_order_check(!args.no_order_check)
        .audit(&records);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if args.strict && !report.is_clean() {
        bail!("{} issues found", report.issues.len());
    }

    Ok(())
}

fn print_report(report: &AuditReport) {
    use colored::Colorize;

    if report.is_clean() {
        println!(
            "{} {} comments checked, no issues found.",
            "✓".green(),
            report.checked
        );
        return;
    }

    println!("{}", "Audit Report".bold().underline());
    println!();
    println!("  Checked: {}", report.checked);
    for (kind, count) in report.count_by_kind() {
        println!("  {}: {}", kind, count.to_string().yellow());
    }

    println!();
    println!("{}", "Issues".bold());
    for issue in &report.issues {
        println!("  {} {}", "⚠".yellow(), issue);
    }
}
