//! Thread command
//!
//! Build the reply tree of a comment snapshot and render it.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use ct_core::comment::ThreadAudit;
use ct_core::export::ExportManager;
use ct_core::thread::build_thread_owned;

use super::{input, ExportFormat, GlobalOptions};

/// Arguments for the thread command
#[derive(Debug, Args)]
pub struct ThreadArgs {
    /// Snapshot file: a JSON array of records or a feed file (`-` for stdin)
    pub input: PathBuf,

    /// Output format (defaults to export.default_format)
    #[arg(long, short, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print an audit summary to stderr before rendering
    #[arg(long)]
    pub audit: bool,

    /// Sort records by creation time before threading
    #[arg(long)]
    pub sort: bool,
}

/// Execute the thread command
pub fn execute(args: ThreadArgs, options: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let config = options.load_config()?;
    let mut records = input::load_records(&args.input)?;

    if args.sort || config.thread.sort_input {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    if args.audit || config.thread.warn_on_anomalies {
        let report = ThreadAudit::run(&records);
        if args.audit {
            if report.is_clean() {
                eprintln!("{} {} comments, no issues", "✓".green(), report.checked);
            } else {
                eprintln!(
                    "{} {} issues in {} comments",
                    "⚠".yellow(),
                    report.issues.len().to_string().yellow(),
                    report.checked
                );
                for issue in &report.issues {
                    eprintln!("  {} {}", issue.kind().to_string().yellow(), issue);
                }
            }
        } else {
            report.log();
        }
    }

    let roots = build_thread_owned(records);

    let format = args
        .format
        .map(|f| f.name().to_string())
        .unwrap_or_else(|| config.export.default_format.clone());
    let manager = ExportManager::from_config(&config.export);

    if let Some(output_path) = args.output {
        let written = manager
            .export_to_file(&roots, &format, &output_path)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        eprintln!("{} Wrote {}", "✓".green(), written.display());
    } else {
        let output = manager.export(&roots, &format)?;
        std::io::stdout()
            .write_all(output.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: ThreadArgs,
    }

    #[test]
    fn test_thread_args_parse() {
        let harness =
            Harness::try_parse_from(["thread", "comments.json", "-f", "json-compact", "--audit"])
                .unwrap();
        assert_eq!(harness.args.input, PathBuf::from("comments.json"));
        assert_eq!(harness.args.format, Some(ExportFormat::JsonCompact));
        assert!(harness.args.audit);
        assert!(harness.args.output.is_none());
    }

    #[test]
    fn test_thread_args_reject_unknown_format() {
        assert!(Harness::try_parse_from(["thread", "c.json", "--format", "yaml"]).is_err());
    }
}
