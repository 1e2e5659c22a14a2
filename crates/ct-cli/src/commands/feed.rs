//! Feed command
//!
//! Manage stored per-catch comment feeds.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use ct_core::export::ExportManager;
use ct_core::feed::FeedManager;
use ct_core::types::CatchId;

use super::{input, ExportFormat, GlobalOptions};

/// Feed subcommands
#[derive(Debug, Subcommand)]
pub enum FeedCommand {
    /// Store a snapshot as the feed of a catch, replacing earlier records
    Import {
        /// Catch post id
        catch_id: String,

        /// Snapshot file: a JSON array of records or a feed file (`-` for stdin)
        input: PathBuf,
    },

    /// List stored feeds
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Limit number of feeds
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },

    /// Show a feed and its reply tree
    Show {
        /// Catch post id
        catch_id: String,

        /// Print only the rendered tree in this format
        #[arg(long, short, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Apply realtime events to a stored feed
    Event {
        /// Catch post id
        catch_id: String,

        /// File with one event or an array of events (`-` for stdin)
        events: PathBuf,
    },

    /// Delete a feed
    Delete {
        /// Catch post id
        catch_id: String,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete feeds not updated recently
    Clean {
        /// Delete feeds older than this many days
        #[arg(long, default_value = "30")]
        older_than: u64,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

/// Execute the feed command
pub fn execute(cmd: FeedCommand, options: &GlobalOptions) -> Result<()> {
    let config = options.load_config()?;
    let manager = options.feed_manager(&config)?;

    match cmd {
        FeedCommand::Import { catch_id, input } => import_feed(&manager, &catch_id, &input),
        FeedCommand::List { json, limit } => list_feeds(&manager, json, limit),
        FeedCommand::Show { catch_id, format } => {
            let exports = ExportManager::from_config(&config.export);
            show_feed(&manager, &exports, &catch_id, format)
        }
        FeedCommand::Event { catch_id, events } => apply_events(&manager, &catch_id, &events),
        FeedCommand::Delete { catch_id, yes } => delete_feed(&manager, &catch_id, yes),
        FeedCommand::Clean { older_than, yes } => clean_feeds(&manager, older_than, yes),
    }
}

fn parse_catch_id(id: &str) -> Result<CatchId> {
    CatchId::from_string(id).with_context(|| format!("Invalid catch ID: {}", id))
}

fn import_feed(manager: &FeedManager, id: &str, path: &Path) -> Result<()> {
    use colored::Colorize;

    let catch_id = parse_catch_id(id)?;
    let records = input::load_records(path)?;
    let feed = manager.import(catch_id, records)?;

    let report = feed.audit();
    println!(
        "{} Imported {} comments into feed '{}' (revision {})",
        "✓".green(),
        feed.len().to_string().cyan(),
        id,
        feed.revision
    );
    if !report.is_clean() {
        println!(
            "  {} {} audit issues, run 'catch-thread audit' for details",
            "⚠".yellow(),
            report.issues.len()
        );
    }

    Ok(())
}

fn list_feeds(manager: &FeedManager, as_json: bool, limit: usize) -> Result<()> {
    use colored::Colorize;

    let feeds = manager.list()?;

    if feeds.is_empty() {
        println!("No feeds found.");
        return Ok(());
    }

    let total = feeds.len();
    let feeds: Vec<_> = feeds.into_iter().take(limit).collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }

    println!("{}", "Feeds:".bold().underline());
    println!();

    for info in &feeds {
        let age = chrono::Utc::now()
            .signed_duration_since(info.updated_at)
            .num_hours();
        let age_str = if age < 1 {
            "just now".to_string()
        } else if age < 24 {
            format!("{}h ago", age)
        } else {
            format!("{}d ago", age / 24)
        };

        println!(
            "  {} {} comments, {} deleted, rev {} ({})",
            info.catch_id.to_string().green(),
            info.comment_count.to_string().cyan(),
            info.deleted_count,
            info.revision,
            age_str.dimmed()
        );
    }

    if total > limit {
        println!(
            "\n  {} Showing {} of {} feeds. Use --limit to show more.",
            "ℹ".blue(),
            limit,
            total
        );
    }

    Ok(())
}

fn show_feed(
    manager: &FeedManager,
    exports: &ExportManager,
    id: &str,
    format: Option<ExportFormat>,
) -> Result<()> {
    use colored::Colorize;

    let catch_id = parse_catch_id(id)?;
    let mut feed = manager
        .load(&catch_id)
        .with_context(|| format!("Feed '{}' not found", id))?;

    if let Some(format) = format {
        print!("{}", exports.export(feed.thread(), format.name())?);
        return Ok(());
    }

    let stats = feed.stats();

    println!("{}", "Feed Details".bold().underline());
    println!();
    println!("  Catch: {}", feed.catch_id.to_string().green());
    println!("  Revision: {}", feed.revision);
    println!("  Created: {}", feed.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated: {}", feed.updated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Digest: {}", feed.digest().dimmed());

    println!();
    println!("{}", "Thread".bold());
    println!("  Comments: {}", stats.total.to_string().cyan());
    println!("  Top level: {}", stats.roots);
    println!("  Replies: {}", stats.replies);
    println!("  Deepest reply: {}", stats.max_depth);
    if stats.deleted > 0 {
        println!("  Deleted: {}", stats.deleted.to_string().red());
    }

    if !feed.is_empty() {
        println!();
        print!("{}", exports.export(feed.thread(), "text")?);
    }

    Ok(())
}

fn apply_events(manager: &FeedManager, id: &str, path: &Path) -> Result<()> {
    use colored::Colorize;

    let catch_id = parse_catch_id(id)?;
    let events = input::load_events(path)?;
    let labels: Vec<String> = events.iter().map(|e| e.to_string()).collect();

    let feed = manager
        .apply_all(&catch_id, events)
        .with_context(|| format!("Failed to apply events to feed '{}', nothing stored", id))?;

    let first = feed.revision - labels.len() as u64;
    for (i, label) in labels.iter().enumerate() {
        println!(
            "{} Applied {} (revision {})",
            "✓".green(),
            label,
            first + i as u64 + 1
        );
    }
    println!("  Feed '{}' now at revision {}", id, feed.revision);

    Ok(())
}

fn delete_feed(manager: &FeedManager, id: &str, yes: bool) -> Result<()> {
    use colored::Colorize;

    let catch_id = parse_catch_id(id)?;
    let feed = manager
        .load(&catch_id)
        .with_context(|| format!("Feed '{}' not found", id))?;

    if !yes {
        use dialoguer::Confirm;

        println!("Feed: {}", id.green());
        println!("  {} comments, revision {}", feed.len(), feed.revision);

        let confirmed = Confirm::new()
            .with_prompt("Delete this feed?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    manager.delete(&catch_id)?;
    println!("{} Feed '{}' deleted.", "✓".green(), id);

    Ok(())
}

fn clean_feeds(manager: &FeedManager, older_than_days: u64, yes: bool) -> Result<()> {
    use colored::Colorize;

    let cutoff = chrono::Utc::now() - chrono::Duration::days(older_than_days as i64);
    let stale: Vec<_> = manager
        .list()?
        .into_iter()
        .filter(|f| f.updated_at < cutoff)
        .collect();

    if stale.is_empty() {
        println!("No feeds older than {} days found.", older_than_days);
        return Ok(());
    }

    println!(
        "Found {} feeds older than {} days:",
        stale.len().to_string().yellow(),
        older_than_days
    );
    for info in &stale {
        println!("  {}", info.catch_id.to_string().dimmed());
    }

    if !yes {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} feeds?", stale.len()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cleanup cancelled.");
            return Ok(());
        }
    }

    let deleted = manager.clean(cutoff)?;
    println!("{} Deleted {} feeds.", "✓".green(), deleted);

    Ok(())
}
