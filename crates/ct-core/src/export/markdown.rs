//! Markdown exporter for threads

use super::exporter::Exporter;
use crate::comment::CommentRecord;
use crate::error::Result;
use crate::thread::{ThreadIter, ThreadNode, ThreadStats};

/// Markdown exporter rendering replies as nested list items
pub struct MarkdownExporter {
    /// Include statistics section
    include_stats: bool,
}

impl MarkdownExporter {
    /// Create a new Markdown exporter with default settings
    pub fn new() -> Self {
        Self {
            include_stats: true,
        }
    }

    /// Set whether to include statistics
    pub fn with_stats(mut self, include: bool) -> Self {
        self.include_stats = include;
        self
    }

    /// Render the statistics section
    fn render_stats(&self, roots: &[ThreadNode]) -> String {
        if !self.include_stats {
            return String::new();
        }

        let stats = ThreadStats::from_forest(roots);

        let mut output = String::new();
        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Comments:** {}\n", stats.total));
        output.push_str(&format!("- **Threads:** {}\n", stats.roots));
        output.push_str(&format!("- **Replies:** {}\n", stats.replies));
        output.push_str(&format!("- **Deepest reply:** level {}\n", stats.max_depth));
        if stats.deleted > 0 {
            output.push_str(&format!("- **Deleted:** {}\n", stats.deleted));
        }
        output.push('\n');
        output
    }

    /// Render a single comment as a list item at the given depth
    fn render_comment(record: &CommentRecord, depth: usize) -> String {
        let indent = "  ".repeat(depth);
        let author = record.author.as_deref().unwrap_or("anonymous");
        let when = record.created_at.format("%Y-%m-%d %H:%M");

        let body = if record.is_deleted() {
            "_[deleted]_".to_string()
        } else {
            // continuation lines stay inside the list item
            record
                .body
                .lines()
                .collect::<Vec<_>>()
                .join(&format!("\n{}  ", indent))
        };

        format!(
            "{}- **{}** <sub>{} · `{}`</sub>: {}\n",
            indent, author, when, record.id, body
        )
    }
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for MarkdownExporter {
    fn export(&self, roots: &[ThreadNode]) -> Result<String> {
        let mut output = String::new();
        output.push_str("# Comment Thread\n\n");
        output.push_str(&self.render_stats(roots));

        if roots.is_empty() {
            output.push_str("_No comments yet._\n");
            return Ok(output);
        }

        output.push_str("## Comments\n\n");
        for (node, depth) in ThreadIter::forest(roots) {
            output.push_str(&Self::render_comment(&node.record, depth));
        }

        Ok(output)
    }

    fn format_name(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::build_thread;
    use crate::types::CommentId;
    use chrono::{TimeZone, Utc};

    fn rec(id: &str, parent: Option<&str>, author: &str, body: &str) -> CommentRecord {
        let mut record = CommentRecord::new(
            id,
            parent.map(CommentId::from),
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        );
        record.author = Some(author.to_string());
        record.body = body.to_string();
        record
    }

    #[test]
    fn test_markdown_nests_replies() {
        let forest = build_thread(&[
            rec("r", None, "ola", "Caught on a spinner"),
            rec("c", Some("r"), "marta", "Which size?"),
        ]);
        let md = MarkdownExporter::new().export(&forest).unwrap();

        assert!(md.contains("# Comment Thread"));
        assert!(md.contains("- **Comments:** 2"));
        assert!(md.contains("- **ola** <sub>2024-05-01 08:30 · `r`</sub>: Caught on a spinner\n"));
        assert!(md.contains("\n  - **marta**"));
    }

    #[test]
    fn test_markdown_without_stats() {
        let forest = build_thread(&[rec("r", None, "ola", "hi")]);
        let md = MarkdownExporter::new().with_stats(false).export(&forest).unwrap();
        assert!(!md.contains("## Summary"));
    }

    #[test]
    fn test_markdown_deleted_and_multiline() {
        let mut deleted = rec("d", None, "troll", "spam");
        deleted.soft_delete(Utc::now());
        let forest = build_thread(&[deleted, rec("m", None, "ola", "line one\nline two")]);
        let md = MarkdownExporter::new().export(&forest).unwrap();

        assert!(md.contains("_[deleted]_"));
        assert!(!md.contains("spam"));
        assert!(md.contains("line one\n  line two"));
        assert!(md.contains("- **Deleted:** 1"));
    }

    #[test]
    fn test_markdown_empty() {
        let md = MarkdownExporter::new().export(&[]).unwrap();
        assert!(md.contains("_No comments yet._"));
    }
}
