//! Plain-text tree exporter

use super::exporter::Exporter;
use crate::error::Result;
use crate::thread::{ThreadIter, ThreadNode};

/// Indented plain-text rendering, one comment per line
pub struct TextExporter {
    indent: usize,
    timestamps: bool,
}

impl TextExporter {
    /// Create a text exporter with two-space indentation
    pub fn new() -> Self {
        Self {
            indent: 2,
            timestamps: false,
        }
    }

    /// Spaces per nesting level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Prefix each line with the creation time
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

impl Default for TextExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for TextExporter {
    fn export(&self, roots: &[ThreadNode]) -> Result<String> {
        let mut output = String::new();

        for (node, depth) in ThreadIter::forest(roots) {
            let record = &node.record;
            output.push_str(&" ".repeat(depth * self.indent));
            if self.timestamps {
                output.push_str(&format!("[{}] ", record.created_at.format("%Y-%m-%d %H:%M:%S")));
            }
            let author = record.author.as_deref().unwrap_or("anonymous");
            // keep one comment per line
            let body = record.display_body().replace('\n', " ");
            output.push_str(&format!("{} ({}): {}\n", author, record.id, body));
        }

        Ok(output)
    }

    fn format_name(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}
