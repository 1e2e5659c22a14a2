//! Exporter trait and manager

use crate::error::{CatchThreadError, Result};
use crate::thread::ThreadNode;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Trait for thread exporters
pub trait Exporter: Send + Sync {
    /// Render a forest to string
    fn export(&self, roots: &[ThreadNode]) -> Result<String>;

    /// Get the format name
    fn format_name(&self) -> &str;

    /// Get the file extension
    fn file_extension(&self) -> &str;
}

/// Manager for handling multiple export formats
pub struct ExportManager {
    exporters: HashMap<String, Box<dyn Exporter>>,
}

impl ExportManager {
    /// Create a new export manager with default exporters
    pub fn new() -> Self {
        let mut manager = Self {
            exporters: HashMap::new(),
        };

        manager.register(Box::new(super::json::JsonExporter::new(false)));
        manager.register(Box::new(super::json::JsonExporter::compact()));
        manager.register(Box::new(super::markdown::MarkdownExporter::new()));
        manager.register(Box::new(super::text::TextExporter::new()));

        manager
    }

    /// Create a manager whose exporters follow the export config
    pub fn from_config(config: &crate::config::ExportConfig) -> Self {
        let mut manager = Self::new();
        manager.register(Box::new(
            super::markdown::MarkdownExporter::new().with_stats(config.include_stats),
        ));
        manager.register(Box::new(
            super::text::TextExporter::new()
                .with_indent(config.indent_width)
                .with_timestamps(config.show_timestamps),
        ));
        manager
    }

    /// Register a new exporter, replacing any with the same name
    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters
            .insert(exporter.format_name().to_string(), exporter);
    }

    /// Export a forest to the specified format
    pub fn export(&self, roots: &[ThreadNode], format: &str) -> Result<String> {
        self.lookup(format)?.export(roots)
    }

    /// Export a forest to a file, returning the path written
    ///
    /// The exporter's extension is appended when `path` has none. The file
    /// is written to a temporary sibling first and renamed into place.
    pub fn export_to_file(&self, roots: &[ThreadNode], format: &str, path: &Path) -> Result<PathBuf> {
        let exporter = self.lookup(format)?;
        let content = exporter.export(roots)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let final_path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(exporter.file_extension())
        };

        let temp_path = final_path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;
        }

        fs::rename(&temp_path, &final_path)?;
        Ok(final_path)
    }

    /// Get list of available format names
    pub fn available_formats(&self) -> Vec<String> {
        let mut formats: Vec<_> = self.exporters.keys().cloned().collect();
        formats.sort();
        formats
    }

    /// Check if a format is available
    pub fn has_format(&self, format: &str) -> bool {
        self.exporters.contains_key(format)
    }

    /// Get an exporter by format name
    pub fn get(&self, format: &str) -> Option<&dyn Exporter> {
        self.exporters.get(format).map(|e| e.as_ref())
    }

    fn lookup(&self, format: &str) -> Result<&dyn Exporter> {
        self.get(format).ok_or_else(|| {
            CatchThreadError::Validation(format!("Unknown export format: {}", format))
        })
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentRecord;
    use crate::thread::build_thread;
    use chrono::Utc;
    use tempfile::TempDir;

    struct TestExporter;

    impl Exporter for TestExporter {
        fn export(&self, roots: &[ThreadNode]) -> Result<String> {
            Ok(format!("{} roots", roots.len()))
        }

        fn format_name(&self) -> &str {
            "test"
        }

        fn file_extension(&self) -> &str {
            "txt"
        }
    }

    fn sample() -> Vec<ThreadNode> {
        build_thread(&[CommentRecord::new("a", None, Utc::now())])
    }

    #[test]
    fn test_export_manager_creation() {
        let manager = ExportManager::new();
        assert!(manager.has_format("json"));
        assert!(manager.has_format("json-compact"));
        assert!(manager.has_format("markdown"));
        assert!(manager.has_format("text"));
    }

    #[test]
    fn test_register_exporter() {
        let mut manager = ExportManager::new();
        manager.register(Box::new(TestExporter));
        assert!(manager.has_format("test"));
        assert_eq!(manager.export(&sample(), "test").unwrap(), "1 roots");
    }

    #[test]
    fn test_export_unknown_format() {
        let manager = ExportManager::new();
        assert!(manager.export(&sample(), "unknown").is_err());
    }

    #[test]
    fn test_available_formats_sorted() {
        let manager = ExportManager::new();
        assert_eq!(
            manager.available_formats(),
            vec!["json", "json-compact", "markdown", "text"]
        );
    }

    #[test]
    fn test_export_to_file_adds_extension() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new();

        let written = manager
            .export_to_file(&sample(), "markdown", &dir.path().join("out").join("thread"))
            .unwrap();

        assert_eq!(written.extension().unwrap(), "md");
        let content = fs::read_to_string(&written).unwrap();
        assert!(content.contains("# Comment Thread"));
    }
}
