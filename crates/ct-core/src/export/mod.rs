//! Export functionality for comment threads
//!
//! Export functionality supports:
//! - JSON format (full records, and compact with short keys)
//! - Markdown format (nested list report)
//! - Plain text (indented tree)
//!
//! # Example
//!
//! ```ignore
//! use ct_core::export::ExportManager;
//!
//! let manager = ExportManager::new();
//! let md = manager.export(&forest, "markdown")?;
//! ```

mod exporter;
mod json;
mod markdown;
mod text;

pub use exporter::{ExportManager, Exporter};
pub use json::{ExportData, ExportNode, ExportStats, JsonExporter};
pub use markdown::MarkdownExporter;
pub use text::TextExporter;
