//! Comment records
//!
//! Flat comment model, parent lookups and data-quality audit.

pub mod audit;
pub mod links;
pub mod model;

pub use audit::{AuditIssue, AuditReport, IssueKind, ThreadAudit};
pub use links::{Ancestors, ParentLinks};
pub use model::CommentRecord;
