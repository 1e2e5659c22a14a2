//! Data-quality audit for comment snapshots
//!
//! The thread builder silently repairs bad parent links. This module is the
//! place that notices them, so callers can report or log anomalies without
//! the builder ever failing.

use super::links::ParentLinks;
use super::model::CommentRecord;
use crate::types::CommentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// Kind of anomaly, used for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateId,
    SelfParent,
    DanglingParent,
    CyclicParent,
    OutOfOrder,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::DuplicateId => "duplicate id",
            IssueKind::SelfParent => "self parent",
            IssueKind::DanglingParent => "dangling parent",
            IssueKind::CyclicParent => "cyclic parent",
            IssueKind::OutOfOrder => "out of order",
        };
        f.write_str(s)
    }
}

/// A single anomaly found in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditIssue {
    /// The id appears more than once; only the last record is threaded
    DuplicateId { id: CommentId, occurrences: usize },
    /// The comment names itself as parent
    SelfParent { id: CommentId },
    /// The parent is not part of the snapshot
    DanglingParent { id: CommentId, parent: CommentId },
    /// Following parents from this comment leads back to it
    CyclicParent { id: CommentId, parent: CommentId },
    /// Created before the record preceding it
    OutOfOrder {
        id: CommentId,
        previous: CommentId,
        created_at: DateTime<Utc>,
        previous_created_at: DateTime<Utc>,
    },
}

impl AuditIssue {
    /// The kind of this issue
    pub fn kind(&self) -> IssueKind {
        match self {
            AuditIssue::DuplicateId { .. } => IssueKind::DuplicateId,
            AuditIssue::SelfParent { .. } => IssueKind::SelfParent,
            AuditIssue::DanglingParent { .. } => IssueKind::DanglingParent,
            AuditIssue::CyclicParent { .. } => IssueKind::CyclicParent,
            AuditIssue::OutOfOrder { .. } => IssueKind::OutOfOrder,
        }
    }

    /// The comment the issue is about
    pub fn id(&self) -> &CommentId {
        match self {
            AuditIssue::DuplicateId { id, .. }
            | AuditIssue::SelfParent { id }
            | AuditIssue::DanglingParent { id, .. }
            | AuditIssue::CyclicParent { id, .. }
            | AuditIssue::OutOfOrder { id, .. } => id,
        }
    }
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::DuplicateId { id, occurrences } => {
                write!(f, "comment {} appears {} times", id, occurrences)
            }
            AuditIssue::SelfParent { id } => write!(f, "comment {} replies to itself", id),
            AuditIssue::DanglingParent { id, parent } => {
                write!(f, "comment {} replies to unknown comment {}", id, parent)
            }
            AuditIssue::CyclicParent { id, parent } => {
                write!(f, "comment {} replies to {} which leads back to it", id, parent)
            }
            AuditIssue::OutOfOrder {
                id,
                previous,
                created_at,
                previous_created_at,
            } => write!(
                f,
                "comment {} ({}) is older than the preceding comment {} ({})",
                id,
                created_at.to_rfc3339(),
                previous,
                previous_created_at.to_rfc3339()
            ),
        }
    }
}

/// Result of auditing one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Number of records checked
    pub checked: usize,
    /// Issues in discovery order
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    /// Whether no issues were found
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue count per kind
    pub fn count_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Issues of a given kind
    pub fn of_kind(&self, kind: IssueKind) -> Vec<&AuditIssue> {
        self.issues.iter().filter(|i| i.kind() == kind).collect()
    }

    /// Emit one warning per issue
    pub fn log(&self) {
        for issue in &self.issues {
            warn!(kind = %issue.kind(), comment = %issue.id(), "{}", issue);
        }
    }
}

/// Snapshot auditor
pub struct ThreadAudit {
    check_order: bool,
}

impl ThreadAudit {
    /// Create an auditor with every check enabled
    pub fn new() -> Self {
        Self { check_order: true }
    }

    /// Toggle the creation-order check
    pub fn with_order_check(mut self, enabled: bool) -> Self {
        self.check_order = enabled;
        self
    }

    /// Audit with default settings
    pub fn run(records: &[CommentRecord]) -> AuditReport {
        Self::new().audit(records)
    }

    /// Audit a snapshot
    pub fn audit(&self, records: &[CommentRecord]) -> AuditReport {
        let links = ParentLinks::from_records(records);
        let mut report = AuditReport {
            checked: records.len(),
            issues: Vec::new(),
        };

        let mut occurrences: HashMap<&CommentId, usize> = HashMap::new();
        for record in records {
            *occurrences.entry(&record.id).or_insert(0) += 1;
        }

        let mut reported = HashSet::new();
        for (i, record) in records.iter().enumerate() {
            let count = occurrences[&record.id];
            if count > 1 && reported.insert(&record.id) {
                report.issues.push(AuditIssue::DuplicateId {
                    id: record.id.clone(),
                    occurrences: count,
                });
            }

            if let Some(parent) = &record.parent_id {
                if parent == &record.id {
                    report.issues.push(AuditIssue::SelfParent {
                        id: record.id.clone(),
                    });
                } else if !links.contains(parent) {
                    report.issues.push(AuditIssue::DanglingParent {
                        id: record.id.clone(),
                        parent: parent.clone(),
                    });
                } else if links.declared_parent(&record.id) == Some(parent)
                    && links.would_cycle(&record.id)
                {
                    report.issues.push(AuditIssue::CyclicParent {
                        id: record.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            if self.check_order && i > 0 {
                let previous = &records[i - 1];
                if record.created_at < previous.created_at {
                    report.issues.push(AuditIssue::OutOfOrder {
                        id: record.id.clone(),
                        previous: previous.id.clone(),
                        created_at: record.created_at,
                        previous_created_at: previous.created_at,
                    });
                }
            }
        }

        report
    }
}

impl Default for ThreadAudit {
    fn default() -> Self {
        Self::new()
    }
}
