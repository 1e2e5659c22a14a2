//! JSON exporter for threads

use super::exporter::Exporter;
use crate::error::Result;
use crate::thread::{ThreadNode, ThreadStats};
use crate::types::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// JSON exporter with compact mode support
pub struct JsonExporter {
    /// Whether to use compact field names and no whitespace
    compact: bool,
    /// Format name
    name: String,
}

impl JsonExporter {
    /// Create a new JSON exporter
    pub fn new(compact: bool) -> Self {
        Self {
            compact,
            name: if compact {
                "json-compact".to_string()
            } else {
                "json".to_string()
            },
        }
    }

    /// Create a compact JSON exporter
    pub fn compact() -> Self {
        Self::new(true)
    }

    /// Create a pretty-printed JSON exporter
    pub fn pretty() -> Self {
        Self::new(false)
    }
}

impl Exporter for JsonExporter {
    fn export(&self, roots: &[ThreadNode]) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(&ExportData::from_forest(roots))?
        } else {
            serde_json::to_string_pretty(&ThreadDocument {
                version: ProtocolVersion::V1_0.to_string(),
                stats: ThreadStats::from_forest(roots),
                thread: roots,
            })?
        };

        Ok(json)
    }

    fn format_name(&self) -> &str {
        &self.name
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

/// Full JSON document with every record field
#[derive(Debug, Serialize)]
struct ThreadDocument<'a> {
    version: String,
    stats: ThreadStats,
    thread: &'a [ThreadNode],
}

/// Compact export structure (short field names)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    /// Protocol version
    pub v: String,
    /// Statistics
    pub stats: ExportStats,
    /// Root comments
    pub c: Vec<ExportNode>,
}

impl ExportData {
    /// Create from a forest
    pub fn from_forest(roots: &[ThreadNode]) -> Self {
        Self {
            v: ProtocolVersion::V1_0.to_string(),
            stats: ExportStats::from(ThreadStats::from_forest(roots)),
            c: roots.iter().map(ExportNode::from_node).collect(),
        }
    }
}

/// Compact statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    /// Total comments
    pub t: usize,
    /// Root count
    pub r: usize,
    /// Max depth
    pub d: usize,
}

impl From<ThreadStats> for ExportStats {
    fn from(stats: ThreadStats) -> Self {
        Self {
            t: stats.total,
            r: stats.roots,
            d: stats.max_depth,
        }
    }
}

/// Compact comment node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportNode {
    /// Comment id
    pub i: String,
    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    /// Body, empty for deleted comments
    pub b: String,
    /// Created at (unix seconds)
    pub t: i64,
    /// Deleted flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub x: bool,
    /// Replies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub r: Vec<ExportNode>,
}

impl ExportNode {
    /// Create from a thread node and its replies
    pub fn from_node(node: &ThreadNode) -> Self {
        let record = &node.record;
        Self {
            i: record.id.to_string(),
            a: record.author.clone(),
            b: if record.is_deleted() {
                String::new()
            } else {
                record.body.clone()
            },
            t: record.created_at.timestamp(),
            x: record.is_deleted(),
            r: node.children.iter().map(ExportNode::from_node).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentRecord;
    use crate::thread::build_thread;
    use crate::types::CommentId;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<ThreadNode> {
        let at = Utc.timestamp_opt(1_714_550_400, 0).unwrap();
        let mut root = CommentRecord::new("r", None, at);
        root.author = Some("ola".to_string());
        root.body = "First perch of the year".to_string();
        let mut reply = CommentRecord::new("c", Some(CommentId::from("r")), at);
        reply.body = "secret".to_string();
        reply.soft_delete(at);

        build_thread(&[root, reply])
    }

    #[test]
    fn test_pretty_json_nests_children() {
        let json = JsonExporter::pretty().export(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["stats"]["total"], 2);
        assert_eq!(value["thread"][0]["id"], "r");
        assert_eq!(value["thread"][0]["children"][0]["id"], "c");
    }

    #[test]
    fn test_compact_json() {
        let json = JsonExporter::compact().export(&sample()).unwrap();
        assert!(!json.contains('\n'));

        let data: ExportData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.stats.t, 2);
        assert_eq!(data.stats.d, 2);
        assert_eq!(data.c[0].i, "r");
        assert_eq!(data.c[0].t, 1_714_550_400);
        assert!(data.c[0].r[0].x);
        assert_eq!(data.c[0].r[0].b, "");
    }

    #[test]
    fn test_compact_json_skips_empty_fields() {
        let json = JsonExporter::compact().export(&sample()).unwrap();
        assert!(!json.contains("secret"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["c"][0].get("x").is_none());
        assert!(value["c"][0]["r"][0].get("r").is_none());
        assert!(value["c"][0]["r"][0].get("a").is_none());
    }

    #[test]
    fn test_empty_forest() {
        let json = JsonExporter::compact().export(&[]).unwrap();
        let data: ExportData = serde_json::from_str(&json).unwrap();
        assert!(data.c.is_empty());
        assert_eq!(data.stats.t, 0);
    }
}
