//! Reply threading
//!
//! Turns a flat comment snapshot into a forest of reply trees.
//!
//! # Example
//!
//! ```ignore
//! use ct_core::thread::build_thread;
//!
//! let forest = build_thread(&records);
//! for root in &forest {
//!     println!("{} ({} replies)", root.id(), root.descendant_count());
//! }
//! ```

mod builder;
mod node;

pub use builder::{build_thread, build_thread_owned, ThreadPlan};
pub use node::{ThreadIter, ThreadNode};

use serde::{Deserialize, Serialize};

/// Shape summary of a forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadStats {
    /// All nodes
    pub total: usize,
    /// Top-level nodes
    pub roots: usize,
    /// Nodes nested under another
    pub replies: usize,
    /// Deepest nesting level, 0 for an empty forest
    pub max_depth: usize,
    /// Soft-deleted nodes still kept for their replies
    pub deleted: usize,
}

impl ThreadStats {
    /// Compute the summary in one walk
    pub fn from_forest(roots: &[ThreadNode]) -> Self {
        let mut stats = ThreadStats {
            roots: roots.len(),
            ..Default::default()
        };

        for (node, depth) in ThreadIter::forest(roots) {
            stats.total += 1;
            stats.max_depth = stats.max_depth.max(depth + 1);
            if node.record.is_deleted() {
                stats.deleted += 1;
            }
        }

        stats.replies = stats.total - stats.roots;
        stats
    }
}
