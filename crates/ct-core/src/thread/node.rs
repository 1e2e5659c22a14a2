//! Thread tree nodes

use crate::comment::CommentRecord;
use crate::types::CommentId;
use serde::Serialize;

/// One comment placed in the reply tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadNode {
    /// The wrapped record, unchanged
    #[serde(flatten)]
    pub record: CommentRecord,
    /// Direct replies in input order
    pub children: Vec<ThreadNode>,
}

impl ThreadNode {
    /// Create a leaf node
    pub fn new(record: CommentRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    /// Id of the wrapped record
    pub fn id(&self) -> &CommentId {
        &self.record.id
    }

    /// Whether the node has no replies
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }

    /// Number of levels in this subtree, 1 for a leaf
    pub fn height(&self) -> usize {
        self.iter().map(|(_, depth)| depth + 1).max().unwrap_or(1)
    }

    /// Pre-order walk yielding each node with its depth below this one
    pub fn iter(&self) -> ThreadIter<'_> {
        ThreadIter {
            stack: vec![(self, 0)],
        }
    }

    /// Find a node in this subtree by id
    pub fn find(&self, id: &CommentId) -> Option<&ThreadNode> {
        self.iter().map(|(node, _)| node).find(|node| node.id() == id)
    }
}

/// Flattens the subtree first so dropping a long reply chain uses no stack
impl Drop for ThreadNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a subtree or a whole forest
pub struct ThreadIter<'a> {
    stack: Vec<(&'a ThreadNode, usize)>,
}

impl<'a> ThreadIter<'a> {
    /// Walk every tree of a forest in order, roots at depth 0
    pub fn forest(roots: &'a [ThreadNode]) -> Self {
        Self {
            stack: roots.iter().rev().map(|node| (node, 0)).collect(),
        }
    }
}

impl<'a> Iterator for ThreadIter<'a> {
    type Item = (&'a ThreadNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        Some((node, depth))
    }
}
