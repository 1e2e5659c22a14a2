//! Parent-link lookup over a flat comment snapshot

use super::model::CommentRecord;
use crate::types::CommentId;
use std::collections::{HashMap, HashSet};

/// Declared parent of every comment in a snapshot, keyed by comment id
///
/// Borrowed from the records it was built from. When an id appears more
/// than once the last record wins.
#[derive(Debug, Clone, Default)]
pub struct ParentLinks<'a> {
    parents: HashMap<&'a CommentId, Option<&'a CommentId>>,
}

impl<'a> ParentLinks<'a> {
    /// Build the lookup in a single pass
    pub fn from_records(records: &'a [CommentRecord]) -> Self {
        let mut parents = HashMap::with_capacity(records.len());
        for record in records {
            parents.insert(&record.id, record.parent_id.as_ref());
        }
        Self { parents }
    }

    /// Whether a comment with this id is in the snapshot
    pub fn contains(&self, id: &CommentId) -> bool {
        self.parents.contains_key(id)
    }

    /// The parent id the comment declares, resolvable or not
    pub fn declared_parent(&self, id: &CommentId) -> Option<&'a CommentId> {
        self.parents.get(id).copied().flatten()
    }

    /// The declared parent, if it names a comment in the snapshot
    pub fn resolved_parent(&self, id: &CommentId) -> Option<&'a CommentId> {
        self.declared_parent(id).filter(|p| self.contains(p))
    }

    /// Walk up the declared chain starting at `start` itself
    ///
    /// Stops at a top-level comment, at a parent outside the snapshot, or
    /// before yielding any id a second time.
    pub fn ancestors(&self, start: &CommentId) -> Ancestors<'_, 'a> {
        let next = self.parents.get_key_value(start).map(|(k, _)| *k);
        Ancestors {
            links: self,
            next,
            visited: HashSet::new(),
        }
    }

    /// Whether hanging `id` under its declared parent would close a loop
    pub fn would_cycle(&self, id: &CommentId) -> bool {
        match self.resolved_parent(id) {
            Some(parent) => self.ancestors(parent).any(|a| a == id),
            None => false,
        }
    }

    /// Number of distinct ids
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Iterator returned by [`ParentLinks::ancestors`]
pub struct Ancestors<'l, 'a> {
    links: &'l ParentLinks<'a>,
    next: Option<&'a CommentId>,
    visited: HashSet<&'a CommentId>,
}

impl<'l, 'a> Iterator for Ancestors<'l, 'a> {
    type Item = &'a CommentId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.visited.insert(current);
        self.next = self
            .links
            .resolved_parent(current)
            .filter(|p| !self.visited.contains(*p));
        Some(current)
    }
}
