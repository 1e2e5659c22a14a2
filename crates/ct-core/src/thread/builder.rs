//! Reply-tree reconstruction from flat comment snapshots

use super::node::ThreadNode;
use crate::comment::{CommentRecord, ParentLinks};
use crate::types::CommentId;
use std::collections::HashMap;

/// Where every record of a snapshot ends up, by input index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadPlan {
    /// Indices of root records in input order
    pub roots: Vec<usize>,
    /// Child indices per record, in input order
    pub children: Vec<Vec<usize>>,
    /// Indices of records shadowed by a later record with the same id
    pub superseded: Vec<usize>,
}

impl ThreadPlan {
    /// Decide the placement of every record
    ///
    /// A record hangs under its declared parent only when that parent is in
    /// the snapshot and walking up from it never reaches the record again.
    /// Everything else becomes a root. For repeated ids the last record wins
    /// and is placed at its own position.
    pub fn for_records(records: &[CommentRecord]) -> Self {
        let links = ParentLinks::from_records(records);

        let mut last: HashMap<&CommentId, usize> = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            last.insert(&record.id, i);
        }

        let mut plan = ThreadPlan {
            roots: Vec::new(),
            children: vec![Vec::new(); records.len()],
            superseded: Vec::new(),
        };

        for (i, record) in records.iter().enumerate() {
            if last.get(&record.id) != Some(&i) {
                plan.superseded.push(i);
                continue;
            }

            let parent = links
                .resolved_parent(&record.id)
                .filter(|_| !links.would_cycle(&record.id))
                .and_then(|p| last.get(p));

            match parent {
                Some(&p) => plan.children[p].push(i),
                None => plan.roots.push(i),
            }
        }

        plan
    }

    /// Materialise the forest, pulling each record through `take`
    ///
    /// Children are built before their parents with an explicit stack.
    /// Building and dropping stay iterative for deep chains; serializing
    /// or comparing a tree still recurses once per level.
    fn assemble<F>(&self, mut take: F) -> Vec<ThreadNode>
    where
        F: FnMut(usize) -> Option<CommentRecord>,
    {
        let mut slots: Vec<Option<ThreadNode>> = Vec::with_capacity(self.children.len());
        slots.resize_with(self.children.len(), || None);

        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&i| (i, false)).collect();
        while let Some((i, expanded)) = stack.pop() {
            if expanded {
                let children = self.children[i]
                    .iter()
                    .filter_map(|&c| slots[c].take())
                    .collect();
                if let Some(record) = take(i) {
                    slots[i] = Some(ThreadNode { record, children });
                }
            } else {
                stack.push((i, true));
                stack.extend(self.children[i].iter().rev().map(|&c| (c, false)));
            }
        }

        self.roots.iter().filter_map(|&i| slots[i].take()).collect()
    }
}

/// Build the reply forest for a snapshot
///
/// Records are expected in ascending creation order; sibling order in the
/// output is input order. Never fails and never drops a distinct id.
pub fn build_thread(records: &[CommentRecord]) -> Vec<ThreadNode> {
    ThreadPlan::for_records(records).assemble(|i| Some(records[i].clone()))
}

/// Same as [`build_thread`], moving the records into the nodes
pub fn build_thread_owned(records: Vec<CommentRecord>) -> Vec<ThreadNode> {
    let plan = ThreadPlan::for_records(&records);
    let mut owned: Vec<Option<CommentRecord>> = records.into_iter().map(Some).collect();
    plan.assemble(|i| owned[i].take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::ThreadIter;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn rec(id: &str, parent: Option<&str>) -> CommentRecord {
        CommentRecord::new(id, parent.map(CommentId::from), ts(0))
    }

    fn root_ids(forest: &[ThreadNode]) -> Vec<&str> {
        forest.iter().map(|n| n.id().as_str()).collect()
    }

    fn child_ids(node: &ThreadNode) -> Vec<&str> {
        node.children.iter().map(|n| n.id().as_str()).collect()
    }

    /// Every node reachable once, and never from itself
    fn assert_well_formed(records: &[CommentRecord], forest: &[ThreadNode]) {
        let distinct: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let seen: Vec<&str> = ThreadIter::forest(forest).map(|(n, _)| n.id().as_str()).collect();
        let unique: HashSet<&str> = seen.iter().copied().collect();

        assert_eq!(seen.len(), unique.len(), "a node appears twice");
        assert_eq!(unique, distinct, "coverage mismatch");

        for (node, _) in ThreadIter::forest(forest) {
            for child in &node.children {
                assert!(child.find(node.id()).is_none(), "{} is its own descendant", node.id());
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_thread(&[]).is_empty());
        assert!(build_thread_owned(Vec::new()).is_empty());
    }

    #[test]
    fn test_nesting() {
        let records = vec![rec("r", None), rec("c1", Some("r")), rec("c2", Some("c1"))];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["r"]);
        assert_eq!(child_ids(&forest[0]), vec!["c1"]);
        assert_eq!(child_ids(&forest[0].children[0]), vec!["c2"]);
        assert_well_formed(&records, &forest);
    }

    #[test]
    fn test_root_order_preserved() {
        let records = vec![rec("x", None), rec("y", None), rec("z", None)];
        let forest = build_thread(&records);
        assert_eq!(root_ids(&forest), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_sibling_order_preserved() {
        let records = vec![
            rec("r", None),
            rec("b", Some("r")),
            rec("a", Some("r")),
            rec("c", Some("r")),
        ];
        let forest = build_thread(&records);
        assert_eq!(child_ids(&forest[0]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let records = vec![rec("c", Some("p")), rec("p", None)];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["p"]);
        assert_eq!(child_ids(&forest[0]), vec!["c"]);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let records = vec![rec("a", None), rec("orphan", Some("ghost"))];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["a", "orphan"]);
        assert_well_formed(&records, &forest);
    }

    #[test]
    fn test_two_cycle_both_roots() {
        let records = vec![rec("a", Some("b")), rec("b", Some("a"))];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["a", "b"]);
        assert!(forest.iter().all(|n| n.is_leaf()));
        assert_well_formed(&records, &forest);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let records = vec![rec("me", Some("me"))];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["me"]);
        assert!(forest[0].is_leaf());
    }

    #[test]
    fn test_reply_into_cycle_attaches() {
        let records = vec![
            rec("a", Some("b")),
            rec("b", Some("c")),
            rec("c", Some("a")),
            rec("x", Some("a")),
        ];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["a", "b", "c"]);
        assert_eq!(child_ids(&forest[0]), vec!["x"]);
        assert_well_formed(&records, &forest);
    }

    #[test]
    fn test_tail_under_cycle_keeps_structure() {
        let records = vec![
            rec("a", Some("b")),
            rec("b", Some("a")),
            rec("t1", Some("b")),
            rec("t2", Some("t1")),
        ];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["a", "b"]);
        assert_eq!(child_ids(&forest[1]), vec!["t1"]);
        assert_eq!(child_ids(&forest[1].children[0]), vec!["t2"]);
        assert_well_formed(&records, &forest);
    }

    #[test]
    fn test_duplicate_id_last_record_wins() {
        let mut first = rec("d", None);
        first.body = "first".to_string();
        let mut second = rec("d", Some("r"));
        second.body = "second".to_string();

        let records = vec![first, rec("r", None), second];
        let forest = build_thread(&records);

        assert_eq!(root_ids(&forest), vec!["r"]);
        assert_eq!(forest[0].children[0].record.body, "second");
        assert_well_formed(&records, &forest);

        let plan = ThreadPlan::for_records(&records);
        assert_eq!(plan.superseded, vec![0]);
    }

    #[test]
    fn test_deep_chain_assembles() {
        const DEPTH: usize = 3_000;

        let mut records = vec![rec("n0", None)];
        for i in 1..DEPTH {
            records.push(rec(&format!("n{}", i), Some(&format!("n{}", i - 1))));
        }
        let plan = ThreadPlan::for_records(&records);
        assert_eq!(plan.roots, vec![0]);
        assert_eq!(plan.children[DEPTH - 2], vec![DEPTH - 1]);

        let forest = build_thread_owned(records);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].height(), DEPTH);
    }

    #[test]
    fn test_owned_matches_borrowed() {
        let records = vec![
            rec("r", None),
            rec("c1", Some("r")),
            rec("loop", Some("loop")),
            rec("c2", Some("c1")),
            rec("o", Some("nowhere")),
        ];
        assert_eq!(build_thread(&records), build_thread_owned(records.clone()));
    }

    #[test]
    fn test_payload_passes_through() {
        let mut record = rec("r", None);
        record.author = Some("ola".to_string());
        record.body = "Zander, 71cm".to_string();
        record.extensions.set("likes", 12);

        let forest = build_thread(std::slice::from_ref(&record));
        assert_eq!(forest[0].record, record);
    }

    #[test]
    fn test_mixed_snapshot_is_well_formed() {
        let records = vec![
            rec("a", None),
            rec("b", Some("a")),
            rec("c", Some("c")),
            rec("d", Some("e")),
            rec("e", Some("d")),
            rec("f", Some("d")),
            rec("g", Some("missing")),
            rec("h", Some("b")),
            rec("b", Some("g")),
        ];
        let forest = build_thread(&records);
        assert_well_formed(&records, &forest);
    }

    /// Small LCG so generated snapshots are reproducible without extra deps
    struct Lcg(u64);

    impl Lcg {
        fn below(&mut self, n: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 33) % n
        }
    }

    /// Ids drawn from a small pool so repeats, self links and loops are common
    fn random_snapshot(rng: &mut Lcg) -> Vec<CommentRecord> {
        let len = rng.below(40) as usize;
        let pool = rng.below(30) + 1;
        (0..len)
            .map(|_| {
                let id = format!("c{}", rng.below(pool));
                let parent = match rng.below(6) {
                    0 => None,
                    1 => Some(id.clone()),
                    2 => Some(format!("gone{}", rng.below(3))),
                    _ => Some(format!("c{}", rng.below(pool))),
                };
                rec(&id, parent.as_deref())
            })
            .collect()
    }

    #[test]
    fn test_random_snapshots_are_well_formed() {
        let mut rng = Lcg(0x5eed_cafe);
        for _ in 0..500 {
            let records = random_snapshot(&mut rng);
            let forest = build_thread(&records);
            assert_well_formed(&records, &forest);
            assert_eq!(forest, build_thread_owned(records));
        }
    }
}
