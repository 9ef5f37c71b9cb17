//! Near-duplicate detection inside a single pool.
//!
//! Every record is scored against the records after it; pairs scoring at
//! or above the threshold are joined, and each connected component becomes
//! one [`DuplicateGroup`]. Records are tracked by pool position, so two
//! entries sharing an id are still distinct members.

use std::collections::{BTreeMap, BTreeSet};

use linkage_model::{DuplicateGroup, FieldName, MatchingConfig, Record, Resolution};
use rayon::prelude::*;
use tracing::debug;

use crate::scorer::scorer_for;

/// Score at which two records are treated as likely duplicates.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 85.0;

/// Union-find over pool indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = index;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Join two sets; the smaller index stays the root.
    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            let (low, high) = if root_a < root_b { (root_a, root_b) } else { (root_b, root_a) };
            self.parent[high] = low;
        }
    }
}

#[derive(Default)]
struct GroupStats {
    members: BTreeSet<usize>,
    max_score: f64,
    fields: BTreeSet<FieldName>,
}

/// Cluster likely duplicates in `pool`.
pub fn find_duplicates(
    pool: &[Record],
    config: &MatchingConfig,
    threshold: f64,
) -> Vec<DuplicateGroup> {
    let scorer = scorer_for(config);
    let scorer = scorer.as_ref();
    let edges: Vec<(usize, usize, f64, BTreeSet<FieldName>)> = (0..pool.len())
        .into_par_iter()
        .flat_map_iter(|index| {
            (index + 1..pool.len()).filter_map(move |other| {
                let pair = scorer.score_pair(&pool[index], &pool[other]);
                (pair.score >= threshold).then_some((index, other, pair.score, pair.matched_on))
            })
        })
        .collect();

    let mut sets = DisjointSet::new(pool.len());
    for (a, b, ..) in &edges {
        sets.union(*a, *b);
    }

    let mut stats: BTreeMap<usize, GroupStats> = BTreeMap::new();
    for (a, b, score, fields) in edges {
        let root = sets.find(a);
        let entry = stats.entry(root).or_default();
        entry.members.extend([a, b]);
        entry.max_score = entry.max_score.max(score);
        entry.fields.extend(fields);
    }

    let groups: Vec<DuplicateGroup> = stats
        .into_values()
        .enumerate()
        .map(|(n, group)| DuplicateGroup {
            id: format!("dup-{}", n + 1),
            records: group.members.iter().map(|&i| pool[i].clone()).collect(),
            similarity_score: group.max_score,
            matching_fields: group.fields,
            resolution: Resolution::Pending,
        })
        .collect();

    debug!(
        pool = pool.len(),
        groups = groups.len(),
        threshold,
        "duplicate detection finished"
    );
    groups
}
