//! Clusters of records suspected to describe the same person.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::field::FieldName;
use crate::record::Record;

/// Reviewer decision on a duplicate group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Pending,
    Merged,
    KeptSeparate,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    /// Stable within one detection run: `dup-<n>` in pool order.
    pub id: String,
    pub records: Vec<Record>,
    /// Highest pairwise score inside the group.
    pub similarity_score: f64,
    /// Union of the fields matched across the group's pairs.
    pub matching_fields: BTreeSet<FieldName>,
    pub resolution: Resolution,
}

impl DuplicateGroup {
    pub fn record_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply a reviewer's decision.
    pub fn resolve(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }
}
