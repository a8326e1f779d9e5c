//! `PatternCache` memoizes `Itemset -> (support, probability, tidset)` for
//! one mining run. It is grown-only: nothing is ever invalidated or evicted,
//! and after Phase 1 it is accessed single-threaded.

use std::collections::HashMap;

use crate::itemset::Itemset;
use crate::types::CachedFrequentItemset;

#[derive(Default)]
pub struct PatternCache {
    entries: HashMap<Itemset, CachedFrequentItemset>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, items: &Itemset) -> Option<&CachedFrequentItemset> {
        self.entries.get(items)
    }

    pub fn contains(&self, items: &Itemset) -> bool {
        self.entries.contains_key(items)
    }

    /// Insert or overwrite the entry for `items`. The cache never needs true
    /// invalidation, but a caller may legitimately recompute and re-insert
    /// the same key (e.g. P6's placeholder `(0,0)` entry is never
    /// overwritten since a tidset-size cutoff is final).
    pub fn insert(&mut self, items: Itemset, value: CachedFrequentItemset) {
        self.entries.insert(items, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Itemset, &CachedFrequentItemset)> {
        self.entries.iter()
    }

    /// Merge another cache's entries into this one, keeping this cache's
    /// entry on key collision. Used to fold per-worker shards built during
    /// Phase 1's parallel fan-out back into a single cache.
    pub fn merge(&mut self, other: PatternCache) {
        for (k, v) in other.entries {
            self.entries.entry(k).or_insert(v);
        }
    }
}
