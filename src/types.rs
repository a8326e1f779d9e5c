//! Shared value types produced and consumed across the pipeline.

use crate::itemset::Itemset;
use crate::tidset::Tidset;

/// An itemset annotated with its probabilistic support and tail probability.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequentItemset {
    pub items: Itemset,
    pub support: usize,
    pub probability: f64,
}

impl FrequentItemset {
    pub fn new(items: Itemset, support: usize, probability: f64) -> Self {
        Self {
            items,
            support,
            probability,
        }
    }
}

/// A [`FrequentItemset`] plus the owned tidset it was computed from: the
/// value type stored in the [`crate::cache::PatternCache`].
#[derive(Clone, Debug)]
pub struct CachedFrequentItemset {
    pub support: usize,
    pub probability: f64,
    pub tidset: Tidset,
}

impl CachedFrequentItemset {
    pub fn new(support: usize, probability: f64, tidset: Tidset) -> Self {
        Self {
            support,
            probability,
            tidset,
        }
    }

    pub fn as_frequent_itemset(&self, items: Itemset) -> FrequentItemset {
        FrequentItemset::new(items, self.support, self.probability)
    }
}

/// Sort order used for the pipeline's final output and for `TopKHeap::drain`:
/// `(support desc, probability desc)`.
pub fn by_support_then_probability_desc(a: &FrequentItemset, b: &FrequentItemset) -> std::cmp::Ordering {
    b.support
        .cmp(&a.support)
        .then_with(|| b.probability.partial_cmp(&a.probability).unwrap_or(std::cmp::Ordering::Equal))
}
