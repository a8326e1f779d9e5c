//! `TopKHeap` is the bounded min-heap, ordered so the weakest element
//! (`support` asc, tied-broken by `probability` asc) sits on top, that both
//! holds the running result set and drives the dynamic threshold theta fed
//! back into [`crate::closure::ClosureEngine`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::{by_support_then_probability_desc, FrequentItemset};

/// Wraps a [`FrequentItemset`] with a total order where "greater" means
/// "better": higher support, then higher probability, then, to fix the
/// tie-break deterministically, ascending item order.
#[derive(Clone, Debug)]
struct RankedEntry(FrequentItemset);

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for RankedEntry {}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .support
            .cmp(&other.0.support)
            .then_with(|| {
                self.0
                    .probability
                    .partial_cmp(&other.0.probability)
                    .unwrap_or(Ordering::Equal)
            })
            // Final tie-break: ascending item order wins ("better").
            .then_with(|| other.0.items.cmp(&self.0.items))
    }
}

/// Bounded by `capacity`, fixed at construction.
pub struct TopKHeap {
    capacity: usize,
    heap: BinaryHeap<Reverse<RankedEntry>>,
}

impl TopKHeap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// `0` until the heap is full, then the support of the weakest element.
    pub fn min_support(&self) -> usize {
        if self.is_full() {
            self.heap.peek().map(|Reverse(e)| e.0.support).unwrap_or(0)
        } else {
            0
        }
    }

    /// Succeeds iff the heap isn't full yet, or `fi` outranks the current
    /// weakest element (which is then displaced).
    pub fn insert(&mut self, fi: FrequentItemset) -> bool {
        let candidate = RankedEntry(fi);
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return true;
        }
        let worst = match self.heap.peek() {
            Some(Reverse(e)) => e,
            None => return false,
        };
        if candidate > *worst {
            self.heap.pop();
            self.heap.push(Reverse(candidate));
            true
        } else {
            false
        }
    }

    /// Drain into `(support desc, probability desc)` order.
    pub fn drain(self) -> Vec<FrequentItemset> {
        let mut items: Vec<FrequentItemset> = self.heap.into_iter().map(|Reverse(e)| e.0).collect();
        items.sort_by(by_support_then_probability_desc);
        items
    }
}
