//! The pluggable Phase 3 worklist. Best-first, DFS and BFS all share Phases
//! 1/2 and the closure engine and must yield identical closed top-K sets:
//! they only differ in processing order and in whether Phase 3 may
//! terminate early.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::types::FrequentItemset;

/// Strategy-selection entry point used by [`crate::factory::MinerFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    BestFirst,
    Dfs,
    Bfs,
}

/// `push`/`pop`/`size`, plus whether this strategy allows Phase 3 to stop
/// the whole drain loop as soon as one candidate fails theta (only
/// best-first can: its ordering guarantees every remaining candidate also
/// fails).
pub trait Frontier {
    fn push(&mut self, fi: FrequentItemset);
    fn pop(&mut self) -> Option<FrequentItemset>;
    fn size(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
    fn supports_early_termination(&self) -> bool;

    /// Seed the frontier with Phase 2's surviving 2-itemsets, in the order
    /// this strategy needs so that within one draining step higher-support
    /// candidates are processed earlier.
    fn seed(&mut self, seeds: Vec<FrequentItemset>);
}

#[derive(Clone)]
struct BestFirstEntry(FrequentItemset);

impl PartialEq for BestFirstEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for BestFirstEntry {}
impl PartialOrd for BestFirstEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BestFirstEntry {
    /// `(support desc, size asc, probability desc)`: a max-heap on this
    /// order puts the best candidate on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .support
            .cmp(&other.0.support)
            .then_with(|| other.0.items.len().cmp(&self.0.items.len()))
            .then_with(|| {
                self.0
                    .probability
                    .partial_cmp(&other.0.probability)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.0.items.cmp(&other.0.items))
    }
}

/// Priority queue ordered by `(support desc, size asc, probability desc)`.
/// Recommended for production; supports Phase 3 early termination (P2b).
#[derive(Default)]
pub struct BestFirstFrontier {
    heap: BinaryHeap<BestFirstEntry>,
}

impl BestFirstFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for BestFirstFrontier {
    fn push(&mut self, fi: FrequentItemset) {
        self.heap.push(BestFirstEntry(fi));
    }

    fn pop(&mut self) -> Option<FrequentItemset> {
        self.heap.pop().map(|e| e.0)
    }

    fn size(&self) -> usize {
        self.heap.len()
    }

    fn supports_early_termination(&self) -> bool {
        true
    }

    fn seed(&mut self, seeds: Vec<FrequentItemset>) {
        for s in seeds {
            self.push(s);
        }
    }
}

/// LIFO stack. Seeds and each extension batch are pushed ascending by
/// support so the highest-support candidate ends up on top. No Phase 3
/// early termination (P2a only: skip, don't stop).
#[derive(Default)]
pub struct DfsFrontier {
    stack: Vec<FrequentItemset>,
}

impl DfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for DfsFrontier {
    fn push(&mut self, fi: FrequentItemset) {
        self.stack.push(fi);
    }

    fn pop(&mut self) -> Option<FrequentItemset> {
        self.stack.pop()
    }

    fn size(&self) -> usize {
        self.stack.len()
    }

    fn supports_early_termination(&self) -> bool {
        false
    }

    fn seed(&mut self, mut seeds: Vec<FrequentItemset>) {
        seeds.sort_by(|a, b| a.support.cmp(&b.support));
        self.stack.extend(seeds);
    }
}

/// FIFO queue. Seeded in descending support. No Phase 3 early termination.
/// Tracks the maximum queue size and per-level counts reached over the
/// drain, for experiment reporting by external callers.
pub struct BfsFrontier {
    queue: VecDeque<FrequentItemset>,
    max_queue_size: usize,
    current_level_size: usize,
    next_level_size: usize,
    per_level_counts: Vec<usize>,
}

impl Default for BfsFrontier {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            max_queue_size: 0,
            current_level_size: 0,
            next_level_size: 0,
            per_level_counts: Vec::new(),
        }
    }
}

impl BfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn per_level_counts(&self) -> &[usize] {
        &self.per_level_counts
    }
}

impl Frontier for BfsFrontier {
    fn push(&mut self, fi: FrequentItemset) {
        self.queue.push_back(fi);
        self.next_level_size += 1;
        self.max_queue_size = self.max_queue_size.max(self.queue.len());
    }

    fn pop(&mut self) -> Option<FrequentItemset> {
        let popped = self.queue.pop_front();
        if popped.is_some() {
            if self.current_level_size == 0 {
                self.current_level_size = self.next_level_size;
                self.per_level_counts.push(self.current_level_size);
                self.next_level_size = 0;
            }
            self.current_level_size -= 1;
        }
        popped
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn supports_early_termination(&self) -> bool {
        false
    }

    fn seed(&mut self, mut seeds: Vec<FrequentItemset>) {
        seeds.sort_by(|a, b| b.support.cmp(&a.support));
        for s in seeds {
            self.push(s);
        }
    }
}

pub fn build_frontier(kind: StrategyKind) -> Box<dyn Frontier> {
    match kind {
        StrategyKind::BestFirst => Box::new(BestFirstFrontier::new()),
        StrategyKind::Dfs => Box::new(DfsFrontier::new()),
        StrategyKind::Bfs => Box::new(BfsFrontier::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itemset::Itemset;

    fn fi(id: u32, support: usize) -> FrequentItemset {
        FrequentItemset::new(Itemset::singleton(id), support, 1.0)
    }

    #[test]
    fn best_first_pops_highest_support_first() {
        let mut f = BestFirstFrontier::new();
        f.push(fi(0, 2));
        f.push(fi(1, 5));
        f.push(fi(2, 3));
        assert_eq!(f.pop().unwrap().support, 5);
        assert_eq!(f.pop().unwrap().support, 3);
        assert_eq!(f.pop().unwrap().support, 2);
    }

    #[test]
    fn dfs_is_lifo() {
        let mut f = DfsFrontier::new();
        f.push(fi(0, 1));
        f.push(fi(1, 2));
        assert_eq!(f.pop().unwrap().support, 2);
        assert_eq!(f.pop().unwrap().support, 1);
    }

    #[test]
    fn bfs_is_fifo() {
        let mut f = BfsFrontier::new();
        f.push(fi(0, 1));
        f.push(fi(1, 2));
        assert_eq!(f.pop().unwrap().support, 1);
        assert_eq!(f.pop().unwrap().support, 2);
    }

    #[test]
    fn bfs_tracks_max_queue_size() {
        let mut f = BfsFrontier::new();
        f.push(fi(0, 1));
        f.push(fi(1, 2));
        f.push(fi(2, 3));
        assert_eq!(f.max_queue_size(), 3);
        f.pop();
        f.push(fi(3, 4));
        assert_eq!(f.max_queue_size(), 3);
    }

    #[test]
    fn only_best_first_supports_early_termination() {
        assert!(BestFirstFrontier::new().supports_early_termination());
        assert!(!DfsFrontier::new().supports_early_termination());
        assert!(!BfsFrontier::new().supports_early_termination());
    }
}
