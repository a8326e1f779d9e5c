//! `MiningPipeline` is the fixed three-phase template. Phase 1 populates
//! the cache with all singletons in parallel; Phase 2 checks their closure,
//! seeds the top-K, and builds the two auxiliary arrays; Phase 3 drains the
//! frontier. All mutable run state is constructed here and discarded when
//! `mine()` returns: a pipeline instance is not reentrant.

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::cache::PatternCache;
use crate::calculator::SupportCalculator;
use crate::closure::{ClosureEngine, MiningContext};
use crate::database::Database;
use crate::error::{MiningError, Result};
use crate::frontier::{build_frontier, Frontier, StrategyKind};
use crate::item::ItemId;
use crate::itemset::Itemset;
use crate::pruning::PruningProfile;
use crate::topk::TopKHeap;
use crate::types::{CachedFrequentItemset, FrequentItemset};

/// Items in `[0,V)` below this count run Phase 1 sequentially; the rayon
/// fan-out overhead isn't worth it for tiny vocabularies.
const PARALLEL_THRESHOLD: usize = 8;

pub struct MiningPipeline<'a> {
    database: &'a dyn Database,
    calculator: Box<dyn SupportCalculator>,
    k: usize,
    strategy: StrategyKind,
    pruning: PruningProfile,
}

impl<'a> MiningPipeline<'a> {
    pub fn new(
        database: &'a dyn Database,
        calculator: Box<dyn SupportCalculator>,
        k: usize,
        strategy: StrategyKind,
        pruning: PruningProfile,
    ) -> Result<Self> {
        if k < 1 {
            return Err(MiningError::InvalidK(k));
        }
        if database.size() == 0 {
            return Err(MiningError::EmptyDatabase);
        }
        Ok(Self {
            database,
            calculator,
            k,
            strategy,
            pruning,
        })
    }

    /// Run Phases 1->2->3 and return the closed top-K, sorted
    /// `(support desc, probability desc)`.
    #[instrument(skip(self), fields(v = self.database.vocabulary().size(), n = self.database.size(), k = self.k))]
    pub fn mine(&self) -> Vec<FrequentItemset> {
        let v = self.database.vocabulary().size();
        let singleton_itemsets: Vec<Itemset> = (0..v as u32).map(Itemset::singleton).collect();

        let mut cache = self.phase1_singletons(v);
        info!(cached = cache.len(), "phase1_singletons complete");

        let (mut topk, frequent_items, item_support, sorted_singletons, mut frontier) =
            self.phase2_seed(&mut cache, v, &singleton_itemsets);
        info!(
            frequent_items = frequent_items.len(),
            frontier_size = frontier.size(),
            "phase2_seed complete"
        );

        self.phase3_drain(
            &mut cache,
            &mut topk,
            &frequent_items,
            &item_support,
            &sorted_singletons,
            &singleton_itemsets,
            frontier.as_mut(),
        );
        info!("phase3_drain complete");

        topk.drain()
    }

    /// Phase 1: every item's tidset and probabilistic support, computed
    /// independently and thus embarrassingly parallel.
    #[instrument(skip(self))]
    fn phase1_singletons(&self, v: usize) -> PatternCache {
        let computed: Vec<Option<(ItemId, CachedFrequentItemset)>> = if v < PARALLEL_THRESHOLD {
            (0..v as u32).map(|i| self.compute_singleton(i)).collect()
        } else {
            (0..v as u32)
                .into_par_iter()
                .map(|i| self.compute_singleton(i))
                .collect()
        };

        let mut cache = PatternCache::new();
        for (item, cached) in computed.into_iter().flatten() {
            cache.insert(Itemset::singleton(item), cached);
        }
        cache
    }

    fn compute_singleton(&self, item: ItemId) -> Option<(ItemId, CachedFrequentItemset)> {
        let itemset = Itemset::singleton(item);
        let tidset = self.database.tidset(&itemset);
        if tidset.is_empty() {
            return None;
        }
        let (support, probability) = self.calculator.compute_tidset(&tidset, self.database.size());
        Some((item, CachedFrequentItemset::new(support, probability, tidset)))
    }

    /// Phase 2: seed the top-K from closed singletons, then seed the
    /// frontier with every cached 2-itemset surviving the dynamic minimum
    /// support.
    #[instrument(skip(self, cache, singleton_itemsets))]
    fn phase2_seed(
        &self,
        cache: &mut PatternCache,
        v: usize,
        singleton_itemsets: &[Itemset],
    ) -> (TopKHeap, Vec<ItemId>, Vec<usize>, Vec<ItemId>, Box<dyn Frontier>) {
        let sorted_singletons = sorted_singletons(cache, v);
        let item_support: Vec<usize> = (0..v)
            .map(|i| cache.get(&singleton_itemsets[i]).map(|c| c.support).unwrap_or(0))
            .collect();

        let mut topk = TopKHeap::new(self.k);
        let mut minsup = 0usize;

        for &item in &sorted_singletons {
            let support = item_support[item as usize];
            if self.pruning.p1 && topk.is_full() && support < minsup {
                break; // P1a
            }

            let mut ctx = MiningContext {
                database: self.database,
                calculator: self.calculator.as_ref(),
                cache: &mut *cache,
                pruning: self.pruning,
                sorted_singletons: &sorted_singletons,
                frequent_items: &[],
                item_support: &item_support,
                singleton_itemsets,
            };
            let closed = ClosureEngine::check_closure_singleton(&mut ctx, item, support, minsup);

            if closed && support >= 1 {
                let probability = cache.get(&singleton_itemsets[item as usize]).unwrap().probability;
                let fi = FrequentItemset::new(singleton_itemsets[item as usize].clone(), support, probability);
                if topk.insert(fi) && topk.is_full() {
                    minsup = topk.min_support();
                }
            }
        }

        let frequent_items: Vec<ItemId> = sorted_singletons
            .iter()
            .copied()
            .filter(|&i| item_support[i as usize] >= minsup)
            .collect();

        let seeds: Vec<FrequentItemset> = cache
            .iter()
            .filter(|(items, _)| items.len() == 2)
            .filter(|(_, cached)| cached.support >= 1 && cached.support >= minsup)
            .map(|(items, cached)| FrequentItemset::new(items.clone(), cached.support, cached.probability))
            .collect();

        let mut frontier = build_frontier(self.strategy);
        frontier.seed(seeds);

        (topk, frequent_items, item_support, sorted_singletons, frontier)
    }

    /// Phase 3: drain the frontier, checking closure and re-pushing viable
    /// extensions until empty.
    #[instrument(skip_all)]
    #[allow(clippy::too_many_arguments)]
    fn phase3_drain(
        &self,
        cache: &mut PatternCache,
        topk: &mut TopKHeap,
        frequent_items: &[ItemId],
        item_support: &[usize],
        sorted_singletons: &[ItemId],
        singleton_itemsets: &[Itemset],
        frontier: &mut dyn Frontier,
    ) {
        while let Some(x) = frontier.pop() {
            let theta = topk.min_support();
            if x.support < theta && self.pruning.p2 {
                if frontier.supports_early_termination() {
                    break; // P2b: best-first's order guarantees the rest also fail.
                } else {
                    continue; // P2a: DFS/BFS only skip this one candidate.
                }
            }

            let top_k_is_full = topk.is_full();
            let mut ctx = MiningContext {
                database: self.database,
                calculator: self.calculator.as_ref(),
                cache: &mut *cache,
                pruning: self.pruning,
                sorted_singletons,
                frequent_items,
                item_support,
                singleton_itemsets,
            };
            let (is_closed, extensions) = ClosureEngine::check_closure_and_generate_extensions(
                &mut ctx,
                &x.items,
                x.support,
                theta,
                top_k_is_full,
            );

            if is_closed && x.support >= 1 {
                topk.insert(x);
            }

            let theta2 = topk.min_support();
            for e in extensions {
                if e.support >= 1 && (!self.pruning.p2 || e.support >= theta2) {
                    frontier.push(e);
                }
            }
        }
    }
}

/// Non-empty singletons sorted `(support desc, probability desc, item id
/// asc)`, the deterministic order Phase 2 must observe.
fn sorted_singletons(cache: &PatternCache, v: usize) -> Vec<ItemId> {
    let mut items: Vec<ItemId> = (0..v as u32)
        .filter(|&i| cache.contains(&Itemset::singleton(i)))
        .collect();
    items.sort_by(|&a, &b| {
        let ca = cache.get(&Itemset::singleton(a)).unwrap();
        let cb = cache.get(&Itemset::singleton(b)).unwrap();
        cb.support
            .cmp(&ca.support)
            .then_with(|| cb.probability.partial_cmp(&ca.probability).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.cmp(&b))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::DirectConvolutionCalculator;
    use crate::database::{InMemoryDatabase, Transaction};
    use crate::frontier::StrategyKind;
    use crate::vocabulary::Vocabulary;

    fn mine_with(
        db: &InMemoryDatabase,
        tau: f64,
        k: usize,
        strategy: StrategyKind,
        pruning: PruningProfile,
    ) -> Vec<FrequentItemset> {
        let calc = Box::new(DirectConvolutionCalculator::new(tau).unwrap());
        let pipeline = MiningPipeline::new(db, calc, k, strategy, pruning).unwrap();
        pipeline.mine()
    }

    #[test]
    fn constructor_rejects_k_zero() {
        let vocab = Vocabulary::from_names(["a"]);
        let db = InMemoryDatabase::new(vec![Transaction::from_pairs(vec![(0, 1.0)])], vocab);
        let calc = Box::new(DirectConvolutionCalculator::new(0.5).unwrap());
        let err = MiningPipeline::new(&db, calc, 0, StrategyKind::BestFirst, PruningProfile::default())
            .unwrap_err();
        assert!(matches!(err, MiningError::InvalidK(0)));
    }

    #[test]
    fn constructor_rejects_empty_database() {
        let vocab = Vocabulary::from_names(["a"]);
        let db = InMemoryDatabase::new(vec![], vocab);
        let calc = Box::new(DirectConvolutionCalculator::new(0.5).unwrap());
        let err = MiningPipeline::new(&db, calc, 1, StrategyKind::BestFirst, PruningProfile::default())
            .unwrap_err();
        assert!(matches!(err, MiningError::EmptyDatabase));
    }

    #[test]
    fn scenario_a_trivial_certainty() {
        let vocab = Vocabulary::from_names(["a", "b"]);
        let transactions: Vec<_> = (0..3)
            .map(|_| Transaction::from_pairs(vec![(0, 1.0), (1, 1.0)]))
            .collect();
        let db = InMemoryDatabase::new(transactions, vocab);
        let result = mine_with(&db, 0.5, 3, StrategyKind::BestFirst, PruningProfile::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].items.as_slice(), &[0, 1]);
        assert_eq!(result[0].support, 3);
        assert!((result[0].probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_b_minimum_viable_support() {
        let vocab = Vocabulary::from_names(["a", "b"]);
        let transactions = vec![
            Transaction::from_pairs(vec![(0, 0.5), (1, 0.5)]),
            Transaction::from_pairs(vec![(0, 0.5)]),
            Transaction::from_pairs(vec![(0, 0.5)]),
        ];
        let db = InMemoryDatabase::new(transactions, vocab);
        let result = mine_with(&db, 0.5, 2, StrategyKind::BestFirst, PruningProfile::default());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].items.as_slice(), &[0]);
        assert_eq!(result[0].support, 2);
        assert_eq!(result[1].items.as_slice(), &[1]);
        assert_eq!(result[1].support, 1);
    }

    #[test]
    fn zero_support_itemsets_never_pad_the_result() {
        let vocab = Vocabulary::from_names(["a"]);
        let db = InMemoryDatabase::new(vec![Transaction::from_pairs(vec![(0, 0.3)])], vocab);
        let result = mine_with(&db, 0.5, 5, StrategyKind::BestFirst, PruningProfile::default());
        assert!(result.is_empty(), "support-0 {{a}} leaked into the result: {result:?}");

        let vocab = Vocabulary::from_names(["a", "b"]);
        let db = InMemoryDatabase::new(
            vec![Transaction::from_pairs(vec![(0, 0.3), (1, 0.3)])],
            vocab,
        );
        let result = mine_with(&db, 0.9, 5, StrategyKind::BestFirst, PruningProfile::default());
        assert!(result.is_empty(), "support-0 {{a,b}} leaked into the result: {result:?}");
    }

    #[test]
    fn scenario_e_empty_transactions_yield_empty_result() {
        let vocab = Vocabulary::from_names(["a", "b"]);
        let transactions = vec![Transaction::from_pairs(vec![]), Transaction::from_pairs(vec![])];
        let db = InMemoryDatabase::new(transactions, vocab);
        let result = mine_with(&db, 0.7, 5, StrategyKind::BestFirst, PruningProfile::default());
        assert!(result.is_empty());
    }

    #[test]
    fn strategies_agree_on_small_random_database() {
        use rand::{Rng, SeedableRng};

        let v = 6usize;
        let n = 20usize;
        let vocab = Vocabulary::from_names((0..v).map(|i| format!("i{i}")));
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);
        let transactions: Vec<_> = (0..n)
            .map(|_| {
                let entries: Vec<_> = (0..v as u32)
                    .filter_map(|item| {
                        let p = 0.1 + rng.gen::<f64>() * 0.8;
                        if p > 0.15 {
                            Some((item, p))
                        } else {
                            None
                        }
                    })
                    .collect();
                Transaction::from_pairs(entries)
            })
            .collect();
        let db = InMemoryDatabase::new(transactions, vocab);

        let bf = mine_with(&db, 0.5, 5, StrategyKind::BestFirst, PruningProfile::default());
        let dfs = mine_with(&db, 0.5, 5, StrategyKind::Dfs, PruningProfile::default());
        let bfs = mine_with(&db, 0.5, 5, StrategyKind::Bfs, PruningProfile::default());

        let key = |r: &[FrequentItemset]| -> Vec<(Vec<u32>, usize)> {
            r.iter().map(|f| (f.items.as_slice().to_vec(), f.support)).collect()
        };
        assert_eq!(key(&bf), key(&dfs));
        assert_eq!(key(&bf), key(&bfs));
    }
}
