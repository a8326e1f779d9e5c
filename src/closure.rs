//! `ClosureEngine` is the closure check for singletons and the combined
//! closure-check-and-extend step the Phase 3 frontier drain repeats for
//! every candidate. Pruning rules P1-P7 are shortcuts only: disabling any
//! subset must fall back to the unconditional-work path and still produce
//! the same closure/extension decisions.

use tracing::trace;

use crate::cache::PatternCache;
use crate::database::Database;
use crate::item::ItemId;
use crate::itemset::Itemset;
use crate::calculator::SupportCalculator;
use crate::pruning::PruningProfile;
use crate::tidset::Tidset;
use crate::types::{CachedFrequentItemset, FrequentItemset};

/// Borrowed run-scoped state the closure engine needs: the database and
/// calculator it was constructed with, the grown-only cache, the pruning
/// profile, and the two auxiliary arrays Phase 2 builds.
pub struct MiningContext<'a> {
    pub database: &'a dyn Database,
    pub calculator: &'a dyn SupportCalculator,
    pub cache: &'a mut PatternCache,
    pub pruning: PruningProfile,
    /// All non-empty singletons, sorted `(support desc, probability desc,
    /// item asc)`, built once in Phase 1, used only by
    /// `check_closure_singleton`.
    pub sorted_singletons: &'a [ItemId],
    /// Items passing the dynamic minimum support, sorted by support
    /// descending, built in Phase 2, used only by
    /// `check_closure_and_generate_extensions`.
    pub frequent_items: &'a [ItemId],
    /// `item_support[i]` is the cached support of `{i}`, or 0 if `{i}` was
    /// never frequent enough to be cached.
    pub item_support: &'a [usize],
    /// `singleton_itemsets[i] == Itemset::singleton(i)`, precomputed so
    /// union/cache-lookup sites never re-allocate the key.
    pub singleton_itemsets: &'a [Itemset],
}

pub struct ClosureEngine;

impl ClosureEngine {
    /// Is the singleton `{item}` (support `s_a`) closed? As a side effect,
    /// every 2-itemset `{item,b}` with `support({b}) >= min_sup` is cached,
    /// matching the threshold Phase 2's seeding step uses so a pair is
    /// cached exactly when it could later be seeded.
    pub fn check_closure_singleton(
        ctx: &mut MiningContext,
        item: ItemId,
        s_a: usize,
        min_sup: usize,
    ) -> bool {
        let mut is_closed = true;
        for &b in ctx.sorted_singletons {
            if b == item {
                continue;
            }
            let s_b = ctx.item_support[b as usize];
            if ctx.pruning.p1 && s_b < s_a {
                // P1b: no later candidate (support non-increasing) can equal s_a.
                break;
            }

            let pair_key = pair_key(item, b);
            let (s_pair, p_pair, tidset_pair) = pair_support(ctx, item, b, &pair_key);

            if s_b >= min_sup && !ctx.cache.contains(&pair_key) {
                ctx.cache.insert(
                    pair_key,
                    CachedFrequentItemset::new(s_pair, p_pair, tidset_pair),
                );
            }

            if s_pair == s_a {
                is_closed = false;
            }
        }
        is_closed
    }

    /// Is `X` (cached support `s_x`) closed, and which canonical supersets
    /// should be enqueued as Phase 3 candidates?
    pub fn check_closure_and_generate_extensions(
        ctx: &mut MiningContext,
        x: &Itemset,
        s_x: usize,
        theta: usize,
        top_k_is_full: bool,
    ) -> (bool, Vec<FrequentItemset>) {
        let mut is_closed = true;
        let mut closure_checking_done = false;
        let mut extensions = Vec::new();
        let max_item = x.max_item();

        for &i in ctx.frequent_items {
            if x.contains(i) {
                continue;
            }
            let s_i = ctx.item_support[i as usize];

            // P3 - item-support cutoff: frequent_items is support-descending.
            if ctx.pruning.p3 && s_i < theta {
                break;
            }

            if !closure_checking_done && s_i < s_x {
                closure_checking_done = true;
            }

            let mut need_closure_check = !closure_checking_done && is_closed;
            let need_extension = max_item.map(|m| i > m).unwrap_or(true);

            // P4 - subset upper bound.
            let mut ub = s_x.min(s_i);
            if ctx.pruning.p4 && top_k_is_full && need_extension {
                for e in x.iter() {
                    let key = pair_key(e, i);
                    if let Some(cached) = ctx.cache.get(&key) {
                        ub = ub.min(cached.support);
                        if ub < theta {
                            break;
                        }
                    }
                }
            }

            // P5 - upper-bound filter.
            let can_enter = !ctx.pruning.p5 || ub >= theta;
            let should_extend = need_extension && can_enter;

            if !need_closure_check && !should_extend {
                continue;
            }

            // `i` is only guaranteed to be the canonical (greater-than-max)
            // extension when `need_extension` holds; a closure-only check
            // can visit an `i` below `max_item(x)`, so build the key with a
            // canonical union there instead of the append-only fast path.
            let xe = if need_extension {
                x.extended_with(i)
            } else {
                x.union(&ctx.singleton_itemsets[i as usize])
            };
            let (s_xe, p_xe) = match ctx.cache.get(&xe) {
                Some(cached) => (cached.support, cached.probability),
                None => {
                    let tidset_xe = extension_tidset(ctx, x, &xe, i);

                    // P6 - tidset-size cutoff.
                    let m = tidset_xe.len();
                    if ctx.pruning.p6 && m < theta && !need_closure_check {
                        ctx.cache
                            .insert(xe.clone(), CachedFrequentItemset::new(0, 0.0, tidset_xe));
                        trace!(?xe, "P6 tidset-size cutoff");
                        continue;
                    }

                    // P7 - tidset-based closure shortcut: supp(Xe) <= m < s_x,
                    // so Xe cannot violate closure against X.
                    if ctx.pruning.p7 && need_closure_check && m < s_x {
                        if !should_extend {
                            continue;
                        }
                        need_closure_check = false;
                    }

                    let (s, p) = ctx.calculator.compute_tidset(&tidset_xe, ctx.database.size());
                    ctx.cache
                        .insert(xe.clone(), CachedFrequentItemset::new(s, p, tidset_xe));
                    (s, p)
                }
            };

            if need_closure_check && s_xe == s_x {
                is_closed = false;
            }

            if should_extend {
                extensions.push(FrequentItemset::new(xe, s_xe, p_xe));
            }
        }

        (is_closed, extensions)
    }
}

fn pair_key(a: ItemId, b: ItemId) -> Itemset {
    Itemset::from_items(vec![a, b])
}

/// Support/probability/tidset of `{a,b}`: cache hit, or computed from the
/// two cached singletons' tidsets (both always cached after Phase 1).
fn pair_support(
    ctx: &MiningContext,
    a: ItemId,
    b: ItemId,
    pair_key: &Itemset,
) -> (usize, f64, Tidset) {
    if let Some(cached) = ctx.cache.get(pair_key) {
        return (cached.support, cached.probability, cached.tidset.clone());
    }
    let tidset_a = ctx
        .cache
        .get(&ctx.singleton_itemsets[a as usize])
        .map(|c| c.tidset.clone());
    let tidset_b = ctx
        .cache
        .get(&ctx.singleton_itemsets[b as usize])
        .map(|c| c.tidset.clone());
    let tidset = match (tidset_a, tidset_b) {
        (Some(ta), Some(tb)) => ta.intersect(&tb),
        _ => ctx.database.tidset(pair_key),
    };
    let (s, p) = ctx.calculator.compute_tidset(&tidset, ctx.database.size());
    (s, p, tidset)
}

/// Tidset of `Xe = X u {i}`: intersect X's and `{i}`'s cached tidsets,
/// falling back to a direct database lookup only if either parent is
/// missing from the cache.
fn extension_tidset(ctx: &MiningContext, x: &Itemset, xe: &Itemset, i: ItemId) -> Tidset {
    let tidset_x = ctx.cache.get(x).map(|c| c.tidset.clone());
    let tidset_i = ctx
        .cache
        .get(&ctx.singleton_itemsets[i as usize])
        .map(|c| c.tidset.clone());
    match (tidset_x, tidset_i) {
        (Some(tx), Some(ti)) => tx.intersect(&ti),
        _ => ctx.database.tidset(xe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::DirectConvolutionCalculator;
    use crate::database::{Database, InMemoryDatabase, Transaction};
    use crate::vocabulary::Vocabulary;

    fn certain_db(n: usize, v: usize) -> InMemoryDatabase {
        let vocab = Vocabulary::from_names((0..v).map(|i| format!("i{i}")));
        let transactions = (0..n)
            .map(|_| Transaction::from_pairs((0..v as u32).map(|i| (i, 1.0)).collect()))
            .collect();
        InMemoryDatabase::new(transactions, vocab)
    }

    fn seeded_cache(db: &InMemoryDatabase, calc: &dyn SupportCalculator) -> (PatternCache, Vec<Itemset>, Vec<usize>) {
        let v = db.vocabulary().size();
        let mut cache = PatternCache::new();
        let mut singleton_itemsets = Vec::with_capacity(v);
        let mut item_support = vec![0usize; v];
        for i in 0..v as u32 {
            let s = Itemset::singleton(i);
            let tidset = db.tidset(&s);
            let (sup, prob) = calc.compute_tidset(&tidset, db.size());
            item_support[i as usize] = sup;
            cache.insert(s.clone(), CachedFrequentItemset::new(sup, prob, tidset));
            singleton_itemsets.push(s);
        }
        (cache, singleton_itemsets, item_support)
    }

    #[test]
    fn scenario_a_singleton_is_not_closed_when_pair_matches_support() {
        // {a,b} both present with probability 1 in all 3 transactions:
        // support({a,b}) == support({a}) == 3, so {a} is not closed.
        let db = certain_db(3, 2);
        let calc = DirectConvolutionCalculator::new(0.5).unwrap();
        let (mut cache, singletons, item_support) = seeded_cache(&db, &calc);
        let sorted_singletons = vec![0u32, 1];
        let mut ctx = MiningContext {
            database: &db,
            calculator: &calc,
            cache: &mut cache,
            pruning: PruningProfile::all_enabled(),
            sorted_singletons: &sorted_singletons,
            frequent_items: &[],
            item_support: &item_support,
            singleton_itemsets: &singletons,
        };
        let closed = ClosureEngine::check_closure_singleton(&mut ctx, 0, 3, 0);
        assert!(!closed);
    }

    #[test]
    fn closure_holds_when_no_equal_support_pair_exists() {
        // {b} has lower support than {a}, so {a} stays closed against it.
        let vocab = Vocabulary::from_names(["a", "b"]);
        let transactions = vec![
            Transaction::from_pairs(vec![(0, 1.0), (1, 1.0)]),
            Transaction::from_pairs(vec![(0, 1.0)]),
            Transaction::from_pairs(vec![(0, 1.0)]),
        ];
        let db = InMemoryDatabase::new(transactions, vocab);
        let calc = DirectConvolutionCalculator::new(0.5).unwrap();
        let (mut cache, singletons, item_support) = seeded_cache(&db, &calc);
        let sorted_singletons = vec![0u32, 1];
        let mut ctx = MiningContext {
            database: &db,
            calculator: &calc,
            cache: &mut cache,
            pruning: PruningProfile::all_enabled(),
            sorted_singletons: &sorted_singletons,
            frequent_items: &[],
            item_support: &item_support,
            singleton_itemsets: &singletons,
        };
        let closed = ClosureEngine::check_closure_singleton(&mut ctx, 0, 3, 0);
        assert!(closed);
    }

    #[test]
    fn pruning_subset_does_not_change_closure_verdict() {
        let db = certain_db(4, 3);
        let calc = DirectConvolutionCalculator::new(0.5).unwrap();
        for mask in [0u8, 0x2A, 0x7F] {
            let (mut cache, singletons, item_support) = seeded_cache(&db, &calc);
            let sorted_singletons = vec![0u32, 1, 2];
            let mut ctx = MiningContext {
                database: &db,
                calculator: &calc,
                cache: &mut cache,
                pruning: PruningProfile::from_bitmask(mask),
                sorted_singletons: &sorted_singletons,
                frequent_items: &[],
                item_support: &item_support,
                singleton_itemsets: &singletons,
            };
            let closed = ClosureEngine::check_closure_singleton(&mut ctx, 0, item_support[0], 0);
            assert!(!closed, "mask {mask:#x}: {{a}} should never be closed in an all-certain db with >=2 items");
        }
    }
}
