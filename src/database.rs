//! The one concrete dependency the core imports: a `Database` of uncertain
//! transactions over a [`Vocabulary`]. The trait is the contract;
//! [`InMemoryDatabase`] is a reference implementation used by this crate's
//! own tests and by `demos/example_usage.rs`. File loaders and parsers
//! proper remain external collaborators.

use crate::item::ItemId;
use crate::itemset::Itemset;
use crate::tidset::Tidset;
use crate::vocabulary::Vocabulary;

/// A single uncertain transaction: item ids paired with an existence
/// probability in `(0,1]`, each item appearing at most once, stored in
/// ascending item-id order so per-item lookup is a binary search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    entries: Vec<(ItemId, f64)>,
}

impl Transaction {
    /// Build from arbitrary `(item, probability)` pairs, sorting by item id.
    /// Panics if the same item appears twice: the caller (a loader, out of
    /// scope here) is responsible for de-duplicating its raw input.
    pub fn from_pairs(mut entries: Vec<(ItemId, f64)>) -> Self {
        entries.sort_unstable_by_key(|&(item, _)| item);
        for pair in entries.windows(2) {
            assert_ne!(pair[0].0, pair[1].0, "item {} appears twice in one transaction", pair[0].0);
        }
        Self { entries }
    }

    pub fn probability_of(&self, item: ItemId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&item, |&(i, _)| i)
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|&(item, _)| item)
    }
}

/// Contract the mining core requires of its input.
pub trait Database: Sync {
    fn size(&self) -> usize;
    fn vocabulary(&self) -> &Vocabulary;
    /// The sparse set of transactions where every item in `items` has a
    /// recorded probability, with per-transaction probability equal to the
    /// product of the items' probabilities. The empty itemset's tidset
    /// covers every transaction with probability 1.
    fn tidset(&self, items: &Itemset) -> Tidset;
}

/// A fixed vector of transactions plus its vocabulary, with a per-item index
/// built once so that both singleton and multi-item tidset lookups avoid a
/// full table scan.
pub struct InMemoryDatabase {
    transactions: Vec<Transaction>,
    vocabulary: Vocabulary,
    item_tidsets: Vec<Tidset>,
}

impl InMemoryDatabase {
    pub fn new(transactions: Vec<Transaction>, vocabulary: Vocabulary) -> Self {
        let v = vocabulary.size();
        let mut item_tidsets: Vec<Vec<(u32, f64)>> = vec![Vec::new(); v];
        for (tid, tx) in transactions.iter().enumerate() {
            for (item, prob) in tx.entries.iter().copied() {
                item_tidsets[item as usize].push((tid as u32, prob));
            }
        }
        let item_tidsets = item_tidsets
            .into_iter()
            .map(|entries| Tidset::try_from_sorted(entries).expect("transaction entries are built in tid order"))
            .collect();
        Self {
            transactions,
            vocabulary,
            item_tidsets,
        }
    }

    pub fn transaction(&self, tid: usize) -> &Transaction {
        &self.transactions[tid]
    }

    fn item_tidset(&self, item: ItemId) -> &Tidset {
        &self.item_tidsets[item as usize]
    }
}

impl Database for InMemoryDatabase {
    fn size(&self) -> usize {
        self.transactions.len()
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn tidset(&self, items: &Itemset) -> Tidset {
        let mut iter = items.iter();
        let Some(first) = iter.next() else {
            return Tidset::full(self.size());
        };
        let mut result = self.item_tidset(first).clone();
        for item in iter {
            result = result.intersect(self.item_tidset(item));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> InMemoryDatabase {
        let vocab = Vocabulary::from_names(["a", "b"]);
        let transactions = vec![
            Transaction::from_pairs(vec![(0, 0.5), (1, 0.5)]),
            Transaction::from_pairs(vec![(0, 0.5)]),
            Transaction::from_pairs(vec![(0, 0.5)]),
        ];
        InMemoryDatabase::new(transactions, vocab)
    }

    #[test]
    fn empty_itemset_covers_everything_with_probability_one() {
        let db = db();
        let tids = db.tidset(&Itemset::empty());
        assert_eq!(tids.len(), 3);
        assert!(tids.probabilities().all(|p| p == 1.0));
    }

    #[test]
    fn singleton_tidset_matches_transactions() {
        let db = db();
        let tids = db.tidset(&Itemset::singleton(1));
        assert_eq!(tids.iter().collect::<Vec<_>>(), vec![(0, 0.5)]);
    }

    #[test]
    fn pair_tidset_is_intersection() {
        let db = db();
        let tids = db.tidset(&Itemset::from_items(vec![0, 1]));
        assert_eq!(tids.iter().collect::<Vec<_>>(), vec![(0, 0.25)]);
    }
}
