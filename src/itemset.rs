//! `Itemset` is a canonical, densely-encoded set of item ids. An ascending
//! sorted-array representation is used throughout, which stays cache
//! friendly when the vocabulary is much larger than a typical itemset and
//! also gives a natural total order used for deterministic tie-breaking in
//! [`crate::topk`].

use std::cmp::Ordering;

use crate::item::ItemId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Itemset {
    items: Vec<ItemId>,
}

impl Itemset {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn singleton(item: ItemId) -> Self {
        Self { items: vec![item] }
    }

    /// Build from an arbitrary slice, sorting and deduplicating it into
    /// canonical ascending order.
    pub fn from_items(mut items: Vec<ItemId>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items.binary_search(&item).is_ok()
    }

    /// Ascending iteration, canonical order, identical for equal itemsets.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[ItemId] {
        &self.items
    }

    pub fn max_item(&self) -> Option<ItemId> {
        self.items.last().copied()
    }

    pub fn union(&self, other: &Itemset) -> Itemset {
        let mut merged = Vec::with_capacity(self.items.len() + other.items.len());
        let (mut i, mut j) = (0, 0);
        while i < self.items.len() && j < other.items.len() {
            match self.items[i].cmp(&other.items[j]) {
                Ordering::Less => {
                    merged.push(self.items[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.items[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(self.items[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.items[i..]);
        merged.extend_from_slice(&other.items[j..]);
        Itemset { items: merged }
    }

    /// Insert `item`, which the caller guarantees is the canonical
    /// extension (`item > max_item()`): the hot path used by
    /// [`crate::closure::ClosureEngine::check_closure_and_generate_extensions`]
    /// when extending, not closure-checking. Use [`Itemset::union`] instead
    /// when `item` is not known to be greater than every item already present.
    pub fn extended_with(&self, item: ItemId) -> Itemset {
        debug_assert!(self.max_item().map(|m| item > m).unwrap_or(true));
        let mut items = self.items.clone();
        items.push(item);
        Itemset { items }
    }
}

impl PartialOrd for Itemset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Itemset {
    /// Lexicographic on the ascending item sequence, shorter-is-smaller when
    /// one is a prefix of the other. Used only to fix a deterministic
    /// tie-break for otherwise-equally-ranked top-K candidates; it is not a
    /// subset relation.
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.cmp(&other.items)
    }
}
