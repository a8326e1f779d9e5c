//! `Tidset` is the sparse list of `(transaction-id, probability)` pairs an
//! itemset occurs in. Intersection is the one primitive the rest of the
//! core, especially [`crate::closure`], relies on to avoid re-scanning the
//! database for every candidate.

use crate::error::{MiningError, Result};

/// Numerical floor below which a probability is treated as impossible.
/// Shared with [`crate::calculator::MIN_PROB`]: one constant governs
/// underflow clamping across the calculator and the singleton filter.
pub const MIN_PROB: f64 = 1e-12;

/// Sparse `(tid, prob)` pairs in strictly ascending `tid` order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tidset {
    entries: Vec<(u32, f64)>,
}

impl Tidset {
    /// Build a `Tidset` from already-sorted, already-validated entries.
    /// Entries with probability `<= MIN_PROB` are dropped: a tidset
    /// probability at or below the numerical floor is collapsed to zero.
    pub fn try_from_sorted(entries: Vec<(u32, f64)>) -> Result<Self> {
        let mut last: Option<u32> = None;
        for &(tid, prob) in &entries {
            if !(0.0..=1.0).contains(&prob) || prob <= 0.0 {
                return Err(MiningError::InvalidData(format!(
                    "tidset probability {prob} for tid {tid} is outside (0,1]"
                )));
            }
            if let Some(prev) = last {
                if tid <= prev {
                    return Err(MiningError::InvalidData(format!(
                        "tidset tid ordering is non-monotonic at tid {tid} (previous {prev})"
                    )));
                }
            }
            last = Some(tid);
        }
        let entries = entries.into_iter().filter(|&(_, p)| p > MIN_PROB).collect();
        Ok(Self { entries })
    }

    /// A tidset covering every transaction `0..n` with probability 1, the
    /// tidset of the empty itemset.
    pub fn full(n: usize) -> Self {
        Self {
            entries: (0..n as u32).map(|tid| (tid, 1.0)).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, p)| p)
    }

    /// Linear-merge intersection: surviving tids carry the product of the
    /// two inputs' probabilities.
    pub fn intersect(&self, other: &Tidset) -> Tidset {
        let mut result = Vec::with_capacity(self.entries.len().min(other.entries.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, pa) = self.entries[i];
            let (tb, pb) = other.entries[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let p = pa * pb;
                    if p > MIN_PROB {
                        result.push((ta, p));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        Tidset { entries: result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_monotonic_tids() {
        let err = Tidset::try_from_sorted(vec![(2, 0.5), (1, 0.5)]).unwrap_err();
        assert!(matches!(err, MiningError::InvalidData(_)));
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let err = Tidset::try_from_sorted(vec![(0, 1.5)]).unwrap_err();
        assert!(matches!(err, MiningError::InvalidData(_)));
    }

    #[test]
    fn intersect_multiplies_probabilities() {
        let a = Tidset::try_from_sorted(vec![(0, 0.5), (1, 0.5), (2, 1.0)]).unwrap();
        let b = Tidset::try_from_sorted(vec![(1, 0.5), (2, 0.5)]).unwrap();
        let c = a.intersect(&b);
        let entries: Vec<_> = c.iter().collect();
        assert_eq!(entries, vec![(1, 0.25), (2, 0.5)]);
    }

    #[test]
    fn full_covers_every_transaction_with_probability_one() {
        let t = Tidset::full(3);
        assert_eq!(t.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn tiny_probabilities_are_collapsed() {
        let t = Tidset::try_from_sorted(vec![(0, 1e-15), (1, 0.4)]).unwrap();
        assert_eq!(t.len(), 1);
    }
}
