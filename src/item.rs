//! Dense internal item identifiers.
//!
//! Items are represented as `u32` indices into a [`crate::vocabulary::Vocabulary`]
//! rather than as the caller's original names, so that itemsets, tidsets and
//! caches can use cheap integer comparisons and hashing throughout the core.

/// A dense item id in `[0, V)`.
pub type ItemId = u32;
