//! A library for mining top-K frequent closed itemsets from an uncertain
//! transactional database under probabilistic-support semantics.
//!
//! # Usage
//!
//! The easiest and highest-level way to get a result is
//! [`factory::MinerFactory::mine()`]:
//!
//! ```
//! use uncertain_closed_itemsets::database::{Database, InMemoryDatabase, Transaction};
//! use uncertain_closed_itemsets::factory::{MinerFactory, MiningConfig};
//! use uncertain_closed_itemsets::vocabulary::Vocabulary;
//!
//! let vocabulary = Vocabulary::from_names(["bread", "milk", "eggs"]);
//! let transactions = vec![
//!     Transaction::from_pairs(vec![(0, 0.9), (1, 0.9)]),
//!     Transaction::from_pairs(vec![(0, 0.8), (2, 0.7)]),
//!     Transaction::from_pairs(vec![(1, 0.6), (2, 0.9)]),
//! ];
//! let database = InMemoryDatabase::new(transactions, vocabulary);
//!
//! let config = MiningConfig::new(0.5, 2);
//! let results = MinerFactory::mine(&database, &config).unwrap();
//! for item in &results {
//!     println!("{:?} support={} probability={}", item.items, item.support, item.probability);
//! }
//! ```

pub mod cache;
pub mod calculator;
pub mod closure;
pub mod database;
pub mod error;
pub mod factory;
pub mod frontier;
pub mod item;
pub mod itemset;
pub mod pipeline;
pub mod pruning;
pub mod tidset;
pub mod topk;
pub mod types;
pub mod vocabulary;

pub use error::{MiningError, Result};
pub use factory::{MinerFactory, MiningConfig};
pub use types::FrequentItemset;
