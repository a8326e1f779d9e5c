//! Error kinds for the mining core.
//!
//! All error kinds are surfaced at construction or call time; nothing is
//! swallowed. `NumericUnderflow` is handled internally by clamping below
//! [`crate::calculator::MIN_PROB`] and never appears here, and `OutOfMemory`
//! is not modeled: the host allocator's own abort is the only signal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiningError {
    #[error("invalid tau: {0}, must be in (0,1]")]
    InvalidTau(f64),

    #[error("invalid k: {0}, must be >= 1")]
    InvalidK(usize),

    #[error("database is empty (size() == 0)")]
    EmptyDatabase,

    #[error("invalid tidset data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, MiningError>;
