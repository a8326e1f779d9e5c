//! `MinerFactory` is the single entry point external callers use,
//! translating a [`MiningConfig`] into a wired
//! [`crate::pipeline::MiningPipeline`] without exposing any of its internals.

use crate::calculator::{build_calculator, CalculatorKind};
use crate::database::Database;
use crate::error::{MiningError, Result};
use crate::frontier::StrategyKind;
use crate::pipeline::MiningPipeline;
use crate::pruning::PruningProfile;
use crate::types::FrequentItemset;

/// Everything one mining run needs beyond the database itself.
#[derive(Clone, Copy, Debug)]
pub struct MiningConfig {
    /// Minimum tail-probability threshold `tau`, in `(0,1]`.
    pub tau: f64,
    /// How many closed itemsets to retain, `>= 1`.
    pub k: usize,
    pub strategy: StrategyKind,
    pub calculator: CalculatorKind,
    pub pruning: PruningProfile,
}

impl MiningConfig {
    pub fn new(tau: f64, k: usize) -> Self {
        Self {
            tau,
            k,
            strategy: StrategyKind::BestFirst,
            calculator: CalculatorKind::DirectConvolution,
            pruning: PruningProfile::all_enabled(),
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_calculator(mut self, calculator: CalculatorKind) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_pruning(mut self, pruning: PruningProfile) -> Self {
        self.pruning = pruning;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.k < 1 {
            return Err(MiningError::InvalidK(self.k));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return Err(MiningError::InvalidTau(self.tau));
        }
        Ok(())
    }
}

/// Builds a [`MiningPipeline`] from a [`MiningConfig`] and runs it. The
/// pipeline itself is never exposed: callers only see config in, results out.
pub struct MinerFactory;

impl MinerFactory {
    pub fn mine(database: &dyn Database, config: &MiningConfig) -> Result<Vec<FrequentItemset>> {
        config.validate()?;
        let calculator = build_calculator(config.calculator, config.tau)?;
        let pipeline = MiningPipeline::new(database, calculator, config.k, config.strategy, config.pruning)?;
        Ok(pipeline.mine())
    }
}
