//! `SupportCalculator` turns a list of per-transaction existence
//! probabilities into the probabilistic support `s*` and its tail
//! probability `q* = P(sup >= s*)`, via the probability-generating-function
//! `G(x) = prod_t ((1-p_t) + p_t*x)`. Two interchangeable strategies are
//! provided; both must agree on `s*` exactly and on `q*` to within `1e-9`.

use crate::error::{MiningError, Result};
use crate::tidset::Tidset;

pub use crate::tidset::MIN_PROB;

/// Strategy-selection entry point used by [`crate::factory::MinerFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalculatorKind {
    DirectConvolution,
    DivideAndConquer,
}

pub trait SupportCalculator: Send + Sync {
    fn tau(&self) -> f64;

    /// Build the pmf (coefficients of `G(x)`) for the given non-zero,
    /// above-floor probabilities.
    fn build_pmf(&self, probs: &[f64]) -> Vec<f64>;

    /// Dense entry point: `p[0..N)`, zeros for transactions the itemset
    /// cannot occur in.
    fn compute_dense(&self, probabilities: &[f64]) -> (usize, f64) {
        let filtered: Vec<f64> = probabilities
            .iter()
            .copied()
            .filter(|&p| p > MIN_PROB)
            .collect();
        if filtered.is_empty() {
            return (0, 0.0);
        }
        let pmf = self.build_pmf(&filtered);
        pmf_to_support(&pmf, self.tau())
    }

    /// Sparse entry point: shortcuts to `(0,0)` on an empty tidset and
    /// otherwise operates only on the tidset's non-zero entries.
    fn compute_tidset(&self, tidset: &Tidset, _n: usize) -> (usize, f64) {
        if tidset.is_empty() {
            return (0, 0.0);
        }
        let probs: Vec<f64> = tidset.probabilities().collect();
        self.compute_dense(&probs)
    }
}

/// Given the generating function's coefficient vector, return
/// `(s*, q*) = (max{s : tail[s] >= tau}, tail[s*])`.
fn pmf_to_support(pmf: &[f64], tau: f64) -> (usize, f64) {
    let n = pmf.len() - 1;
    let mut tail = 0.0;
    let mut tails = vec![0.0; n + 1];
    for s in (0..=n).rev() {
        tail += pmf[s];
        tails[s] = tail;
    }
    for s in (0..=n).rev() {
        if tails[s] >= tau {
            return (s, tails[s]);
        }
    }
    (0, tails[0])
}

fn validate_tau(tau: f64) -> Result<()> {
    if tau > 0.0 && tau <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::InvalidTau(tau))
    }
}

/// Sequential generating-function convolution: O(N^2) time, O(N) space.
pub struct DirectConvolutionCalculator {
    tau: f64,
}

impl DirectConvolutionCalculator {
    pub fn new(tau: f64) -> Result<Self> {
        validate_tau(tau)?;
        Ok(Self { tau })
    }
}

impl SupportCalculator for DirectConvolutionCalculator {
    fn tau(&self) -> f64 {
        self.tau
    }

    fn build_pmf(&self, probs: &[f64]) -> Vec<f64> {
        direct_convolution_pmf(probs)
    }
}

fn direct_convolution_pmf(probs: &[f64]) -> Vec<f64> {
    let mut pmf = vec![1.0];
    for &p in probs {
        let mut next = vec![0.0; pmf.len() + 1];
        for (i, &mass) in pmf.iter().enumerate() {
            next[i] += mass * (1.0 - p);
            next[i + 1] += mass * p;
        }
        pmf = next;
    }
    pmf
}

/// Recursive divide-and-conquer convolution: same asymptotic complexity as
/// the direct strategy, better cache behavior on long vectors.
pub struct DivideAndConquerCalculator {
    tau: f64,
}

impl DivideAndConquerCalculator {
    pub fn new(tau: f64) -> Result<Self> {
        validate_tau(tau)?;
        Ok(Self { tau })
    }
}

impl SupportCalculator for DivideAndConquerCalculator {
    fn tau(&self) -> f64 {
        self.tau
    }

    fn build_pmf(&self, probs: &[f64]) -> Vec<f64> {
        divide_and_conquer_pmf(probs)
    }
}

fn divide_and_conquer_pmf(probs: &[f64]) -> Vec<f64> {
    if probs.len() <= 32 {
        return direct_convolution_pmf(probs);
    }
    let mid = probs.len() / 2;
    let left = divide_and_conquer_pmf(&probs[..mid]);
    let right = divide_and_conquer_pmf(&probs[mid..]);
    convolve(&left, &right)
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut result = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai <= MIN_PROB {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            result[i + j] += ai * bj;
        }
    }
    result
}

/// Construct the calculator named by `kind`.
pub fn build_calculator(kind: CalculatorKind, tau: f64) -> Result<Box<dyn SupportCalculator>> {
    Ok(match kind {
        CalculatorKind::DirectConvolution => Box::new(DirectConvolutionCalculator::new(tau)?),
        CalculatorKind::DivideAndConquer => Box::new(DivideAndConquerCalculator::new(tau)?),
    })
}
