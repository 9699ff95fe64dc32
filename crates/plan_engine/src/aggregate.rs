//! Monte Carlo batch runner and cross-realization statistics.
//!
//! Realizations are embarrassingly parallel: each index derives its own
//! RNG stream from the root seed, so results are bit-identical regardless
//! of thread count or scheduling. The batch collects per-realization
//! outcomes in index order and reduces them into an [`AggregateResult`].

use crate::error::EngineError;
use crate::mortality::MortalityModel;
use crate::regime::MarketRegimeModel;
use crate::rng::PlanRng;
use crate::scenario::ScenarioSimulator;
use plan_core::types::{
    AggregateResult, PercentileBalances, ScenarioOutcome, SimulationParameters, YearlyCashFlow,
};
use rayon::prelude::*;

/// Upper bound on batch size.
pub const MAX_ITERATIONS: u32 = 1_000_000;

/// Success probability the safe-rate search targets.
const SAFE_RATE_SUCCESS_TARGET: f64 = 0.90;

/// Batch size for intermediate safe-rate probes.
const SAFE_RATE_PROBE_ITERATIONS: u32 = 200;

/// Batch size for the final safe-rate confirmation.
const SAFE_RATE_FINAL_ITERATIONS: u32 = 1_000;

/// Bisection bounds and refinement for the safe-rate search.
const SAFE_RATE_LOW: f64 = 0.02;
const SAFE_RATE_HIGH: f64 = 0.10;
const SAFE_RATE_BISECTIONS: u32 = 12;
const SAFE_RATE_BACKOFF: f64 = 0.0025;

/// Years of sample timeline carried into the aggregate result.
const SAMPLE_TIMELINE_CAP: usize = 100;

/// One batch of completed realizations, in index order.
///
/// Thin wrapper so the reduction steps read as methods instead of loose
/// loops; the underlying outcomes stay accessible for callers that want
/// realization-level data.
pub struct MonteCarloBatch {
    outcomes: Vec<ScenarioOutcome>,
}

impl MonteCarloBatch {
    /// Runs `iterations` realizations in parallel off `root`.
    ///
    /// Realization `i` always receives the stream `root.derive("realization", i)`,
    /// so the batch is a pure function of `(params, root seed, iterations)`.
    pub fn run(
        params: &SimulationParameters,
        mortality: &MortalityModel,
        regimes: &MarketRegimeModel,
        iterations: u32,
        root: &PlanRng,
    ) -> Self {
        let sim = ScenarioSimulator::new(params, mortality, regimes);
        let outcomes: Vec<ScenarioOutcome> = (0..u64::from(iterations))
            .into_par_iter()
            .map(|i| sim.run(root.derive("realization", i)))
            .collect();
        Self { outcomes }
    }

    /// Completed realizations in index order.
    #[inline]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    #[inline]
    fn len(&self) -> f64 {
        self.outcomes.len() as f64
    }

    /// Fraction of realizations that survived to their horizon.
    pub fn success_probability(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().filter(|o| o.success).count() as f64 / self.len()
    }

    /// Binomial standard error of the success estimate.
    pub fn success_std_error(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let p = self.success_probability();
        (p * (1.0 - p) / self.len()).sqrt()
    }

    /// Ending-balance percentile band (nearest-rank on the sorted batch).
    pub fn percentiles(&self) -> PercentileBalances {
        if self.outcomes.is_empty() {
            return PercentileBalances::default();
        }
        let mut balances: Vec<f64> = self.outcomes.iter().map(|o| o.ending_balance).collect();
        balances.sort_by(|a, b| a.total_cmp(b));
        let at = |p: f64| {
            let idx = (p * (balances.len() - 1) as f64).round() as usize;
            balances[idx]
        };
        PercentileBalances {
            p10: at(0.10),
            p25: at(0.25),
            p50: at(0.50),
            p75: at(0.75),
            p90: at(0.90),
        }
    }

    fn mean_of(&self, f: impl Fn(&ScenarioOutcome) -> f64) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().map(f).sum::<f64>() / self.len()
    }

    fn share_of(&self, f: impl Fn(&ScenarioOutcome) -> bool) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().filter(|o| f(o)).count() as f64 / self.len()
    }

    /// Lowest ending balance in the batch (zero for an empty batch).
    pub fn worst_case_balance(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes
            .iter()
            .map(|o| o.ending_balance)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Rescales a plan's spending to `rate` of initial assets, preserving the
/// original living/healthcare split.
fn plan_at_spending_rate(params: &SimulationParameters, rate: f64) -> SimulationParameters {
    let mut rescaled = params.clone();
    let total_spending = params.annual_living_expenses + params.annual_healthcare_expenses;
    let living_share = if total_spending > 0.0 {
        params.annual_living_expenses / total_spending
    } else {
        1.0
    };
    let spending = rate * params.buckets.total();
    rescaled.annual_living_expenses = spending * living_share;
    rescaled.annual_healthcare_expenses = spending * (1.0 - living_share);
    rescaled
}

/// Success probability of the plan at a rescaled spending rate.
fn success_at_rate(
    params: &SimulationParameters,
    mortality: &MortalityModel,
    regimes: &MarketRegimeModel,
    rate: f64,
    iterations: u32,
    stream: &PlanRng,
) -> f64 {
    let rescaled = plan_at_spending_rate(params, rate);
    MonteCarloBatch::run(&rescaled, mortality, regimes, iterations, stream).success_probability()
}

/// Bisects for the highest initial spending rate that still clears the 90%
/// success target.
///
/// Intermediate probes run small batches; the surviving candidate is
/// confirmed with a fuller batch and backed off in small steps if the
/// confirmation falls short. Every probe derives its stream from the root,
/// so the search is as deterministic as the main batch.
fn safe_withdrawal_rate(
    params: &SimulationParameters,
    mortality: &MortalityModel,
    regimes: &MarketRegimeModel,
    root: &PlanRng,
) -> f64 {
    let probe = |rate: f64, iterations: u32, salt: u64| {
        let stream = root.derive("safe-rate", salt);
        success_at_rate(params, mortality, regimes, rate, iterations, &stream)
    };

    if probe(SAFE_RATE_LOW, SAFE_RATE_PROBE_ITERATIONS, 0) < SAFE_RATE_SUCCESS_TARGET {
        tracing::debug!(rate = SAFE_RATE_LOW, "floor rate misses the success target");
        return SAFE_RATE_LOW;
    }

    let mut lo = SAFE_RATE_LOW;
    let mut hi = SAFE_RATE_HIGH;
    for step in 0..SAFE_RATE_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        let p = probe(mid, SAFE_RATE_PROBE_ITERATIONS, u64::from(step) + 1);
        tracing::debug!(rate = mid, success = p, "safe-rate probe");
        if p >= SAFE_RATE_SUCCESS_TARGET {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    // Confirm with a fuller batch; probe noise can leave `lo` slightly hot.
    let mut rate = lo;
    let mut salt = u64::from(SAFE_RATE_BISECTIONS) + 1;
    while rate > SAFE_RATE_LOW {
        if probe(rate, SAFE_RATE_FINAL_ITERATIONS, salt) >= SAFE_RATE_SUCCESS_TARGET {
            break;
        }
        rate = (rate - SAFE_RATE_BACKOFF).max(SAFE_RATE_LOW);
        salt += 1;
    }
    rate
}

/// Runs the full Monte Carlo study for one plan.
///
/// Validates inputs, runs `iterations` realizations off `seed`, reduces
/// them into cross-realization statistics, and solves for the safe
/// withdrawal rate. Identical inputs produce identical results on any
/// machine and any thread count.
///
/// # Errors
///
/// [`EngineError::Parameter`] when the plan fails validation, or
/// [`EngineError::InvalidIterations`] when the batch size is zero or above
/// [`MAX_ITERATIONS`].
///
/// # Examples
///
/// ```rust
/// use plan_core::types::{AssetBuckets, SimulationParameters};
/// use plan_engine::run_monte_carlo;
///
/// let params = SimulationParameters::builder()
///     .current_age(65)
///     .retirement_age(65)
///     .life_expectancy(88)
///     .buckets(AssetBuckets::new(700_000.0, 150_000.0, 300_000.0, 50_000.0))
///     .annual_living_expenses(60_000.0)
///     .annual_healthcare_expenses(8_000.0)
///     .annual_social_security(30_000.0)
///     .build()
///     .unwrap();
/// let result = run_monte_carlo(&params, 500, 42).unwrap();
/// assert!(result.percentiles.is_ordered());
/// ```
pub fn run_monte_carlo(
    params: &SimulationParameters,
    iterations: u32,
    seed: u64,
) -> Result<AggregateResult, EngineError> {
    params.validate()?;
    if iterations == 0 || iterations > MAX_ITERATIONS {
        return Err(EngineError::InvalidIterations {
            count: iterations,
            max: MAX_ITERATIONS,
        });
    }

    tracing::info!(iterations, seed, "starting Monte Carlo batch");
    let mortality = MortalityModel::new();
    let regimes = MarketRegimeModel::new();
    let root = PlanRng::from_seed(seed);

    let batch = MonteCarloBatch::run(params, &mortality, &regimes, iterations, &root);
    let success_probability = batch.success_probability();
    tracing::info!(success_probability, "batch complete, solving safe rate");

    let safe_rate = safe_withdrawal_rate(params, &mortality, &regimes, &root);

    let sample_timeline: Vec<YearlyCashFlow> = batch
        .outcomes()
        .first()
        .map(|o| o.yearly.iter().copied().take(SAMPLE_TIMELINE_CAP).collect())
        .unwrap_or_default();

    Ok(AggregateResult {
        success_probability,
        success_std_error: batch.success_std_error(),
        iterations,
        seed,
        percentiles: batch.percentiles(),
        safe_withdrawal_rate: safe_rate,
        mean_effective_tax_rate: batch.mean_of(|o| o.effective_tax_rate),
        irmaa_incidence: batch.share_of(|o| o.total_irmaa > 0.0),
        avg_years_in_bear: batch.mean_of(|o| f64::from(o.years_in_bear)),
        avg_years_in_crisis: batch.mean_of(|o| f64::from(o.years_in_crisis)),
        worst_case_balance: batch.worst_case_balance(),
        legacy_goal_probability: batch.share_of(|o| o.legacy_goal_met),
        sample_timeline,
    })
}
