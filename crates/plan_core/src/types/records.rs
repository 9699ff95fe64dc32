//! Per-year records, realization outcomes, and aggregate statistics.
//!
//! [`YearlyCashFlow`] values are appended, never rewritten, within one
//! realization's timeline. Only [`AggregateResult`] (plus an optional
//! truncated sample timeline) survives past the batch call boundary;
//! everything else is created and discarded inside a single realization.

use super::regime::MarketRegime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one simulated year.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YearlyCashFlow {
    /// Simulated age at year end.
    pub age: u32,
    /// Portfolio balance at year end.
    pub portfolio_balance: f64,
    /// Guaranteed income received this year.
    pub guaranteed_income: f64,
    /// Gross portfolio withdrawal this year.
    pub gross_withdrawal: f64,
    /// Net cash available after taxes.
    pub net_cash_flow: f64,
    /// Total income taxes paid this year.
    pub taxes_paid: f64,
    /// IRMAA Medicare surcharge assessed this year.
    pub irmaa_surcharge: f64,
    /// Market regime active during the year.
    pub regime: MarketRegime,
}

/// How a single realization ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminalState {
    /// Assets remained at the stochastic horizon.
    SurvivedToHorizon,
    /// The portfolio ran out before the horizon.
    Depleted {
        /// Distribution year (0-based) in which depletion occurred.
        year: u32,
    },
}

/// Terminal outcome of one realization.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScenarioOutcome {
    /// Whether the portfolio lasted to the simulated horizon.
    pub success: bool,
    /// How the realization terminated.
    pub terminal_state: TerminalState,
    /// Portfolio balance at termination.
    pub ending_balance: f64,
    /// Terminal age drawn for this realization.
    pub terminal_age: u32,
    /// Cumulative income taxes paid.
    pub total_taxes: f64,
    /// Cumulative IRMAA surcharges paid.
    pub total_irmaa: f64,
    /// Effective tax rate across all distribution years.
    pub effective_tax_rate: f64,
    /// Years spent in the bear regime.
    pub years_in_bear: u32,
    /// Years spent in the crisis regime.
    pub years_in_crisis: u32,
    /// Whether the ending balance met the legacy goal (statistic only).
    pub legacy_goal_met: bool,
    /// Full yearly timeline for this realization.
    pub yearly: Vec<YearlyCashFlow>,
}

impl ScenarioOutcome {
    /// Depletion year, if the realization depleted.
    #[inline]
    pub fn depletion_year(&self) -> Option<u32> {
        match self.terminal_state {
            TerminalState::Depleted { year } => Some(year),
            TerminalState::SurvivedToHorizon => None,
        }
    }
}

/// Ending-balance percentiles across a batch of realizations.
///
/// Ordering invariant: `p10 <= p25 <= p50 <= p75 <= p90`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PercentileBalances {
    /// 10th percentile ending balance.
    pub p10: f64,
    /// 25th percentile ending balance.
    pub p25: f64,
    /// Median ending balance.
    pub p50: f64,
    /// 75th percentile ending balance.
    pub p75: f64,
    /// 90th percentile ending balance.
    pub p90: f64,
}

impl PercentileBalances {
    /// True when the percentile ordering invariant holds.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.p10 <= self.p25 && self.p25 <= self.p50 && self.p50 <= self.p75 && self.p75 <= self.p90
    }
}

/// Cross-realization statistics for one Monte Carlo batch.
///
/// Serialisable for persistence and dashboard consumption; the optional
/// sample timeline is truncated by the caller-supplied cap so the structure
/// stays size-bounded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregateResult {
    /// Fraction of realizations that survived to their horizon.
    pub success_probability: f64,
    /// Standard error of the success probability estimate.
    pub success_std_error: f64,
    /// Number of realizations in the batch.
    pub iterations: u32,
    /// Seed the batch was derived from.
    pub seed: u64,
    /// Ending-balance percentile band.
    pub percentiles: PercentileBalances,
    /// Estimated safe withdrawal rate at the 90% success target.
    pub safe_withdrawal_rate: f64,
    /// Mean effective tax rate across realizations.
    pub mean_effective_tax_rate: f64,
    /// Fraction of realizations that paid any IRMAA surcharge.
    pub irmaa_incidence: f64,
    /// Average years per realization spent in the bear regime.
    pub avg_years_in_bear: f64,
    /// Average years per realization spent in the crisis regime.
    pub avg_years_in_crisis: f64,
    /// Lowest ending balance observed across the batch.
    pub worst_case_balance: f64,
    /// Fraction of realizations whose ending balance met the legacy goal.
    pub legacy_goal_probability: f64,
    /// One sample realization's yearly records, truncated by the caller cap.
    pub sample_timeline: Vec<YearlyCashFlow>,
}
