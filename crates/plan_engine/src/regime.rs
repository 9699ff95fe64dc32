//! Market regime-switching return model.
//!
//! Annual returns are drawn from one of four discrete market states, each
//! with its own mean/volatility, and the state evolves through a Markov
//! transition matrix. Compared with i.i.d. annual draws this produces
//! fat-tailed, autocorrelated return sequences with crisis clustering,
//! which is what makes simulated sequence-of-returns risk realistic.

use crate::rng::RandomSource;
use plan_core::types::MarketRegime;

/// Mean annual bond return.
pub const BOND_MEAN_RETURN: f64 = 0.04;

/// Bond return volatility.
pub const BOND_VOLATILITY: f64 = 0.05;

/// Annual return on cash equivalents (no volatility modelled).
pub const CASH_RETURN: f64 = 0.02;

/// Per-regime return distribution and persistence parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegimeParams {
    /// Mean annual equity return inside the regime.
    pub mean_return: f64,
    /// Equity return volatility inside the regime.
    pub volatility: f64,
    /// Expected regime duration in years (diagnostic; the transition row is
    /// what actually governs persistence).
    pub expected_duration_years: f64,
    /// Transition probabilities to [Bull, Normal, Bear, Crisis]; sums to 1.
    pub transitions: [f64; 4],
}

/// The 4-state Markov chain over [`MarketRegime`].
///
/// Immutable and `Sync`; one instance is shared across all realizations and
/// all state lives in the caller's regime tag plus the RNG stream.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::MarketRegime;
/// use plan_engine::regime::MarketRegimeModel;
/// use plan_engine::rng::PlanRng;
///
/// let model = MarketRegimeModel::new();
/// let mut rng = PlanRng::from_seed(42);
/// let ret = model.annual_portfolio_return(MarketRegime::Normal, 0.6, 0.35, 0.05, &mut rng);
/// assert!(ret > -1.0);
/// let next = model.next_regime(MarketRegime::Normal, &mut rng);
/// let _ = next;
/// ```
pub struct MarketRegimeModel {
    params: [RegimeParams; 4],
}

impl Default for MarketRegimeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketRegimeModel {
    /// Builds the model with its calibrated default parameters.
    pub fn new() -> Self {
        Self {
            params: [
                // Bull
                RegimeParams {
                    mean_return: 0.14,
                    volatility: 0.12,
                    expected_duration_years: 2.5,
                    transitions: [0.60, 0.25, 0.10, 0.05],
                },
                // Normal
                RegimeParams {
                    mean_return: 0.07,
                    volatility: 0.15,
                    expected_duration_years: 2.5,
                    transitions: [0.20, 0.60, 0.15, 0.05],
                },
                // Bear
                RegimeParams {
                    mean_return: -0.08,
                    volatility: 0.20,
                    expected_duration_years: 1.8,
                    transitions: [0.15, 0.30, 0.45, 0.10],
                },
                // Crisis
                RegimeParams {
                    mean_return: -0.25,
                    volatility: 0.32,
                    expected_duration_years: 1.5,
                    transitions: [0.10, 0.30, 0.25, 0.35],
                },
            ],
        }
    }

    /// Parameters for one regime.
    #[inline]
    pub fn params(&self, regime: MarketRegime) -> &RegimeParams {
        &self.params[regime.index()]
    }

    /// Draws one year's blended portfolio return.
    ///
    /// Equity returns are regime-conditioned normals, bonds draw from a
    /// regime-independent `N(0.04, 0.05)`, cash earns a fixed 2%. A total
    /// return below −100% clamps at −100%; a pool cannot go negative.
    pub fn annual_portfolio_return(
        &self,
        regime: MarketRegime,
        stock_weight: f64,
        bond_weight: f64,
        cash_weight: f64,
        rng: &mut impl RandomSource,
    ) -> f64 {
        let p = self.params(regime);
        let stock_return = p.mean_return + p.volatility * rng.normal();
        let bond_return = BOND_MEAN_RETURN + BOND_VOLATILITY * rng.normal();
        let blended =
            stock_weight * stock_return + bond_weight * bond_return + cash_weight * CASH_RETURN;
        blended.max(-1.0)
    }

    /// Transitions to next year's regime: one uniform draw walks the
    /// cumulative transition distribution.
    pub fn next_regime(&self, current: MarketRegime, rng: &mut impl RandomSource) -> MarketRegime {
        let row = &self.params(current).transitions;
        let u = rng.next_uniform();
        let mut cumulative = 0.0;
        for (i, &p) in row.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return MarketRegime::ALL[i];
            }
        }
        // Row sums to 1; float dust can leave u above the last edge.
        MarketRegime::ALL[3]
    }
}
