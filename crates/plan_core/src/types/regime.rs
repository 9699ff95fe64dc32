//! Market regime tag shared between the engine and the yearly records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four discrete market states driving annual returns.
///
/// The engine's regime model owns the per-state return distributions and
/// transition matrix; this tag only identifies which state a simulated year
/// was in, so records and aggregate statistics can report regime exposure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarketRegime {
    /// Sustained above-average returns.
    Bull,
    /// Typical long-run behaviour.
    #[default]
    Normal,
    /// Prolonged drawdown.
    Bear,
    /// Sharp, high-volatility crash.
    Crisis,
}

impl MarketRegime {
    /// All regimes in transition-matrix row order.
    pub const ALL: [MarketRegime; 4] = [
        MarketRegime::Bull,
        MarketRegime::Normal,
        MarketRegime::Bear,
        MarketRegime::Crisis,
    ];

    /// Index of this regime in transition-matrix row order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MarketRegime::Bull => 0,
            MarketRegime::Normal => 1,
            MarketRegime::Bear => 2,
            MarketRegime::Crisis => 3,
        }
    }

    /// True for the two adverse states tracked by the exposure statistics.
    #[inline]
    pub fn is_adverse(self) -> bool {
        matches!(self, MarketRegime::Bear | MarketRegime::Crisis)
    }
}
