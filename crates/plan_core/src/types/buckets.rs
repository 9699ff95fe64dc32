//! Asset buckets grouped by tax character.
//!
//! [`AssetBuckets`] is an immutable value type: every operation returns a
//! new value rather than mutating shared state. One realization owns exactly
//! one chain of bucket values; nothing crosses realization boundaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one of the four tax-character pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BucketKind {
    /// Traditional IRA / 401(k): withdrawals are ordinary income.
    TaxDeferred,
    /// Roth IRA / Roth 401(k): withdrawals are untaxed.
    TaxFree,
    /// Taxable brokerage: withdrawals realise capital gains.
    CapitalGains,
    /// Cash equivalents: no tax on withdrawal.
    Cash,
}

/// How a single gross withdrawal was sourced across the pools.
///
/// Produced alongside the post-withdrawal [`AssetBuckets`] so the tax model
/// can see how much of the draw is ordinary income versus realised gains.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BucketDraw {
    /// Amount taken from the tax-deferred pool (ordinary income).
    pub tax_deferred: f64,
    /// Amount taken from the capital-gains pool.
    pub capital_gains: f64,
    /// Amount taken from the tax-free pool.
    pub tax_free: f64,
    /// Amount taken from cash equivalents.
    pub cash: f64,
}

impl BucketDraw {
    /// Total amount actually withdrawn across all pools.
    ///
    /// May be less than the requested gross amount when the portfolio is
    /// nearly depleted.
    #[inline]
    pub fn total(&self) -> f64 {
        self.tax_deferred + self.capital_gains + self.tax_free + self.cash
    }
}

/// The four tax-character pools tracked per realization.
///
/// Invariant: no pool is ever negative; [`AssetBuckets::total`] is always the
/// exact sum of the four pools because it is derived, never stored.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::AssetBuckets;
///
/// let b = AssetBuckets::new(500_000.0, 100_000.0, 250_000.0, 50_000.0);
/// let grown = b.grown(0.07);
/// assert!(grown.total() > b.total());
///
/// let (after, draw) = b.withdraw_ordered(40_000.0);
/// assert!((b.total() - after.total() - draw.total()).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetBuckets {
    /// Traditional IRA / 401(k) balance.
    pub tax_deferred: f64,
    /// Roth balance.
    pub tax_free: f64,
    /// Taxable brokerage balance.
    pub capital_gains: f64,
    /// Cash-equivalent balance.
    pub cash: f64,
}

impl AssetBuckets {
    /// Creates buckets from the four pool balances, clamping negatives to zero.
    #[inline]
    pub fn new(tax_deferred: f64, tax_free: f64, capital_gains: f64, cash: f64) -> Self {
        Self {
            tax_deferred: tax_deferred.max(0.0),
            tax_free: tax_free.max(0.0),
            capital_gains: capital_gains.max(0.0),
            cash: cash.max(0.0),
        }
    }

    /// An empty portfolio.
    #[inline]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Total portfolio value; always the exact sum of the four pools.
    #[inline]
    pub fn total(&self) -> f64 {
        self.tax_deferred + self.tax_free + self.capital_gains + self.cash
    }

    /// True when every pool is exhausted.
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.total() <= 0.0
    }

    /// Balance of a single pool.
    #[inline]
    pub fn balance(&self, kind: BucketKind) -> f64 {
        match kind {
            BucketKind::TaxDeferred => self.tax_deferred,
            BucketKind::TaxFree => self.tax_free,
            BucketKind::CapitalGains => self.capital_gains,
            BucketKind::Cash => self.cash,
        }
    }

    /// Returns a new value with every pool grown by `rate`.
    ///
    /// A rate below −100% cannot push a pool negative; balances clamp at zero.
    #[must_use]
    pub fn grown(&self, rate: f64) -> Self {
        let factor = (1.0 + rate).max(0.0);
        Self {
            tax_deferred: self.tax_deferred * factor,
            tax_free: self.tax_free * factor,
            capital_gains: self.capital_gains * factor,
            cash: self.cash * factor,
        }
    }

    /// Returns a new value with `amount` added to one pool.
    #[must_use]
    pub fn deposited(&self, kind: BucketKind, amount: f64) -> Self {
        let mut next = *self;
        let amount = amount.max(0.0);
        match kind {
            BucketKind::TaxDeferred => next.tax_deferred += amount,
            BucketKind::TaxFree => next.tax_free += amount,
            BucketKind::CapitalGains => next.capital_gains += amount,
            BucketKind::Cash => next.cash += amount,
        }
        next
    }

    /// Withdraws up to `gross` following the tax-character order used by the
    /// withdrawal solver: tax-deferred first (ordinary income), then the
    /// capital-gains pool, then tax-free, then cash.
    ///
    /// Returns the post-withdrawal buckets and the per-pool breakdown. When
    /// the portfolio cannot cover `gross`, the draw stops at depletion; the
    /// shortfall is visible as `gross - draw.total()`.
    #[must_use]
    pub fn withdraw_ordered(&self, gross: f64) -> (Self, BucketDraw) {
        const ORDER: [BucketKind; 4] = [
            BucketKind::TaxDeferred,
            BucketKind::CapitalGains,
            BucketKind::TaxFree,
            BucketKind::Cash,
        ];
        self.withdraw_in_order(gross, &ORDER)
    }

    /// Withdraws up to `gross` following an explicit pool order.
    #[must_use]
    pub fn withdraw_in_order(&self, gross: f64, order: &[BucketKind]) -> (Self, BucketDraw) {
        let mut next = *self;
        let mut draw = BucketDraw::default();
        let mut remaining = gross.max(0.0);

        for &kind in order {
            if remaining <= 0.0 {
                break;
            }
            let available = next.balance(kind);
            let taken = remaining.min(available);
            match kind {
                BucketKind::TaxDeferred => {
                    next.tax_deferred -= taken;
                    draw.tax_deferred += taken;
                }
                BucketKind::CapitalGains => {
                    next.capital_gains -= taken;
                    draw.capital_gains += taken;
                }
                BucketKind::TaxFree => {
                    next.tax_free -= taken;
                    draw.tax_free += taken;
                }
                BucketKind::Cash => {
                    next.cash -= taken;
                    draw.cash += taken;
                }
            }
        }

        // Guard against -0.0 and float dust after repeated draws.
        next.tax_deferred = next.tax_deferred.max(0.0);
        next.tax_free = next.tax_free.max(0.0);
        next.capital_gains = next.capital_gains.max(0.0);
        next.cash = next.cash.max(0.0);

        (next, draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_total_is_sum_of_pools() {
        let b = AssetBuckets::new(1.0, 2.0, 3.0, 4.0);
        assert_relative_eq!(b.total(), 10.0);
    }

    #[test]
    fn test_new_clamps_negative_pools() {
        let b = AssetBuckets::new(-5.0, 2.0, -1.0, 4.0);
        assert_eq!(b.tax_deferred, 0.0);
        assert_eq!(b.capital_gains, 0.0);
        assert_relative_eq!(b.total(), 6.0);
    }

    #[test]
    fn test_grown_applies_rate_to_every_pool() {
        let b = AssetBuckets::new(100.0, 100.0, 100.0, 100.0);
        let g = b.grown(0.10);
        assert_relative_eq!(g.total(), 440.0);
    }

    #[test]
    fn test_grown_clamps_catastrophic_loss() {
        let b = AssetBuckets::new(100.0, 0.0, 0.0, 0.0);
        let g = b.grown(-1.5);
        assert_eq!(g.total(), 0.0);
    }

    #[test]
    fn test_withdraw_ordered_drains_tax_deferred_first() {
        let b = AssetBuckets::new(30_000.0, 50_000.0, 40_000.0, 10_000.0);
        let (after, draw) = b.withdraw_ordered(50_000.0);
        assert_relative_eq!(draw.tax_deferred, 30_000.0);
        assert_relative_eq!(draw.capital_gains, 20_000.0);
        assert_eq!(draw.tax_free, 0.0);
        assert_eq!(after.tax_deferred, 0.0);
        assert_relative_eq!(after.capital_gains, 20_000.0);
    }

    #[test]
    fn test_withdraw_more_than_total_depletes() {
        let b = AssetBuckets::new(10.0, 10.0, 10.0, 10.0);
        let (after, draw) = b.withdraw_ordered(1_000.0);
        assert!(after.is_depleted());
        assert_relative_eq!(draw.total(), 40.0);
    }

    #[test]
    fn test_withdraw_zero_is_identity() {
        let b = AssetBuckets::new(1.0, 2.0, 3.0, 4.0);
        let (after, draw) = b.withdraw_ordered(0.0);
        assert_eq!(after, b);
        assert_eq!(draw.total(), 0.0);
    }

    #[test]
    fn test_deposited_targets_single_pool() {
        let b = AssetBuckets::zero().deposited(BucketKind::TaxFree, 500.0);
        assert_eq!(b.tax_free, 500.0);
        assert_eq!(b.total(), 500.0);
    }

    proptest! {
        #[test]
        fn prop_withdraw_conserves_value(
            td in 0.0..1e7f64,
            tf in 0.0..1e7f64,
            cg in 0.0..1e7f64,
            cash in 0.0..1e7f64,
            gross in 0.0..2e7f64,
        ) {
            let b = AssetBuckets::new(td, tf, cg, cash);
            let (after, draw) = b.withdraw_ordered(gross);
            prop_assert!(after.tax_deferred >= 0.0);
            prop_assert!(after.tax_free >= 0.0);
            prop_assert!(after.capital_gains >= 0.0);
            prop_assert!(after.cash >= 0.0);
            prop_assert!((b.total() - after.total() - draw.total()).abs() < 1e-6);
        }

        #[test]
        fn prop_grown_never_negative(
            td in 0.0..1e7f64,
            rate in -2.0..2.0f64,
        ) {
            let b = AssetBuckets::new(td, td, td, td);
            prop_assert!(b.grown(rate).total() >= 0.0);
        }
    }
}
