//! Social Security benefit taxation.
//!
//! The taxable share of a benefit is driven by *provisional income*: other
//! taxable income plus half the gross benefit. Two filing-status thresholds
//! split the result into 0%, up-to-50%, and up-to-85% regions, with the
//! total always capped at 85% of the benefit (IRC §86, 2024 thresholds).

use plan_core::types::FilingStatus;

/// Lower provisional-income threshold (0% below).
fn lower_threshold(filing: FilingStatus) -> f64 {
    match filing {
        FilingStatus::Single => 25_000.0,
        FilingStatus::MarriedFilingJointly => 32_000.0,
    }
}

/// Upper provisional-income threshold (85% tier above).
fn upper_threshold(filing: FilingStatus) -> f64 {
    match filing {
        FilingStatus::Single => 34_000.0,
        FilingStatus::MarriedFilingJointly => 44_000.0,
    }
}

/// Provisional income: other taxable income plus half the gross benefit.
#[inline]
pub fn provisional_income(gross_benefit: f64, other_taxable_income: f64) -> f64 {
    other_taxable_income + 0.5 * gross_benefit
}

/// Taxable portion of a Social Security benefit.
///
/// Bounds: `0 <= result <= 0.85 * gross_benefit`, and the result is zero
/// whenever provisional income sits at or below the lower threshold.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::FilingStatus;
/// use plan_engine::tax::taxable_social_security;
///
/// // Low income: nothing taxable.
/// assert_eq!(
///     taxable_social_security(20_000.0, 10_000.0, FilingStatus::Single),
///     0.0
/// );
///
/// // High income: capped at 85%.
/// let taxable = taxable_social_security(30_000.0, 100_000.0, FilingStatus::Single);
/// assert_eq!(taxable, 0.85 * 30_000.0);
/// ```
pub fn taxable_social_security(
    gross_benefit: f64,
    other_taxable_income: f64,
    filing: FilingStatus,
) -> f64 {
    let gross_benefit = gross_benefit.max(0.0);
    if gross_benefit == 0.0 {
        return 0.0;
    }

    let provisional = provisional_income(gross_benefit, other_taxable_income.max(0.0));
    let lower = lower_threshold(filing);
    let upper = upper_threshold(filing);

    if provisional <= lower {
        return 0.0;
    }

    if provisional <= upper {
        // 50% tier: half the excess over the lower threshold.
        return (0.5 * (provisional - lower)).min(0.5 * gross_benefit);
    }

    // 85% tier: 85% of the excess over the upper threshold, plus the fully
    // phased-in 50% tier, capped at 85% of the benefit.
    let tier_50 = (0.5 * (upper - lower)).min(0.5 * gross_benefit);
    (0.85 * (provisional - upper) + tier_50).min(0.85 * gross_benefit)
}
