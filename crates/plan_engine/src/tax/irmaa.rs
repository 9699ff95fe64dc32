//! IRMAA Medicare premium surcharges.
//!
//! Medicare Part B/D premiums step up with Modified AGI across six tiers
//! (2024 tables). The annual surcharge is the excess of the tier's monthly
//! Part B premium over the base premium, plus the Part D add-on, times 12.

use plan_core::types::FilingStatus;

/// 2024 base monthly Part B premium (tier 1 pays no surcharge).
pub const BASE_PART_B_MONTHLY: f64 = 174.70;

/// One IRMAA tier: MAGI ceilings per filing status and the monthly premiums
/// charged inside the tier.
struct IrmaaTier {
    magi_ceiling_single: f64,
    magi_ceiling_married: f64,
    part_b_monthly: f64,
    part_d_monthly: f64,
}

/// 2024 tiers, lowest MAGI first. The last tier is open-ended.
const TIERS: [IrmaaTier; 6] = [
    IrmaaTier {
        magi_ceiling_single: 103_000.0,
        magi_ceiling_married: 206_000.0,
        part_b_monthly: 174.70,
        part_d_monthly: 0.0,
    },
    IrmaaTier {
        magi_ceiling_single: 129_000.0,
        magi_ceiling_married: 258_000.0,
        part_b_monthly: 244.60,
        part_d_monthly: 12.90,
    },
    IrmaaTier {
        magi_ceiling_single: 161_000.0,
        magi_ceiling_married: 322_000.0,
        part_b_monthly: 349.40,
        part_d_monthly: 33.30,
    },
    IrmaaTier {
        magi_ceiling_single: 193_000.0,
        magi_ceiling_married: 386_000.0,
        part_b_monthly: 454.20,
        part_d_monthly: 53.80,
    },
    IrmaaTier {
        magi_ceiling_single: 500_000.0,
        magi_ceiling_married: 750_000.0,
        part_b_monthly: 559.00,
        part_d_monthly: 74.20,
    },
    IrmaaTier {
        magi_ceiling_single: f64::INFINITY,
        magi_ceiling_married: f64::INFINITY,
        part_b_monthly: 594.00,
        part_d_monthly: 81.00,
    },
];

fn tier_for(magi: f64, filing: FilingStatus) -> &'static IrmaaTier {
    TIERS
        .iter()
        .find(|tier| {
            let ceiling = match filing {
                FilingStatus::Single => tier.magi_ceiling_single,
                FilingStatus::MarriedFilingJointly => tier.magi_ceiling_married,
            };
            magi <= ceiling
        })
        .unwrap_or(&TIERS[5])
}

/// Annual IRMAA surcharge for a Modified AGI.
///
/// Zero in the base tier; monotonically non-decreasing in MAGI. Callers
/// apply the 2-year MAGI lookback; this function is a pure bracket lookup.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::FilingStatus;
/// use plan_engine::tax::annual_irmaa_surcharge;
///
/// assert_eq!(annual_irmaa_surcharge(80_000.0, FilingStatus::Single), 0.0);
/// assert!(annual_irmaa_surcharge(150_000.0, FilingStatus::Single) > 0.0);
/// ```
pub fn annual_irmaa_surcharge(magi: f64, filing: FilingStatus) -> f64 {
    let tier = tier_for(magi.max(0.0), filing);
    ((tier.part_b_monthly - BASE_PART_B_MONTHLY) + tier.part_d_monthly) * 12.0
}
