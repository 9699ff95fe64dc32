//! Combined federal and state rate model.
//!
//! 2024 federal ordinary brackets, long-term capital-gains brackets, and
//! standard deductions (including the age-65 additional amount), plus a flat
//! state-rate table keyed by two-letter code. Progressive state schedules
//! are approximated by a single effective rate; precise state modelling is
//! out of scope for the simulation core.

use plan_core::types::FilingStatus;

/// `(upper_bound, rate)` rows; the last row is open-ended.
type Brackets = &'static [(f64, f64)];

const ORDINARY_SINGLE: Brackets = &[
    (11_600.0, 0.10),
    (47_150.0, 0.12),
    (100_525.0, 0.22),
    (191_950.0, 0.24),
    (243_725.0, 0.32),
    (609_350.0, 0.35),
    (f64::INFINITY, 0.37),
];

const ORDINARY_MARRIED: Brackets = &[
    (23_200.0, 0.10),
    (94_300.0, 0.12),
    (201_050.0, 0.22),
    (383_900.0, 0.24),
    (487_450.0, 0.32),
    (731_200.0, 0.35),
    (f64::INFINITY, 0.37),
];

const GAINS_SINGLE: Brackets = &[
    (47_025.0, 0.0),
    (518_900.0, 0.15),
    (f64::INFINITY, 0.20),
];

const GAINS_MARRIED: Brackets = &[
    (94_050.0, 0.0),
    (583_750.0, 0.15),
    (f64::INFINITY, 0.20),
];

fn ordinary_brackets(filing: FilingStatus) -> Brackets {
    match filing {
        FilingStatus::Single => ORDINARY_SINGLE,
        FilingStatus::MarriedFilingJointly => ORDINARY_MARRIED,
    }
}

fn gains_brackets(filing: FilingStatus) -> Brackets {
    match filing {
        FilingStatus::Single => GAINS_SINGLE,
        FilingStatus::MarriedFilingJointly => GAINS_MARRIED,
    }
}

/// Standard deduction including the additional amount for filers 65+.
pub fn standard_deduction(filing: FilingStatus, age: u32, spouse_age: Option<u32>) -> f64 {
    match filing {
        FilingStatus::Single => {
            let extra = if age >= 65 { 1_950.0 } else { 0.0 };
            14_600.0 + extra
        }
        FilingStatus::MarriedFilingJointly => {
            let mut extra = 0.0;
            if age >= 65 {
                extra += 1_550.0;
            }
            if spouse_age.is_some_and(|a| a >= 65) {
                extra += 1_550.0;
            }
            29_200.0 + extra
        }
    }
}

/// Flat effective state income-tax rate by two-letter code.
///
/// No-income-tax states return zero; unknown codes fall back to 5%.
pub fn state_rate(state: &str) -> f64 {
    match state.to_ascii_uppercase().as_str() {
        "AK" | "FL" | "NV" | "NH" | "SD" | "TN" | "TX" | "WA" | "WY" => 0.0,
        "CA" => 0.080,
        "OR" => 0.087,
        "MN" => 0.0785,
        "NY" => 0.0650,
        "NJ" => 0.0637,
        "HI" => 0.0790,
        "IA" => 0.057,
        "GA" => 0.0549,
        "WI" => 0.053,
        "MA" => 0.050,
        "IL" => 0.0495,
        "MI" => 0.0425,
        "VA" => 0.0575,
        "NC" => 0.045,
        "CO" => 0.044,
        "UT" => 0.0465,
        "AZ" => 0.025,
        "PA" => 0.0307,
        "OH" => 0.035,
        "IN" => 0.0305,
        "ND" => 0.0225,
        _ => 0.050,
    }
}

/// Tax accumulated across bracket rows for `amount` of income starting at
/// the bottom of the schedule.
fn bracket_tax(brackets: Brackets, amount: f64) -> f64 {
    let mut tax = 0.0;
    let mut floor = 0.0;
    for &(ceiling, rate) in brackets {
        if amount <= floor {
            break;
        }
        let span = amount.min(ceiling) - floor;
        tax += span * rate;
        floor = ceiling;
    }
    tax
}

/// Marginal rate at `amount` of taxable income.
fn bracket_marginal(brackets: Brackets, amount: f64) -> f64 {
    for &(ceiling, rate) in brackets {
        if amount <= ceiling {
            return rate;
        }
    }
    brackets.last().map(|&(_, rate)| rate).unwrap_or(0.0)
}

/// Capital-gains tax with gains stacked on top of ordinary taxable income,
/// as on the Schedule D worksheet.
fn stacked_gains_tax(brackets: Brackets, taxable_ordinary: f64, gains: f64) -> f64 {
    bracket_tax(brackets, taxable_ordinary + gains) - bracket_tax(brackets, taxable_ordinary)
}

/// Result of one combined federal/state assessment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TaxAssessment {
    /// Federal tax on ordinary income plus stacked capital gains.
    pub federal_tax: f64,
    /// Flat-rate state tax on the combined taxable base.
    pub state_tax: f64,
    /// `federal_tax + state_tax`.
    pub total_tax: f64,
    /// Ordinary income remaining after the standard deduction.
    pub taxable_ordinary: f64,
    /// Combined marginal rate at the assessed income level.
    pub marginal_rate: f64,
    /// `total_tax` over gross income (zero when there is no income).
    pub effective_rate: f64,
}

/// Computes combined federal and state tax for one simulated year.
///
/// `ordinary_income` is pension plus tax-deferred withdrawals (everything
/// taxed at ordinary rates except Social Security, which arrives already
/// reduced to its taxable portion in `taxable_social_security`).
/// `capital_gains` is the realised-gains portion of taxable-brokerage
/// withdrawals. Deduction left over after ordinary income shelters gains.
pub fn combined_tax(
    ordinary_income: f64,
    taxable_social_security: f64,
    capital_gains: f64,
    filing: FilingStatus,
    state: &str,
    age: u32,
    spouse_age: Option<u32>,
) -> TaxAssessment {
    let ordinary_income = ordinary_income.max(0.0);
    let taxable_social_security = taxable_social_security.max(0.0);
    let capital_gains = capital_gains.max(0.0);

    let deduction = standard_deduction(filing, age, spouse_age);
    let ordinary_base = ordinary_income + taxable_social_security;
    let taxable_ordinary = (ordinary_base - deduction).max(0.0);
    let unused_deduction = (deduction - ordinary_base).max(0.0);
    let taxable_gains = (capital_gains - unused_deduction).max(0.0);

    let ordinary = ordinary_brackets(filing);
    let gains = gains_brackets(filing);

    let federal_tax =
        bracket_tax(ordinary, taxable_ordinary) + stacked_gains_tax(gains, taxable_ordinary, taxable_gains);
    let rate = state_rate(state);
    let state_tax = rate * (taxable_ordinary + taxable_gains);
    let total_tax = federal_tax + state_tax;

    let gross = ordinary_income + taxable_social_security + capital_gains;
    let effective_rate = if gross > 0.0 { total_tax / gross } else { 0.0 };
    let marginal_rate = bracket_marginal(ordinary, taxable_ordinary) + rate;

    TaxAssessment {
        federal_tax,
        state_tax,
        total_tax,
        taxable_ordinary,
        marginal_rate,
        effective_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bracket_tax_first_bracket() {
        assert_relative_eq!(bracket_tax(ORDINARY_SINGLE, 10_000.0), 1_000.0);
    }

    #[test]
    fn test_bracket_tax_spans_brackets() {
        // 11,600 * 0.10 + (30,000 - 11,600) * 0.12 = 1,160 + 2,208.
        assert_relative_eq!(bracket_tax(ORDINARY_SINGLE, 30_000.0), 3_368.0);
    }

    #[test]
    fn test_standard_deduction_age_additions() {
        assert_eq!(standard_deduction(FilingStatus::Single, 64, None), 14_600.0);
        assert_eq!(standard_deduction(FilingStatus::Single, 65, None), 16_550.0);
        assert_eq!(
            standard_deduction(FilingStatus::MarriedFilingJointly, 66, Some(67)),
            32_300.0
        );
        assert_eq!(
            standard_deduction(FilingStatus::MarriedFilingJointly, 66, Some(60)),
            30_750.0
        );
    }

    #[test]
    fn test_income_below_deduction_untaxed() {
        let assessment = combined_tax(
            12_000.0,
            0.0,
            0.0,
            FilingStatus::Single,
            "FL",
            66,
            None,
        );
        assert_eq!(assessment.total_tax, 0.0);
        assert_eq!(assessment.effective_rate, 0.0);
    }

    #[test]
    fn test_unused_deduction_shelters_gains() {
        // 10k ordinary leaves 6,550 of deduction for 5k of gains.
        let assessment = combined_tax(
            10_000.0,
            0.0,
            5_000.0,
            FilingStatus::Single,
            "FL",
            66,
            None,
        );
        assert_eq!(assessment.total_tax, 0.0);
    }

    #[test]
    fn test_gains_stack_on_ordinary_income() {
        // Enough ordinary income to push gains out of the 0% band.
        let low_stack = combined_tax(20_000.0, 0.0, 40_000.0, FilingStatus::Single, "FL", 66, None);
        let high_stack = combined_tax(80_000.0, 0.0, 40_000.0, FilingStatus::Single, "FL", 66, None);
        let low_gains_tax = low_stack.federal_tax - bracket_tax(ORDINARY_SINGLE, low_stack.taxable_ordinary);
        let high_gains_tax =
            high_stack.federal_tax - bracket_tax(ORDINARY_SINGLE, high_stack.taxable_ordinary);
        assert!(high_gains_tax > low_gains_tax);
    }

    #[test]
    fn test_state_rate_table() {
        assert_eq!(state_rate("TX"), 0.0);
        assert_eq!(state_rate("fl"), 0.0);
        assert_relative_eq!(state_rate("CA"), 0.080);
        assert_relative_eq!(state_rate("ZZ"), 0.050);
    }

    #[test]
    fn test_state_tax_added_to_total() {
        let no_tax = combined_tax(60_000.0, 0.0, 0.0, FilingStatus::Single, "FL", 66, None);
        let with_tax = combined_tax(60_000.0, 0.0, 0.0, FilingStatus::Single, "CA", 66, None);
        assert_relative_eq!(no_tax.state_tax, 0.0);
        assert!(with_tax.total_tax > no_tax.total_tax);
        assert_relative_eq!(
            with_tax.state_tax,
            0.080 * with_tax.taxable_ordinary,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_effective_rate_below_marginal() {
        let assessment = combined_tax(120_000.0, 0.0, 0.0, FilingStatus::Single, "CA", 66, None);
        assert!(assessment.effective_rate > 0.0);
        assert!(assessment.effective_rate < assessment.marginal_rate);
    }

    #[test]
    fn test_married_pays_less_at_same_income() {
        let single = combined_tax(100_000.0, 0.0, 0.0, FilingStatus::Single, "FL", 66, None);
        let married = combined_tax(
            100_000.0,
            0.0,
            0.0,
            FilingStatus::MarriedFilingJointly,
            "FL",
            66,
            Some(66),
        );
        assert!(married.total_tax < single.total_tax);
    }

    #[test]
    fn test_tax_monotone_in_income() {
        let mut prev = 0.0;
        for income in (0..80).map(|i| f64::from(i) * 5_000.0) {
            let assessment = combined_tax(income, 0.0, 0.0, FilingStatus::Single, "CA", 66, None);
            assert!(assessment.total_tax + 1e-9 >= prev);
            prev = assessment.total_tax;
        }
    }
}
