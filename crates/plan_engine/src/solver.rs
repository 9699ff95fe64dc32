//! Gross-for-net withdrawal solver.
//!
//! Taxes depend on the withdrawal and the withdrawal depends on taxes, so
//! the gross amount that yields a target net is a fixed point. The solver
//! iterates: source a candidate gross across the buckets in tax-character
//! order, assess Social Security taxation, IRMAA, and the combined rate on
//! the resulting income, then nudge the candidate until net-of-tax lands
//! within tolerance of the target. Convergence is a tagged outcome — at the
//! iteration cap the last estimate is returned, never an error, so batch
//! aggregation always sees exactly one solution per year.

use crate::tax::{
    annual_irmaa_surcharge, combined_tax, required_minimum_distribution, taxable_social_security,
};
use plan_core::types::{AssetBuckets, BucketDraw, FilingStatus};

/// Iteration cap for the fixed-point search.
pub const MAX_SOLVER_ITERATIONS: u32 = 20;

/// Convergence tolerance on `|net - target|`, in dollars.
pub const NET_TOLERANCE: f64 = 100.0;

/// Fraction of a taxable-brokerage withdrawal assumed to be realised gains.
pub const GAINS_FRACTION: f64 = 0.5;

/// Inputs for one year's withdrawal solve.
#[derive(Clone, Copy, Debug)]
pub struct WithdrawalRequest<'a> {
    /// Net-of-tax cash the household needs from the portfolio.
    pub target_net: f64,
    /// Buckets available at the time of withdrawal.
    pub buckets: &'a AssetBuckets,
    /// Gross Social Security benefit received this year.
    pub social_security: f64,
    /// Other ordinary income received this year (pension, annuities).
    pub other_ordinary_income: f64,
    /// Planholder's age this year.
    pub age: u32,
    /// Spouse's age this year, if any.
    pub spouse_age: Option<u32>,
    /// Filing status.
    pub filing: FilingStatus,
    /// Two-letter state code.
    pub state: &'a str,
}

/// How the fixed-point search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// Net landed within [`NET_TOLERANCE`] of the target.
    Converged,
    /// Iteration cap hit; the solution carries the last estimate.
    MaxIterationsReached,
}

/// One year's solved withdrawal.
#[derive(Clone, Copy, Debug)]
pub struct WithdrawalSolution {
    /// Gross amount requested from the portfolio (RMD-floored).
    pub gross_withdrawal: f64,
    /// How the gross was actually sourced; totals less than
    /// `gross_withdrawal` when the portfolio could not cover it.
    pub draw: BucketDraw,
    /// Buckets after the withdrawal.
    pub buckets_after: AssetBuckets,
    /// Net cash after income taxes.
    pub net_after_tax: f64,
    /// Federal plus state tax assessed on the year.
    pub total_tax: f64,
    /// Effective tax rate on the year's gross income.
    pub effective_tax_rate: f64,
    /// IRMAA surcharge assessed from this year's MAGI (the scenario walk
    /// rolls it into next year's healthcare cost).
    pub irmaa_surcharge: f64,
    /// RMD floor applied to the gross withdrawal.
    pub rmd_floor: f64,
    /// Convergence tag.
    pub convergence: Convergence,
    /// Iterations consumed.
    pub iterations: u32,
}

struct Evaluation {
    draw: BucketDraw,
    buckets_after: AssetBuckets,
    net: f64,
    tax: f64,
    effective_rate: f64,
    irmaa: f64,
}

/// Sources `gross` from the buckets and assesses the resulting tax year.
fn evaluate(req: &WithdrawalRequest<'_>, gross: f64) -> Evaluation {
    let (buckets_after, draw) = req.buckets.withdraw_ordered(gross);

    let ordinary = draw.tax_deferred + req.other_ordinary_income;
    let gains = GAINS_FRACTION * draw.capital_gains;
    let taxable_ss = taxable_social_security(req.social_security, ordinary + gains, req.filing);
    let assessment = combined_tax(
        ordinary,
        taxable_ss,
        gains,
        req.filing,
        req.state,
        req.age,
        req.spouse_age,
    );

    // MAGI for IRMAA: AGI (ordinary + gains + taxable SS) with no add-backs
    // modelled. Medicare enrolment starts at 65.
    let irmaa = if req.age >= 65 {
        let magi = ordinary + gains + taxable_ss;
        annual_irmaa_surcharge(magi, req.filing)
    } else {
        0.0
    };

    Evaluation {
        draw,
        buckets_after,
        net: draw.total() - assessment.total_tax,
        tax: assessment.total_tax,
        effective_rate: assessment.effective_rate,
        irmaa,
    }
}

/// Finds the gross withdrawal whose net-of-tax value meets the target.
///
/// The gross is floored at the year's RMD even when that overshoots the
/// target net; candidates are capped at the portfolio total, so a depleted
/// portfolio surfaces as a draw shortfall rather than an error.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::{AssetBuckets, FilingStatus};
/// use plan_engine::solver::{solve_gross_withdrawal, WithdrawalRequest};
///
/// let buckets = AssetBuckets::new(900_000.0, 100_000.0, 300_000.0, 50_000.0);
/// let solution = solve_gross_withdrawal(&WithdrawalRequest {
///     target_net: 50_000.0,
///     buckets: &buckets,
///     social_security: 28_000.0,
///     other_ordinary_income: 0.0,
///     age: 70,
///     spouse_age: None,
///     filing: FilingStatus::Single,
///     state: "FL",
/// });
/// assert!(solution.gross_withdrawal >= 50_000.0);
/// ```
pub fn solve_gross_withdrawal(req: &WithdrawalRequest<'_>) -> WithdrawalSolution {
    let rmd = required_minimum_distribution(req.age, req.buckets.tax_deferred);
    let available = req.buckets.total();
    let target = req.target_net.max(0.0);

    // Nothing needed and nothing forced: a zero withdrawal is exact.
    if target <= 0.0 && rmd <= 0.0 {
        let eval = evaluate(req, 0.0);
        return WithdrawalSolution {
            gross_withdrawal: 0.0,
            draw: eval.draw,
            buckets_after: eval.buckets_after,
            net_after_tax: eval.net,
            total_tax: eval.tax,
            effective_tax_rate: eval.effective_rate,
            irmaa_surcharge: eval.irmaa,
            rmd_floor: rmd,
            convergence: Convergence::Converged,
            iterations: 0,
        };
    }

    let clamp = |gross: f64| gross.max(rmd).min(available.max(rmd));
    let mut gross = clamp(target * 1.3);
    let mut eval = evaluate(req, gross);
    let mut convergence = Convergence::MaxIterationsReached;
    let mut iterations = 0;

    for i in 1..=MAX_SOLVER_ITERATIONS {
        iterations = i;
        if (eval.net - target).abs() < NET_TOLERANCE {
            convergence = Convergence::Converged;
            break;
        }

        // Coarse phase: ±10%/5% steps. Fine phase (within 5% of target):
        // step by the net shortfall itself, which contracts by roughly the
        // marginal rate per iteration and lands inside the $100 tolerance.
        let relative_gap = (eval.net - target).abs() / target.max(1.0);
        let adjusted = if relative_gap > 0.05 {
            if eval.net < target { gross * 1.10 } else { gross * 0.95 }
        } else {
            gross + (target - eval.net)
        };
        let next = clamp(adjusted);
        if next == gross {
            // Pinned against the RMD floor or the portfolio total; further
            // iterations cannot move the estimate.
            break;
        }
        gross = next;
        eval = evaluate(req, gross);
    }

    if (eval.net - target).abs() < NET_TOLERANCE {
        convergence = Convergence::Converged;
    }

    WithdrawalSolution {
        gross_withdrawal: gross,
        draw: eval.draw,
        buckets_after: eval.buckets_after,
        net_after_tax: eval.net,
        total_tax: eval.tax,
        effective_tax_rate: eval.effective_rate,
        irmaa_surcharge: eval.irmaa,
        rmd_floor: rmd,
        convergence,
        iterations,
    }
}
