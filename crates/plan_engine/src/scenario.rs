//! One realization's year-by-year walk.
//!
//! A realization moves through three phases: *accumulating* until the
//! retirement age, *distributing* until the stochastic horizon, and a
//! terminal state of either depletion or survival. All randomness flows
//! through child streams derived from the realization's own stream, so a
//! realization is a pure function of `(parameters, stream)`.

use crate::mortality::stochastic::{
    draw_couple_terminal_ages, draw_terminal_age, LongevityProfile, DEFAULT_COUPLE_CORRELATION,
};
use crate::mortality::MortalityModel;
use crate::regime::MarketRegimeModel;
use crate::rng::{PlanRng, RandomSource};
use crate::solver::{solve_gross_withdrawal, WithdrawalRequest};
use plan_core::types::{
    BucketKind, MarketRegime, ScenarioOutcome, SimulationParameters, TerminalState, YearlyCashFlow,
};

/// Hard cap on distribution years per realization.
pub const MAX_DISTRIBUTION_YEARS: u32 = 60;

/// Pre-retirement savings split across (deferred, free, gains, cash).
const SAVINGS_SPLIT: [(BucketKind, f64); 4] = [
    (BucketKind::TaxDeferred, 0.60),
    (BucketKind::TaxFree, 0.20),
    (BucketKind::CapitalGains, 0.15),
    (BucketKind::Cash, 0.05),
];

/// Survivor rescaling after the first death in a couple.
const SURVIVOR_LIVING_SCALE: f64 = 0.75;
const SURVIVOR_HEALTHCARE_SCALE: f64 = 0.85;
const SURVIVOR_INCOME_SCALE: f64 = 0.60;

/// IRMAA stops rolling into healthcare at this age (2-year MAGI lookback
/// makes late-age surcharges moot within the simulation horizon).
const IRMAA_ROLLFORWARD_MAX_AGE: u32 = 85;

/// Guardrails spending bands and adjustment.
const GUARDRAIL_HIGH_RATE: f64 = 0.055;
const GUARDRAIL_LOW_RATE: f64 = 0.035;
const GUARDRAIL_STEP: f64 = 0.10;
const GUARDRAIL_FLOOR: f64 = 0.70;
const GUARDRAIL_CEILING: f64 = 1.20;

/// Walks single realizations of one plan.
///
/// Holds only shared immutable models; all per-realization state lives on
/// the stack of [`Self::run`], which is what makes realizations
/// embarrassingly parallel.
pub struct ScenarioSimulator<'a> {
    params: &'a SimulationParameters,
    mortality: &'a MortalityModel,
    regimes: &'a MarketRegimeModel,
}

impl<'a> ScenarioSimulator<'a> {
    /// Creates a simulator over shared models.
    pub fn new(
        params: &'a SimulationParameters,
        mortality: &'a MortalityModel,
        regimes: &'a MarketRegimeModel,
    ) -> Self {
        Self {
            params,
            mortality,
            regimes,
        }
    }

    /// Draws the stochastic horizon: the couple's later terminal age, or
    /// the single planholder's terminal age.
    fn draw_horizon_age(&self, rng: &mut PlanRng) -> u32 {
        let p = self.params;
        let user = LongevityProfile {
            current_age: p.current_age,
            baseline: p.life_expectancy,
            sex: p.sex,
            health: p.health,
        };
        match &p.spouse {
            None => draw_terminal_age(&user, rng),
            Some(spouse) => {
                // The spouse's band centres on the mortality model's own
                // expectation for them; the plan baseline describes the user.
                let spouse_baseline = self
                    .mortality
                    .life_expectancy(spouse.age, spouse.sex, spouse.health)
                    .round() as u32;
                let spouse_profile = LongevityProfile {
                    current_age: spouse.age,
                    baseline: spouse_baseline.clamp(spouse.age + 1, 105),
                    sex: spouse.sex,
                    health: spouse.health,
                };
                let (user_age, spouse_age) =
                    draw_couple_terminal_ages(&user, &spouse_profile, DEFAULT_COUPLE_CORRELATION, rng);
                // The portfolio must last for whoever lives longer.
                let spouse_at_user_age =
                    spouse_age.saturating_add(p.current_age).saturating_sub(spouse.age);
                user_age.max(spouse_at_user_age)
            }
        }
    }

    /// Runs one realization to completion.
    pub fn run(&self, rng: PlanRng) -> ScenarioOutcome {
        let p = self.params;
        let mut le_rng = rng.derive("life-expectancy", 0);
        let mut market_rng = rng.derive("market-regime", 0);
        let mut mortality_rng = rng.derive("mortality", 0);
        let mut expense_rng = rng.derive("healthcare-noise", 0);

        let horizon_age = self.draw_horizon_age(&mut le_rng);
        let distribution_years = horizon_age
            .saturating_sub(p.retirement_age)
            .min(MAX_DISTRIBUTION_YEARS);

        let mut buckets = p.buckets;
        let mut regime = MarketRegime::Normal;
        let mut living = p.annual_living_expenses;
        let mut healthcare = p.annual_healthcare_expenses;
        let mut social_security = p.annual_social_security;
        let pension = p.annual_pension;

        let mut yearly: Vec<YearlyCashFlow> =
            Vec::with_capacity((p.accumulation_years() + distribution_years) as usize);
        let mut years_in_bear = 0u32;
        let mut years_in_crisis = 0u32;

        // --- Accumulation ---
        for year in 0..p.accumulation_years() {
            let ret = self.regimes.annual_portfolio_return(
                regime,
                p.stock_allocation,
                p.bond_allocation,
                p.cash_allocation(),
                &mut market_rng,
            );
            buckets = buckets.grown(ret);
            for (kind, share) in SAVINGS_SPLIT {
                buckets = buckets.deposited(kind, p.annual_savings * share);
            }

            match regime {
                MarketRegime::Bear => years_in_bear += 1,
                MarketRegime::Crisis => years_in_crisis += 1,
                _ => {}
            }
            yearly.push(YearlyCashFlow {
                age: p.current_age + year + 1,
                portfolio_balance: buckets.total(),
                guaranteed_income: 0.0,
                gross_withdrawal: 0.0,
                net_cash_flow: p.annual_savings,
                taxes_paid: 0.0,
                irmaa_surcharge: 0.0,
                regime,
            });

            regime = self.regimes.next_regime(regime, &mut market_rng);
            living *= 1.0 + p.inflation_rate;
            healthcare *= 1.0 + p.healthcare_inflation_rate;
            social_security *= 1.0 + p.inflation_rate;
        }

        // --- Distribution ---
        let mut user_alive = true;
        let mut spouse_alive = p.spouse.is_some();
        let was_couple = p.spouse.is_some();
        let mut living_scale = 1.0;
        let mut healthcare_scale = 1.0;
        let mut income_scale = 1.0;
        let mut guardrail_factor = 1.0;
        let mut irmaa_carryover = 0.0;

        let mut total_taxes = 0.0;
        let mut total_irmaa = 0.0;
        let mut gross_income_received = 0.0;
        let mut depletion: Option<u32> = None;

        for year in 0..distribution_years {
            let sim_age = p.retirement_age + year;

            // Market return lands before the withdrawal.
            let ret = self.regimes.annual_portfolio_return(
                regime,
                p.stock_allocation,
                p.bond_allocation,
                p.cash_allocation(),
                &mut market_rng,
            );
            buckets = buckets.grown(ret);
            let balance_before_withdrawal = buckets.total();

            // Living and healthcare costs inflate independently; healthcare
            // carries extra noise on top of its higher trend.
            living *= 1.0 + p.inflation_rate;
            let healthcare_inflation =
                p.healthcare_inflation_rate + 0.01 * expense_rng.normal();
            healthcare *= (1.0 + healthcare_inflation).max(0.0);
            social_security *= 1.0 + p.inflation_rate;

            let any_alive = user_alive || spouse_alive;
            let healthcare_cost = if any_alive {
                let rolled = if sim_age < IRMAA_ROLLFORWARD_MAX_AGE {
                    irmaa_carryover
                } else {
                    0.0
                };
                healthcare * healthcare_scale + rolled
            } else {
                0.0
            };
            let expenses = if any_alive {
                living * living_scale * guardrail_factor + healthcare_cost
            } else {
                0.0
            };
            let ss_now = if any_alive { social_security * income_scale } else { 0.0 };
            let pension_now = if any_alive { pension * income_scale } else { 0.0 };
            let guaranteed = ss_now + pension_now;
            let net_need = (expenses - guaranteed).max(0.0);

            let (solution_net, solution_gross, taxes, irmaa) = if any_alive {
                let spouse_age_now = p.spouse.as_ref().filter(|_| spouse_alive).map(|s| {
                    s.age + (sim_age - p.current_age)
                });
                let solution = solve_gross_withdrawal(&WithdrawalRequest {
                    target_net: net_need,
                    buckets: &buckets,
                    social_security: ss_now,
                    other_ordinary_income: pension_now,
                    age: sim_age,
                    spouse_age: spouse_age_now,
                    filing: p.filing_status,
                    state: &p.state,
                });
                buckets = solution.buckets_after;
                (
                    solution.net_after_tax,
                    solution.draw.total(),
                    solution.total_tax,
                    solution.irmaa_surcharge,
                )
            } else {
                // Both dead before the horizon: expenses stop, but the walk
                // continues untouched to test whether the portfolio would
                // have lasted.
                (0.0, 0.0, 0.0, 0.0)
            };

            total_taxes += taxes;
            total_irmaa += irmaa;
            gross_income_received += solution_gross + guaranteed;
            irmaa_carryover = if sim_age < IRMAA_ROLLFORWARD_MAX_AGE { irmaa } else { 0.0 };

            match regime {
                MarketRegime::Bear => years_in_bear += 1,
                MarketRegime::Crisis => years_in_crisis += 1,
                _ => {}
            }
            yearly.push(YearlyCashFlow {
                age: sim_age,
                portfolio_balance: buckets.total(),
                guaranteed_income: guaranteed,
                gross_withdrawal: solution_gross,
                net_cash_flow: guaranteed + solution_net - expenses,
                taxes_paid: taxes,
                irmaa_surcharge: irmaa,
                regime,
            });

            // A shortfall against real need with nothing left is depletion.
            if buckets.is_depleted() && any_alive && solution_net + 1.0 < net_need {
                depletion = Some(year);
                break;
            }

            if p.guardrails_enabled && balance_before_withdrawal > 0.0 {
                let rate = solution_gross / balance_before_withdrawal;
                if rate > GUARDRAIL_HIGH_RATE {
                    guardrail_factor =
                        (guardrail_factor * (1.0 - GUARDRAIL_STEP)).max(GUARDRAIL_FLOOR);
                } else if rate < GUARDRAIL_LOW_RATE {
                    guardrail_factor =
                        (guardrail_factor * (1.0 + GUARDRAIL_STEP)).min(GUARDRAIL_CEILING);
                }
            }

            // Survival draws; a couple's first death rescales ongoing
            // figures instead of zeroing them.
            if user_alive
                && !self
                    .mortality
                    .simulate_survival(sim_age, p.sex, p.health, &mut mortality_rng)
            {
                user_alive = false;
            }
            if let Some(spouse) = &p.spouse {
                let spouse_age_now = spouse.age + (sim_age - p.current_age);
                if spouse_alive
                    && !self.mortality.simulate_survival(
                        spouse_age_now,
                        spouse.sex,
                        spouse.health,
                        &mut mortality_rng,
                    )
                {
                    spouse_alive = false;
                }
            }
            if was_couple && (user_alive ^ spouse_alive) && living_scale == 1.0 {
                living_scale = SURVIVOR_LIVING_SCALE;
                healthcare_scale = SURVIVOR_HEALTHCARE_SCALE;
                income_scale = SURVIVOR_INCOME_SCALE;
            }

            regime = self.regimes.next_regime(regime, &mut market_rng);
        }

        let ending_balance = buckets.total();
        let success = depletion.is_none();
        let terminal_state = match depletion {
            Some(year) => TerminalState::Depleted { year },
            None => TerminalState::SurvivedToHorizon,
        };
        let effective_tax_rate = if gross_income_received > 0.0 {
            total_taxes / gross_income_received
        } else {
            0.0
        };

        tracing::trace!(
            success,
            ending_balance,
            horizon_age,
            "realization complete"
        );

        ScenarioOutcome {
            success,
            terminal_state,
            ending_balance,
            terminal_age: horizon_age,
            total_taxes,
            total_irmaa,
            effective_tax_rate,
            years_in_bear,
            years_in_crisis,
            legacy_goal_met: ending_balance >= p.legacy_goal,
            yearly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::types::{AssetBuckets, HealthStatus, Sex};

    fn models() -> (MortalityModel, MarketRegimeModel) {
        (MortalityModel::new(), MarketRegimeModel::new())
    }

    fn retiree_params(assets: f64, expenses: f64) -> SimulationParameters {
        SimulationParameters::builder()
            .current_age(65)
            .retirement_age(65)
            .life_expectancy(88)
            .buckets(AssetBuckets::new(
                assets * 0.5,
                assets * 0.15,
                assets * 0.25,
                assets * 0.10,
            ))
            .annual_living_expenses(expenses)
            .annual_healthcare_expenses(8_000.0)
            .annual_social_security(30_000.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_realization_is_deterministic() {
        let (mortality, regimes) = models();
        let params = retiree_params(1_500_000.0, 60_000.0);
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let a = sim.run(PlanRng::from_seed(42));
        let b = sim.run(PlanRng::from_seed(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bucket_invariants_hold_every_year() {
        let (mortality, regimes) = models();
        let params = retiree_params(1_200_000.0, 70_000.0);
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        for seed in 0..20 {
            let outcome = sim.run(PlanRng::from_seed(seed));
            for record in &outcome.yearly {
                assert!(record.portfolio_balance >= 0.0);
                assert!(record.gross_withdrawal >= 0.0);
                assert!(record.taxes_paid >= 0.0);
            }
        }
    }

    #[test]
    fn test_wealthy_plan_rarely_fails() {
        let (mortality, regimes) = models();
        let params = retiree_params(5_000_000.0, 40_000.0);
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let successes = (0..50)
            .filter(|&seed| sim.run(PlanRng::from_seed(seed)).success)
            .count();
        assert!(successes >= 48, "only {successes}/50 succeeded");
    }

    #[test]
    fn test_underfunded_plan_depletes() {
        let (mortality, regimes) = models();
        let params = retiree_params(100_000.0, 90_000.0);
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let outcome = sim.run(PlanRng::from_seed(1));
        assert!(!outcome.success);
        assert!(outcome.depletion_year().is_some());
        assert!(outcome.ending_balance <= 1.0);
    }

    #[test]
    fn test_depletion_stops_the_timeline_early() {
        let (mortality, regimes) = models();
        let params = retiree_params(100_000.0, 90_000.0);
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let outcome = sim.run(PlanRng::from_seed(1));
        let horizon = outcome.terminal_age.saturating_sub(65).min(MAX_DISTRIBUTION_YEARS);
        assert!((outcome.yearly.len() as u32) < horizon.max(1) + 1);
    }

    #[test]
    fn test_accumulation_phase_grows_savings() {
        let (mortality, regimes) = models();
        let params = SimulationParameters::builder()
            .current_age(50)
            .retirement_age(60)
            .life_expectancy(85)
            .buckets(AssetBuckets::new(100_000.0, 0.0, 0.0, 0.0))
            .annual_living_expenses(40_000.0)
            .annual_social_security(25_000.0)
            .annual_savings(30_000.0)
            .build()
            .unwrap();
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let outcome = sim.run(PlanRng::from_seed(3));
        // Ten accumulation records precede the first withdrawal record.
        assert!(outcome.yearly.len() >= 10);
        assert!(outcome.yearly[..10].iter().all(|r| r.gross_withdrawal == 0.0));
        assert!(outcome.yearly[9].portfolio_balance > 100_000.0);
    }

    #[test]
    fn test_rmd_floor_in_distribution_records() {
        let (mortality, regimes) = models();
        let params = SimulationParameters::builder()
            .current_age(75)
            .retirement_age(75)
            .life_expectancy(90)
            .buckets(AssetBuckets::new(2_000_000.0, 0.0, 0.0, 0.0))
            .annual_living_expenses(20_000.0)
            .annual_social_security(40_000.0)
            .build()
            .unwrap();
        let sim = ScenarioSimulator::new(&params, &mortality, &regimes);
        let outcome = sim.run(PlanRng::from_seed(5));
        // Guaranteed income covers expenses, yet RMDs force withdrawals.
        let first = &outcome.yearly[0];
        assert!(first.gross_withdrawal > 0.0);
    }

    #[test]
    fn test_couple_plan_runs_to_later_horizon() {
        let (mortality, regimes) = models();
        let mut single = retiree_params(1_500_000.0, 60_000.0);
        single.life_expectancy = 85;
        let mut couple = single.clone();
        couple.spouse = Some(plan_core::types::SpouseParameters {
            age: 62,
            sex: Sex::Female,
            health: HealthStatus::Good,
        });
        let sim_single = ScenarioSimulator::new(&single, &mortality, &regimes);
        let sim_couple = ScenarioSimulator::new(&couple, &mortality, &regimes);
        let mean_horizon = |sim: &ScenarioSimulator<'_>| {
            (0..200)
                .map(|seed| f64::from(sim.run(PlanRng::from_seed(seed)).terminal_age))
                .sum::<f64>()
                / 200.0
        };
        assert!(mean_horizon(&sim_couple) > mean_horizon(&sim_single));
    }

    #[test]
    fn test_guardrails_reduce_failures_when_stressed() {
        let (mortality, regimes) = models();
        let base = retiree_params(800_000.0, 70_000.0);
        let mut guarded = base.clone();
        guarded.guardrails_enabled = true;
        let sim_base = ScenarioSimulator::new(&base, &mortality, &regimes);
        let sim_guarded = ScenarioSimulator::new(&guarded, &mortality, &regimes);
        let failures = |sim: &ScenarioSimulator<'_>| {
            (0..200)
                .filter(|&seed| !sim.run(PlanRng::from_seed(seed)).success)
                .count()
        };
        // Identical RNG paths, lower stressed spending: guardrails should
        // not make outcomes materially worse and usually help.
        assert!(failures(&sim_guarded) <= failures(&sim_base) + 2);
    }
}
