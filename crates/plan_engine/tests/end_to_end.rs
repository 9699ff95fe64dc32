//! End-to-end batch behaviour for a reference plan.

use plan_core::types::{AssetBuckets, SimulationParameters};
use plan_engine::run_monte_carlo;
use plan_engine::rng::PlanRng;

fn reference_plan() -> SimulationParameters {
    SimulationParameters::builder()
        .current_age(65)
        .retirement_age(65)
        .life_expectancy(88)
        .buckets(AssetBuckets::new(750_000.0, 150_000.0, 450_000.0, 150_000.0))
        .annual_living_expenses(60_000.0)
        .annual_healthcare_expenses(8_000.0)
        .annual_social_security(30_000.0)
        .build()
        .unwrap()
}

#[test]
fn identical_inputs_are_bit_identical() {
    let params = reference_plan();
    let a = run_monte_carlo(&params, 1_000, 12_345).unwrap();
    let b = run_monte_carlo(&params, 1_000, 12_345).unwrap();
    assert_eq!(a, b);
}

#[test]
fn reference_plan_lands_in_plausible_band() {
    // $1.5M funding a ~$38k net need is a solidly but not absurdly funded
    // plan; anything outside a wide band signals a broken model, not noise.
    let result = run_monte_carlo(&reference_plan(), 1_000, 12_345).unwrap();
    assert!(
        result.success_probability > 0.55,
        "success probability {} implausibly low",
        result.success_probability
    );
    assert!(result.percentiles.is_ordered());
    assert!(result.worst_case_balance <= result.percentiles.p10);
    assert!(result.avg_years_in_crisis < result.avg_years_in_bear + 5.0);
}

#[test]
fn success_is_monotone_in_starting_assets() {
    let scales = [0.25, 1.0, 4.0];
    let mut probabilities = Vec::new();
    for scale in scales {
        let mut params = reference_plan();
        params.buckets = AssetBuckets::new(
            750_000.0 * scale,
            150_000.0 * scale,
            450_000.0 * scale,
            150_000.0 * scale,
        );
        let result = run_monte_carlo(&params, 800, 99).unwrap();
        probabilities.push(result.success_probability);
    }
    assert!(
        probabilities[0] <= probabilities[1] + 0.02 && probabilities[1] <= probabilities[2] + 0.02,
        "success not monotone in assets: {probabilities:?}"
    );
}

#[test]
fn rmd_floor_shows_up_in_timelines() {
    // Guaranteed income fully covers spending, so every withdrawal in the
    // timeline after 73 must come from the RMD floor.
    let params = SimulationParameters::builder()
        .current_age(74)
        .retirement_age(74)
        .life_expectancy(90)
        .buckets(AssetBuckets::new(2_000_000.0, 0.0, 0.0, 0.0))
        .annual_living_expenses(20_000.0)
        .annual_healthcare_expenses(5_000.0)
        .annual_social_security(50_000.0)
        .build()
        .unwrap();
    let result = run_monte_carlo(&params, 50, 7).unwrap();
    let forced_years = result
        .sample_timeline
        .iter()
        .filter(|y| y.age >= 74 && y.gross_withdrawal > 0.0)
        .count();
    assert!(forced_years > 0, "no RMD-forced withdrawals in timeline");
}

#[test]
fn safe_rate_reruns_near_target() {
    let params = reference_plan();
    let result = run_monte_carlo(&params, 1_000, 12_345).unwrap();
    let rate = result.safe_withdrawal_rate;
    assert!(rate > 0.0 && rate <= 0.10);

    // Re-simulating at the reported rate should clear (or come close to)
    // the 90% target; allow slack for batch-size noise.
    let total = params.annual_living_expenses + params.annual_healthcare_expenses;
    let living_share = params.annual_living_expenses / total;
    let spending = rate * params.buckets.total();
    let mut rescaled = params.clone();
    rescaled.annual_living_expenses = spending * living_share;
    rescaled.annual_healthcare_expenses = spending * (1.0 - living_share);
    let check = run_monte_carlo(&rescaled, 1_000, 777).unwrap();
    assert!(
        check.success_probability > 0.82,
        "safe rate {rate} only achieved {}",
        check.success_probability
    );
}

#[test]
fn derived_streams_decouple_realizations() {
    // Consuming draws from the root stream must not disturb realizations
    // derived from it, which is what makes the parallel batch stable.
    let root = PlanRng::from_seed(42);
    let before = root.derive("realization", 3).seed();
    let mut consumed = root.derive("other", 0);
    use plan_engine::rng::RandomSource;
    let _ = consumed.normal();
    let after = root.derive("realization", 3).seed();
    assert_eq!(before, after);
}
