//! Safe-rate command implementation
//!
//! Reports the highest initial spending rate that keeps the plan's success
//! probability at or above 90%.

use tracing::info;

use plan_engine::run_monte_carlo;

use crate::config::load_plan;
use crate::Result;

/// Run the safe-rate command.
pub fn run(plan_path: &str, iterations: u32, seed: u64) -> Result<()> {
    info!("Loading plan from {}", plan_path);
    let params = load_plan(plan_path)?;

    info!("Solving safe withdrawal rate ({} realizations, seed {})", iterations, seed);
    let result = run_monte_carlo(&params, iterations, seed)?;

    let spending = result.safe_withdrawal_rate * params.buckets.total();
    println!(
        "Safe withdrawal rate: {:.2}% (${:.0}/year from ${:.0} of assets)",
        result.safe_withdrawal_rate * 100.0,
        spending,
        params.buckets.total()
    );
    Ok(())
}
