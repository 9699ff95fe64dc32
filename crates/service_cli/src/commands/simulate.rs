//! Simulate command implementation
//!
//! Runs the full Monte Carlo study for a plan file and prints either a
//! human-readable summary or the complete result as JSON.

use tracing::info;

use plan_core::types::AggregateResult;
use plan_engine::run_monte_carlo;

use crate::config::load_plan;
use crate::{CliError, Result};

/// Run the simulate command.
pub fn run(
    plan_path: &str,
    iterations: u32,
    seed: u64,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    info!("Loading plan from {}", plan_path);
    let params = load_plan(plan_path)?;

    info!("Running {} realizations (seed {})", iterations, seed);
    let result = run_monte_carlo(&params, iterations, seed)?;

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&result)?,
        "summary" => render_summary(&result),
        other => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown format: {other}. Supported: summary, json"
            )));
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Results written to {}", path);
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render_summary(result: &AggregateResult) -> String {
    let pct = |v: f64| format!("{:.1}%", v * 100.0);
    let usd = |v: f64| format!("${:.0}", v);
    let mut out = String::new();
    out.push_str(&format!(
        "Success probability:   {} (±{})\n",
        pct(result.success_probability),
        pct(result.success_std_error)
    ));
    out.push_str(&format!(
        "Safe withdrawal rate:  {}\n",
        pct(result.safe_withdrawal_rate)
    ));
    out.push_str("Ending balance percentiles:\n");
    out.push_str(&format!("  10th: {}\n", usd(result.percentiles.p10)));
    out.push_str(&format!("  25th: {}\n", usd(result.percentiles.p25)));
    out.push_str(&format!("  50th: {}\n", usd(result.percentiles.p50)));
    out.push_str(&format!("  75th: {}\n", usd(result.percentiles.p75)));
    out.push_str(&format!("  90th: {}\n", usd(result.percentiles.p90)));
    out.push_str(&format!(
        "Worst case balance:    {}\n",
        usd(result.worst_case_balance)
    ));
    out.push_str(&format!(
        "Mean effective tax:    {}\n",
        pct(result.mean_effective_tax_rate)
    ));
    out.push_str(&format!(
        "IRMAA incidence:       {}\n",
        pct(result.irmaa_incidence)
    ));
    out.push_str(&format!(
        "Avg bear/crisis years: {:.1} / {:.1}\n",
        result.avg_years_in_bear, result.avg_years_in_crisis
    ));
    out.push_str(&format!(
        "Legacy goal met:       {}\n",
        pct(result.legacy_goal_probability)
    ));
    out.push_str(&format!(
        "({} realizations, seed {})\n",
        result.iterations, result.seed
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLAN_TEMPLATE;

    #[test]
    fn test_simulate_writes_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.toml");
        let out = dir.path().join("result.json");
        std::fs::write(&plan, PLAN_TEMPLATE).unwrap();

        run(
            plan.to_str().unwrap(),
            100,
            42,
            "json",
            Some(out.to_str().unwrap()),
        )
        .unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(parsed["success_probability"].is_number());
        assert_eq!(parsed["iterations"], 100);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.toml");
        std::fs::write(&plan, PLAN_TEMPLATE).unwrap();
        let err = run(plan.to_str().unwrap(), 10, 1, "xml", None).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
