//! Plan-file loading.
//!
//! Plans are TOML documents grouped into sections that mirror how people
//! talk about their finances (household, assets, income, expenses), then
//! mapped onto [`SimulationParameters`] through the builder so every input
//! passes the same validation the library applies.

use std::path::Path;

use serde::Deserialize;

use plan_core::types::{
    AssetBuckets, FilingStatus, HealthStatus, Sex, SimulationParameters,
};

use crate::error::{CliError, Result};

#[derive(Debug, Deserialize)]
pub struct PlanFile {
    pub household: Household,
    pub plan: Plan,
    pub assets: Assets,
    #[serde(default)]
    pub income: Income,
    pub expenses: Expenses,
    #[serde(default)]
    pub economy: Economy,
    #[serde(default)]
    pub allocation: Allocation,
}

#[derive(Debug, Deserialize)]
pub struct Household {
    pub current_age: u32,
    #[serde(default = "default_sex")]
    pub sex: String,
    #[serde(default = "default_health")]
    pub health: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_filing")]
    pub filing_status: String,
    pub spouse: Option<Spouse>,
}

#[derive(Debug, Deserialize)]
pub struct Spouse {
    pub age: u32,
    #[serde(default = "default_sex")]
    pub sex: String,
    #[serde(default = "default_health")]
    pub health: String,
}

#[derive(Debug, Deserialize)]
pub struct Plan {
    pub retirement_age: u32,
    pub life_expectancy: u32,
    #[serde(default)]
    pub annual_savings: f64,
    #[serde(default)]
    pub legacy_goal: f64,
    #[serde(default)]
    pub guardrails: bool,
}

#[derive(Debug, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub tax_deferred: f64,
    #[serde(default)]
    pub tax_free: f64,
    #[serde(default)]
    pub capital_gains: f64,
    #[serde(default)]
    pub cash: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Income {
    #[serde(default)]
    pub social_security: f64,
    #[serde(default)]
    pub pension: f64,
}

#[derive(Debug, Deserialize)]
pub struct Expenses {
    pub living: f64,
    #[serde(default)]
    pub healthcare: f64,
}

#[derive(Debug, Deserialize)]
pub struct Economy {
    pub inflation: f64,
    pub healthcare_inflation: f64,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            inflation: 0.03,
            healthcare_inflation: 0.05,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Allocation {
    pub stocks: f64,
    pub bonds: f64,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            stocks: 0.60,
            bonds: 0.35,
        }
    }
}

fn default_sex() -> String {
    "male".to_string()
}

fn default_health() -> String {
    "good".to_string()
}

fn default_state() -> String {
    "FL".to_string()
}

fn default_filing() -> String {
    "single".to_string()
}

fn parse_sex(value: &str) -> Result<Sex> {
    match value.to_ascii_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => Err(CliError::InvalidField {
            field: "sex".to_string(),
            reason: format!("expected male or female, got {other:?}"),
        }),
    }
}

fn parse_health(value: &str) -> Result<HealthStatus> {
    match value.to_ascii_lowercase().as_str() {
        "excellent" => Ok(HealthStatus::Excellent),
        "good" => Ok(HealthStatus::Good),
        "fair" => Ok(HealthStatus::Fair),
        "poor" => Ok(HealthStatus::Poor),
        other => Err(CliError::InvalidField {
            field: "health".to_string(),
            reason: format!("expected excellent, good, fair, or poor, got {other:?}"),
        }),
    }
}

fn parse_filing(value: &str) -> Result<FilingStatus> {
    match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "single" => Ok(FilingStatus::Single),
        "married" | "marriedfilingjointly" | "joint" => Ok(FilingStatus::MarriedFilingJointly),
        other => Err(CliError::InvalidField {
            field: "filing_status".to_string(),
            reason: format!("expected single or married, got {other:?}"),
        }),
    }
}

/// Reads and validates a plan file into engine parameters.
pub fn load_plan(path: &str) -> Result<SimulationParameters> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let file: PlanFile = toml::from_str(&text)?;
    file.into_parameters()
}

impl PlanFile {
    /// Maps the parsed document through the parameter builder.
    pub fn into_parameters(self) -> Result<SimulationParameters> {
        let mut builder = SimulationParameters::builder()
            .current_age(self.household.current_age)
            .sex(parse_sex(&self.household.sex)?)
            .health(parse_health(&self.household.health)?)
            .state(self.household.state)
            .filing_status(parse_filing(&self.household.filing_status)?)
            .retirement_age(self.plan.retirement_age)
            .life_expectancy(self.plan.life_expectancy)
            .annual_savings(self.plan.annual_savings)
            .legacy_goal(self.plan.legacy_goal)
            .guardrails_enabled(self.plan.guardrails)
            .buckets(AssetBuckets::new(
                self.assets.tax_deferred,
                self.assets.tax_free,
                self.assets.capital_gains,
                self.assets.cash,
            ))
            .annual_social_security(self.income.social_security)
            .annual_pension(self.income.pension)
            .annual_living_expenses(self.expenses.living)
            .annual_healthcare_expenses(self.expenses.healthcare)
            .inflation_rate(self.economy.inflation)
            .healthcare_inflation_rate(self.economy.healthcare_inflation)
            .stock_allocation(self.allocation.stocks)
            .bond_allocation(self.allocation.bonds);

        if let Some(spouse) = self.household.spouse {
            builder = builder.spouse(
                spouse.age,
                parse_sex(&spouse.sex)?,
                parse_health(&spouse.health)?,
            );
        }

        builder
            .build()
            .map_err(plan_engine::EngineError::from)
            .map_err(CliError::from)
    }
}

/// Starter plan document emitted by the `template` command.
pub const PLAN_TEMPLATE: &str = r#"# Lifepath retirement plan

[household]
current_age = 60
sex = "female"
health = "good"
state = "FL"
filing_status = "married"

[household.spouse]
age = 62
sex = "male"
health = "good"

[plan]
retirement_age = 65
life_expectancy = 88
annual_savings = 30000.0
legacy_goal = 0.0
guardrails = false

[assets]
tax_deferred = 800000.0
tax_free = 150000.0
capital_gains = 300000.0
cash = 50000.0

[income]
social_security = 42000.0
pension = 0.0

[expenses]
living = 72000.0
healthcare = 10000.0

[economy]
inflation = 0.03
healthcare_inflation = 0.05

[allocation]
stocks = 0.60
bonds = 0.35
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_and_validates() {
        let file: PlanFile = toml::from_str(PLAN_TEMPLATE).unwrap();
        let params = file.into_parameters().unwrap();
        assert_eq!(params.current_age, 60);
        assert!(params.spouse.is_some());
        assert_eq!(params.filing_status, FilingStatus::MarriedFilingJointly);
        assert_eq!(params.buckets.total(), 1_300_000.0);
    }

    #[test]
    fn test_minimal_plan_uses_defaults() {
        let text = r#"
            [household]
            current_age = 65

            [plan]
            retirement_age = 65
            life_expectancy = 85

            [assets]
            cash = 500000.0

            [expenses]
            living = 40000.0
        "#;
        let file: PlanFile = toml::from_str(text).unwrap();
        let params = file.into_parameters().unwrap();
        assert_eq!(params.sex, Sex::Male);
        assert_eq!(params.state, "FL");
        assert_eq!(params.inflation_rate, 0.03);
        assert_eq!(params.stock_allocation, 0.60);
    }

    #[test]
    fn test_bad_enum_value_reports_field() {
        let text = r#"
            [household]
            current_age = 65
            health = "immortal"

            [plan]
            retirement_age = 65
            life_expectancy = 85

            [assets]
            cash = 500000.0

            [expenses]
            living = 40000.0
        "#;
        let file: PlanFile = toml::from_str(text).unwrap();
        let err = file.into_parameters().unwrap_err();
        assert!(matches!(err, CliError::InvalidField { ref field, .. } if field == "health"));
    }

    #[test]
    fn test_missing_file_is_distinct_error() {
        let err = load_plan("/nonexistent/plan.toml").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_load_plan_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        std::fs::write(&path, PLAN_TEMPLATE).unwrap();
        let params = load_plan(path.to_str().unwrap()).unwrap();
        assert_eq!(params.retirement_age, 65);
    }
}
