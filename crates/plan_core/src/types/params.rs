//! Simulation parameters and their builder.
//!
//! One [`SimulationParameters`] value is assembled per plan-evaluation call
//! from upstream profile data and never mutated afterwards. Validation runs
//! once at build time; the engine may assume every field is sane.

use super::buckets::AssetBuckets;
use super::error::ParameterError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum supported current age.
pub const MIN_AGE: u32 = 18;

/// Maximum supported age anywhere in a plan.
pub const MAX_AGE: u32 = 105;

/// Biological sex, as used by the mortality tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sex {
    /// Male mortality table.
    #[default]
    Male,
    /// Female mortality table.
    Female,
}

/// Self-reported health status scaling mortality and longevity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HealthStatus {
    /// Better than average for age.
    Excellent,
    /// Population average.
    #[default]
    Good,
    /// Somewhat impaired.
    Fair,
    /// Significantly impaired.
    Poor,
}

impl HealthStatus {
    /// Multiplier applied to the table annual death probability.
    #[inline]
    pub fn mortality_multiplier(self) -> f64 {
        match self {
            HealthStatus::Excellent => 0.7,
            HealthStatus::Good => 1.0,
            HealthStatus::Fair => 1.5,
            HealthStatus::Poor => 2.2,
        }
    }

    /// Additive adjustment, in years, applied to stochastic terminal-age draws.
    #[inline]
    pub fn longevity_offset_years(self) -> f64 {
        match self {
            HealthStatus::Excellent => 2.0,
            HealthStatus::Good => 0.0,
            HealthStatus::Fair => -2.5,
            HealthStatus::Poor => -5.0,
        }
    }
}

/// Federal filing status; drives tax thresholds and bracket tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilingStatus {
    /// Single filer.
    #[default]
    Single,
    /// Married filing jointly.
    MarriedFilingJointly,
}

/// Spouse-specific inputs for joint plans.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpouseParameters {
    /// Spouse's current age.
    pub age: u32,
    /// Spouse's sex for the mortality tables.
    pub sex: Sex,
    /// Spouse's health status.
    pub health: HealthStatus,
}

/// Immutable inputs for one plan evaluation.
///
/// Constructed via [`SimulationParameters::builder`]; [`Self::validate`] is
/// invoked at build time so an instance in hand is always internally
/// consistent. Monetary figures are annual amounts in today's dollars.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::{AssetBuckets, SimulationParameters};
///
/// let params = SimulationParameters::builder()
///     .current_age(55)
///     .retirement_age(65)
///     .life_expectancy(88)
///     .buckets(AssetBuckets::new(600_000.0, 150_000.0, 200_000.0, 50_000.0))
///     .annual_living_expenses(70_000.0)
///     .annual_social_security(32_000.0)
///     .annual_savings(25_000.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(params.accumulation_years(), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationParameters {
    /// Planholder's current age.
    pub current_age: u32,
    /// Planholder's sex.
    pub sex: Sex,
    /// Planholder's health status.
    pub health: HealthStatus,
    /// Spouse inputs; `None` for single plans.
    pub spouse: Option<SpouseParameters>,
    /// Age at which distribution begins.
    pub retirement_age: u32,
    /// Baseline life expectancy around which terminal ages are drawn.
    pub life_expectancy: u32,
    /// Starting balances by tax character.
    pub buckets: AssetBuckets,
    /// Annual Social Security benefit from retirement, today's dollars.
    pub annual_social_security: f64,
    /// Annual pension or annuity income from retirement, today's dollars.
    pub annual_pension: f64,
    /// Annual non-healthcare living expenses, today's dollars.
    pub annual_living_expenses: f64,
    /// Annual healthcare expenses, today's dollars.
    pub annual_healthcare_expenses: f64,
    /// General inflation rate applied to living expenses.
    pub inflation_rate: f64,
    /// Healthcare inflation rate (typically higher and noisier).
    pub healthcare_inflation_rate: f64,
    /// Equity allocation weight in [0, 1].
    pub stock_allocation: f64,
    /// Bond allocation weight in [0, 1]; cash takes the remainder.
    pub bond_allocation: f64,
    /// Two-letter state code for the state tax table.
    pub state: String,
    /// Federal filing status.
    pub filing_status: FilingStatus,
    /// Enables the guardrails dynamic-spending rule during distribution.
    pub guardrails_enabled: bool,
    /// Desired ending balance; tracked as a statistic, never a failure cause.
    pub legacy_goal: f64,
    /// Annual pre-retirement contributions.
    pub annual_savings: f64,
}

impl SimulationParameters {
    /// Creates a new parameters builder.
    #[inline]
    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    /// Total guaranteed annual income at retirement.
    #[inline]
    pub fn guaranteed_annual_income(&self) -> f64 {
        self.annual_social_security + self.annual_pension
    }

    /// Cash allocation weight, derived from the stock and bond weights.
    #[inline]
    pub fn cash_allocation(&self) -> f64 {
        (1.0 - self.stock_allocation - self.bond_allocation).max(0.0)
    }

    /// Years remaining before distribution begins (zero if already retired).
    #[inline]
    pub fn accumulation_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] encountered: non-finite or
    /// negative monetary values, ages outside `[MIN_AGE, MAX_AGE]`, a
    /// retirement age preceding the current age, or allocation weights
    /// outside the unit simplex.
    pub fn validate(&self) -> Result<(), ParameterError> {
        check_age("current_age", self.current_age)?;
        check_age("retirement_age", self.retirement_age)?;
        check_age("life_expectancy", self.life_expectancy)?;
        if let Some(spouse) = &self.spouse {
            check_age("spouse.age", spouse.age)?;
        }
        if self.retirement_age < self.current_age {
            return Err(ParameterError::RetirementBeforeCurrent {
                current_age: self.current_age,
                retirement_age: self.retirement_age,
            });
        }

        for (name, value) in [
            ("tax_deferred", self.buckets.tax_deferred),
            ("tax_free", self.buckets.tax_free),
            ("capital_gains", self.buckets.capital_gains),
            ("cash", self.buckets.cash),
            ("annual_social_security", self.annual_social_security),
            ("annual_pension", self.annual_pension),
            ("annual_living_expenses", self.annual_living_expenses),
            ("annual_healthcare_expenses", self.annual_healthcare_expenses),
            ("legacy_goal", self.legacy_goal),
            ("annual_savings", self.annual_savings),
        ] {
            check_amount(name, value)?;
        }

        for (name, value) in [
            ("inflation_rate", self.inflation_rate),
            ("healthcare_inflation_rate", self.healthcare_inflation_rate),
        ] {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name });
            }
            if value < 0.0 {
                return Err(ParameterError::Negative { name, value });
            }
        }

        let stocks = self.stock_allocation;
        let bonds = self.bond_allocation;
        let weights_valid = stocks.is_finite()
            && bonds.is_finite()
            && (0.0..=1.0).contains(&stocks)
            && (0.0..=1.0).contains(&bonds)
            && stocks + bonds <= 1.0 + 1e-9;
        if !weights_valid {
            return Err(ParameterError::InvalidAllocation { stocks, bonds });
        }

        Ok(())
    }
}

fn check_age(name: &'static str, age: u32) -> Result<(), ParameterError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ParameterError::AgeOutOfRange {
            name,
            age,
            min: MIN_AGE,
            max: MAX_AGE,
        });
    }
    Ok(())
}

fn check_amount(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NotFinite { name });
    }
    if value < 0.0 {
        return Err(ParameterError::Negative { name, value });
    }
    Ok(())
}

/// Builder for [`SimulationParameters`].
///
/// Required fields: `current_age`, `retirement_age`, `life_expectancy`,
/// `buckets`, `annual_living_expenses`. Everything else has a sensible
/// default. `build` validates the assembled parameters.
#[derive(Clone, Debug, Default)]
pub struct SimulationParametersBuilder {
    current_age: Option<u32>,
    sex: Sex,
    health: HealthStatus,
    spouse: Option<SpouseParameters>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    buckets: Option<AssetBuckets>,
    annual_social_security: f64,
    annual_pension: f64,
    annual_living_expenses: Option<f64>,
    annual_healthcare_expenses: f64,
    inflation_rate: Option<f64>,
    healthcare_inflation_rate: Option<f64>,
    stock_allocation: Option<f64>,
    bond_allocation: Option<f64>,
    state: Option<String>,
    filing_status: FilingStatus,
    guardrails_enabled: bool,
    legacy_goal: f64,
    annual_savings: f64,
}

impl SimulationParametersBuilder {
    /// Sets the planholder's current age.
    #[inline]
    pub fn current_age(mut self, age: u32) -> Self {
        self.current_age = Some(age);
        self
    }

    /// Sets the planholder's sex.
    #[inline]
    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    /// Sets the planholder's health status.
    #[inline]
    pub fn health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    /// Adds a spouse to the plan.
    #[inline]
    pub fn spouse(mut self, age: u32, sex: Sex, health: HealthStatus) -> Self {
        self.spouse = Some(SpouseParameters { age, sex, health });
        self
    }

    /// Sets the retirement age.
    #[inline]
    pub fn retirement_age(mut self, age: u32) -> Self {
        self.retirement_age = Some(age);
        self
    }

    /// Sets the baseline life expectancy.
    #[inline]
    pub fn life_expectancy(mut self, age: u32) -> Self {
        self.life_expectancy = Some(age);
        self
    }

    /// Sets the starting asset buckets.
    #[inline]
    pub fn buckets(mut self, buckets: AssetBuckets) -> Self {
        self.buckets = Some(buckets);
        self
    }

    /// Sets the annual Social Security benefit.
    #[inline]
    pub fn annual_social_security(mut self, amount: f64) -> Self {
        self.annual_social_security = amount;
        self
    }

    /// Sets the annual pension income.
    #[inline]
    pub fn annual_pension(mut self, amount: f64) -> Self {
        self.annual_pension = amount;
        self
    }

    /// Sets annual non-healthcare living expenses.
    #[inline]
    pub fn annual_living_expenses(mut self, amount: f64) -> Self {
        self.annual_living_expenses = Some(amount);
        self
    }

    /// Sets annual healthcare expenses.
    #[inline]
    pub fn annual_healthcare_expenses(mut self, amount: f64) -> Self {
        self.annual_healthcare_expenses = amount;
        self
    }

    /// Sets the general inflation rate (default 3%).
    #[inline]
    pub fn inflation_rate(mut self, rate: f64) -> Self {
        self.inflation_rate = Some(rate);
        self
    }

    /// Sets the healthcare inflation rate (default 5%).
    #[inline]
    pub fn healthcare_inflation_rate(mut self, rate: f64) -> Self {
        self.healthcare_inflation_rate = Some(rate);
        self
    }

    /// Sets the equity allocation weight (default 0.60).
    #[inline]
    pub fn stock_allocation(mut self, weight: f64) -> Self {
        self.stock_allocation = Some(weight);
        self
    }

    /// Sets the bond allocation weight (default 0.35).
    #[inline]
    pub fn bond_allocation(mut self, weight: f64) -> Self {
        self.bond_allocation = Some(weight);
        self
    }

    /// Sets the two-letter state code (default "FL", no state income tax).
    #[inline]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Sets the filing status.
    #[inline]
    pub fn filing_status(mut self, status: FilingStatus) -> Self {
        self.filing_status = status;
        self
    }

    /// Enables or disables the guardrails spending rule.
    #[inline]
    pub fn guardrails_enabled(mut self, enabled: bool) -> Self {
        self.guardrails_enabled = enabled;
        self
    }

    /// Sets the legacy goal.
    #[inline]
    pub fn legacy_goal(mut self, amount: f64) -> Self {
        self.legacy_goal = amount;
        self
    }

    /// Sets annual pre-retirement savings.
    #[inline]
    pub fn annual_savings(mut self, amount: f64) -> Self {
        self.annual_savings = amount;
        self
    }

    /// Builds and validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Missing`] for unset required fields, or any
    /// error from [`SimulationParameters::validate`].
    pub fn build(self) -> Result<SimulationParameters, ParameterError> {
        let params = SimulationParameters {
            current_age: self
                .current_age
                .ok_or(ParameterError::Missing { name: "current_age" })?,
            sex: self.sex,
            health: self.health,
            spouse: self.spouse,
            retirement_age: self
                .retirement_age
                .ok_or(ParameterError::Missing { name: "retirement_age" })?,
            life_expectancy: self
                .life_expectancy
                .ok_or(ParameterError::Missing { name: "life_expectancy" })?,
            buckets: self
                .buckets
                .ok_or(ParameterError::Missing { name: "buckets" })?,
            annual_social_security: self.annual_social_security,
            annual_pension: self.annual_pension,
            annual_living_expenses: self.annual_living_expenses.ok_or(
                ParameterError::Missing {
                    name: "annual_living_expenses",
                },
            )?,
            annual_healthcare_expenses: self.annual_healthcare_expenses,
            inflation_rate: self.inflation_rate.unwrap_or(0.03),
            healthcare_inflation_rate: self.healthcare_inflation_rate.unwrap_or(0.05),
            stock_allocation: self.stock_allocation.unwrap_or(0.60),
            bond_allocation: self.bond_allocation.unwrap_or(0.35),
            state: self.state.unwrap_or_else(|| "FL".to_string()),
            filing_status: self.filing_status,
            guardrails_enabled: self.guardrails_enabled,
            legacy_goal: self.legacy_goal,
            annual_savings: self.annual_savings,
        };

        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> SimulationParametersBuilder {
        SimulationParameters::builder()
            .current_age(65)
            .retirement_age(65)
            .life_expectancy(88)
            .buckets(AssetBuckets::new(800_000.0, 200_000.0, 400_000.0, 100_000.0))
            .annual_living_expenses(60_000.0)
            .annual_social_security(30_000.0)
    }

    #[test]
    fn test_builder_defaults() {
        let params = base_builder().build().unwrap();
        assert_eq!(params.inflation_rate, 0.03);
        assert_eq!(params.healthcare_inflation_rate, 0.05);
        assert_eq!(params.stock_allocation, 0.60);
        assert_eq!(params.state, "FL");
        assert_eq!(params.filing_status, FilingStatus::Single);
        assert!(!params.guardrails_enabled);
    }

    #[test]
    fn test_builder_missing_required_field() {
        let result = SimulationParameters::builder()
            .current_age(65)
            .retirement_age(65)
            .build();
        assert!(matches!(result, Err(ParameterError::Missing { .. })));
    }

    #[test]
    fn test_validate_rejects_nan_expenses() {
        let result = base_builder().annual_living_expenses(f64::NAN).build();
        assert!(matches!(
            result,
            Err(ParameterError::NotFinite {
                name: "annual_living_expenses"
            })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_balance() {
        // AssetBuckets::new clamps, so drive the negative in directly.
        let mut params = base_builder().build().unwrap();
        params.buckets.cash = -5.0;
        assert!(matches!(
            params.validate(),
            Err(ParameterError::Negative { name: "cash", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_retirement_before_current() {
        let result = base_builder().current_age(70).retirement_age(65).build();
        assert!(matches!(
            result,
            Err(ParameterError::RetirementBeforeCurrent { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overweight_allocation() {
        let result = base_builder()
            .stock_allocation(0.8)
            .bond_allocation(0.4)
            .build();
        assert!(matches!(
            result,
            Err(ParameterError::InvalidAllocation { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_age() {
        let result = base_builder().current_age(10).build();
        assert!(matches!(
            result,
            Err(ParameterError::AgeOutOfRange {
                name: "current_age",
                ..
            })
        ));
    }

    #[test]
    fn test_guaranteed_income_sums_sources() {
        let params = base_builder().annual_pension(12_000.0).build().unwrap();
        assert_eq!(params.guaranteed_annual_income(), 42_000.0);
    }

    #[test]
    fn test_cash_allocation_derived() {
        let params = base_builder()
            .stock_allocation(0.5)
            .bond_allocation(0.3)
            .build()
            .unwrap();
        assert!((params.cash_allocation() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_accumulation_years_zero_when_retired() {
        let params = base_builder().build().unwrap();
        assert_eq!(params.accumulation_years(), 0);
    }
}
