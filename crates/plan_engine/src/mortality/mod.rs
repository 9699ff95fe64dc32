//! Mortality and longevity modelling.
//!
//! [`MortalityModel`] holds annual death probabilities (`qx`) by integer age
//! and sex, generated once from a Gompertz–Makeham fit and scaled at query
//! time by the health-status multiplier. [`stochastic`] draws one terminal
//! age per realization from a three-tier distribution around a baseline.

pub mod stochastic;

use crate::rng::RandomSource;
use plan_core::types::{HealthStatus, Sex};

/// Lowest age carried by the qx table.
pub const MIN_TABLE_AGE: u32 = 50;

/// Highest age carried by the qx table.
pub const MAX_TABLE_AGE: u32 = 120;

/// Gompertz–Makeham coefficients: `qx = A + B * C^age`, capped at 1.
struct MakehamFit {
    a: f64,
    b: f64,
    c: f64,
}

const MALE_FIT: MakehamFit = MakehamFit {
    a: 8.0e-4,
    b: 6.0e-5,
    c: 1.090,
};

const FEMALE_FIT: MakehamFit = MakehamFit {
    a: 5.0e-4,
    b: 3.9e-5,
    c: 1.092,
};

impl MakehamFit {
    fn qx(&self, age: u32) -> f64 {
        (self.a + self.b * self.c.powi(age as i32)).min(1.0)
    }
}

/// Age/sex/health-adjusted annual mortality lookup.
///
/// Construction fills the per-sex tables once; every query is then a table
/// read plus a multiplier. The model is immutable and `Sync`, so one
/// instance is shared read-only across all parallel realizations.
///
/// # Examples
///
/// ```rust
/// use plan_core::types::{HealthStatus, Sex};
/// use plan_engine::mortality::MortalityModel;
///
/// let model = MortalityModel::new();
/// let q65 = model.annual_mortality_rate(65, Sex::Male, HealthStatus::Good);
/// let q85 = model.annual_mortality_rate(85, Sex::Male, HealthStatus::Good);
/// assert!(q65 < q85);
/// ```
pub struct MortalityModel {
    male_qx: Vec<f64>,
    female_qx: Vec<f64>,
}

impl Default for MortalityModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MortalityModel {
    /// Builds the qx tables for ages [`MIN_TABLE_AGE`]..=[`MAX_TABLE_AGE`].
    pub fn new() -> Self {
        let ages = MIN_TABLE_AGE..=MAX_TABLE_AGE;
        Self {
            male_qx: ages.clone().map(|age| MALE_FIT.qx(age)).collect(),
            female_qx: ages.map(|age| FEMALE_FIT.qx(age)).collect(),
        }
    }

    /// Raw table probability with the age clamped into the table range.
    fn table_qx(&self, age: u32, sex: Sex) -> f64 {
        let age = age.clamp(MIN_TABLE_AGE, MAX_TABLE_AGE);
        let idx = (age - MIN_TABLE_AGE) as usize;
        match sex {
            Sex::Male => self.male_qx[idx],
            Sex::Female => self.female_qx[idx],
        }
    }

    /// Annual death probability for one person-year, health-scaled and
    /// capped at 1.
    pub fn annual_mortality_rate(&self, age: u32, sex: Sex, health: HealthStatus) -> f64 {
        (self.table_qx(age, sex) * health.mortality_multiplier()).min(1.0)
    }

    /// Probability of surviving from `from_age` to `to_age` — the product of
    /// `(1 - qx)` over the interval. Returns 1 when `to_age <= from_age`.
    pub fn survival_probability(
        &self,
        from_age: u32,
        to_age: u32,
        sex: Sex,
        health: HealthStatus,
    ) -> f64 {
        (from_age..to_age)
            .map(|age| 1.0 - self.annual_mortality_rate(age, sex, health))
            .product()
    }

    /// Simulates one year of survival: true when the person lives.
    pub fn simulate_survival(
        &self,
        age: u32,
        sex: Sex,
        health: HealthStatus,
        rng: &mut impl RandomSource,
    ) -> bool {
        rng.next_uniform() >= self.annual_mortality_rate(age, sex, health)
    }

    /// Expected remaining-lifetime age: current age plus the sum of yearly
    /// survival probabilities, with the standard half-year correction.
    pub fn life_expectancy(&self, age: u32, sex: Sex, health: HealthStatus) -> f64 {
        let remaining: f64 = (1..=(MAX_TABLE_AGE.saturating_sub(age)))
            .map(|t| self.survival_probability(age, age + t, sex, health))
            .sum();
        f64::from(age) + remaining + 0.5
    }

    /// Smallest age at which survival probability from `age` drops to
    /// `p / 100`. `p = 50` is median remaining lifetime; `p = 10` is the
    /// longevity tail.
    pub fn percentile_life_expectancy(
        &self,
        age: u32,
        sex: Sex,
        health: HealthStatus,
        p: f64,
    ) -> u32 {
        let threshold = (p / 100.0).clamp(0.0, 1.0);
        let mut survival = 1.0;
        for candidate in (age + 1)..=MAX_TABLE_AGE {
            survival *= 1.0 - self.annual_mortality_rate(candidate - 1, sex, health);
            if survival <= threshold {
                return candidate;
            }
        }
        MAX_TABLE_AGE
    }
}
