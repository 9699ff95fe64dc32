//! Parameter validation errors.
//!
//! These are the only errors surfaced to callers before simulation begins;
//! everything downstream (solver non-convergence, year caps, clamping) is
//! represented as data, never as an error.

use thiserror::Error;

/// Invalid simulation input.
///
/// Rejected during
/// [`SimulationParameters::validate`](crate::types::SimulationParameters::validate)
/// before any realization runs; a single invalid field fails the whole call.
///
/// # Examples
///
/// ```
/// use plan_core::types::ParameterError;
///
/// let err = ParameterError::NotFinite { name: "annual_living_expenses" };
/// assert!(err.to_string().contains("annual_living_expenses"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A monetary amount or rate was NaN or infinite.
    #[error("Parameter '{name}' must be finite")]
    NotFinite {
        /// Field name.
        name: &'static str,
    },

    /// A balance, income, or expense was negative.
    #[error("Parameter '{name}' must be non-negative, got {value}")]
    Negative {
        /// Field name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// An age fell outside the supported range.
    #[error("Age '{name}' = {age} outside supported range [{min}, {max}]")]
    AgeOutOfRange {
        /// Field name.
        name: &'static str,
        /// The offending age.
        age: u32,
        /// Minimum supported age.
        min: u32,
        /// Maximum supported age.
        max: u32,
    },

    /// Retirement age precedes current age by construction.
    #[error("Retirement age {retirement_age} must not precede current age {current_age}")]
    RetirementBeforeCurrent {
        /// Current age supplied.
        current_age: u32,
        /// Retirement age supplied.
        retirement_age: u32,
    },

    /// Allocation weights must each lie in [0, 1] and sum to at most 1.
    #[error("Allocation weights invalid: stocks {stocks}, bonds {bonds}")]
    InvalidAllocation {
        /// Stock weight supplied.
        stocks: f64,
        /// Bond weight supplied.
        bonds: f64,
    },

    /// A required builder field was never set.
    #[error("Parameter '{name}' must be specified")]
    Missing {
        /// Field name.
        name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_field_name() {
        let err = ParameterError::Negative {
            name: "legacy_goal",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'legacy_goal' must be non-negative, got -1"
        );
    }

    #[test]
    fn test_age_out_of_range_display() {
        let err = ParameterError::AgeOutOfRange {
            name: "current_age",
            age: 150,
            min: 18,
            max: 100,
        };
        assert!(err.to_string().contains("150"));
        assert!(err.to_string().contains("[18, 100]"));
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ParameterError::Missing { name: "buckets" };
        let _: &dyn std::error::Error = &err;
    }
}
