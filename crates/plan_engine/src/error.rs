//! Engine-level errors.
//!
//! Only pre-flight validation can fail a batch; runtime conditions (solver
//! non-convergence, year caps, numeric clamping) are represented as data so
//! aggregate statistics remain well-defined across exactly N realizations.

use plan_core::types::ParameterError;
use thiserror::Error;

/// Errors surfaced before any realization runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Invalid simulation parameters.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Iteration count outside the supported range.
    #[error("Invalid iteration count {count}: must be in range [1, {max}]")]
    InvalidIterations {
        /// Requested iteration count.
        count: u32,
        /// Maximum supported count.
        max: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_passthrough() {
        let inner = ParameterError::Missing { name: "buckets" };
        let err: EngineError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn test_invalid_iterations_display() {
        let err = EngineError::InvalidIterations {
            count: 0,
            max: 1_000_000,
        };
        assert!(err.to_string().contains("Invalid iteration count 0"));
    }
}
