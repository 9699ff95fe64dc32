//! # plan_core: Foundation Types for the Lifepath Retirement Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! plan_core serves as the bottom layer of the 3-layer architecture, providing:
//! - Simulation parameters with builder and validation (`types::params`)
//! - The immutable asset-bucket value type (`types::buckets`)
//! - Per-year cash-flow records and realization outcomes (`types::records`)
//! - Aggregate result statistics (`types::records`)
//! - Market-regime tags shared across layers (`types::regime`)
//! - Error types: `ParameterError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other plan_* crates, with minimal external
//! dependencies:
//! - thiserror: Structured error types
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use plan_core::types::{AssetBuckets, SimulationParameters};
//!
//! let buckets = AssetBuckets::new(800_000.0, 200_000.0, 400_000.0, 100_000.0);
//! assert_eq!(buckets.total(), 1_500_000.0);
//!
//! let params = SimulationParameters::builder()
//!     .current_age(65)
//!     .retirement_age(65)
//!     .life_expectancy(88)
//!     .buckets(buckets)
//!     .annual_living_expenses(60_000.0)
//!     .annual_social_security(30_000.0)
//!     .build()
//!     .expect("valid parameters");
//! assert_eq!(params.current_age, 65);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for parameters and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod types;

pub use types::{
    AggregateResult, AssetBuckets, BucketDraw, BucketKind, FilingStatus, HealthStatus,
    MarketRegime, ParameterError, PercentileBalances, ScenarioOutcome, Sex,
    SimulationParameters, SimulationParametersBuilder, SpouseParameters, TerminalState,
    YearlyCashFlow,
};
