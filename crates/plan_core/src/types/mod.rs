//! Shared value types for the retirement simulation engine.
//!
//! Everything here is plain data: no randomness, no I/O, no simulation
//! logic. The engine layer consumes these types and never mutates them in
//! place; yearly steps produce new values.

mod buckets;
mod error;
mod params;
mod records;
mod regime;

pub use buckets::{AssetBuckets, BucketDraw, BucketKind};
pub use error::ParameterError;
pub use params::{
    FilingStatus, HealthStatus, Sex, SimulationParameters, SimulationParametersBuilder,
    SpouseParameters,
};
pub use records::{
    AggregateResult, PercentileBalances, ScenarioOutcome, TerminalState, YearlyCashFlow,
};
pub use regime::MarketRegime;
