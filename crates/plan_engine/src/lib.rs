//! # plan_engine: Retirement Monte Carlo Simulation Kernel
//!
//! ## Layer 2 (Kernel) Role
//!
//! plan_engine is the computational core of the workspace. It walks thousands
//! of stochastic year-by-year realizations of a household's retirement plan,
//! applying market-regime returns, inflation, mortality, guaranteed income,
//! and a U.S. tax model, then aggregates them into success probabilities and
//! risk statistics.
//!
//! ## Module Structure
//!
//! - [`rng`]: Seeded PRNG with labelled child-stream derivation, recording,
//!   replay, and antithetic mirroring
//! - [`mortality`]: Annual death probabilities, survival simulation, and
//!   stochastic terminal-age generation
//! - [`tax`]: Social Security taxation, IRMAA surcharges, RMDs, and the
//!   combined federal/state rate model
//! - [`regime`]: 4-state Markov regime-switching return model
//! - [`solver`]: Iterative gross-for-net withdrawal solver with tagged
//!   convergence
//! - [`scenario`]: One realization's accumulation/distribution walk
//! - [`aggregate`]: Batch orchestration, percentile statistics, and the
//!   safe-withdrawal-rate search
//!
//! ## Determinism Contract
//!
//! Every stochastic sub-model draws from a child stream derived from a stable
//! label and salt, never from shared generator state. Running the same
//! `(parameters, iterations, seed)` triple on any number of threads produces
//! a bit-identical [`AggregateResult`](plan_core::types::AggregateResult).
//!
//! ## Usage Example
//!
//! ```rust
//! use plan_core::types::{AssetBuckets, SimulationParameters};
//! use plan_engine::run_monte_carlo;
//!
//! let params = SimulationParameters::builder()
//!     .current_age(65)
//!     .retirement_age(65)
//!     .life_expectancy(88)
//!     .buckets(AssetBuckets::new(800_000.0, 200_000.0, 400_000.0, 100_000.0))
//!     .annual_living_expenses(60_000.0)
//!     .annual_social_security(30_000.0)
//!     .build()
//!     .unwrap();
//!
//! let result = run_monte_carlo(&params, 500, 12345).unwrap();
//! assert!(result.percentiles.is_ordered());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregate;
mod error;
pub mod mortality;
pub mod regime;
pub mod rng;
pub mod scenario;
pub mod solver;
pub mod tax;

pub use aggregate::{run_monte_carlo, MonteCarloBatch};
pub use error::EngineError;
pub use rng::PlanRng;
