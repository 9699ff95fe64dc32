//! # Random Number Generation Infrastructure
//!
//! Seeded, reproducible randomness for the simulation kernel.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: identical seed ⇒ bit-identical output sequence
//!   across runs and platforms. Normal variates use an explicit Box–Muller
//!   transform over the uniform stream, so no platform- or OS-derived
//!   entropy enters the kernel anywhere.
//! - **Independent sub-streams**: [`PlanRng::derive`] hashes a stable label
//!   and salt into a child seed, giving every sub-model (mortality, regimes,
//!   life expectancy, each realization) an independent-but-reproducible
//!   stream. This derivation is the regression-pinning mechanism; its
//!   arithmetic is frozen.
//! - **Variance reduction**: [`RecordingRng`] captures every typed draw into
//!   per-type tapes; [`ReplayRng`] re-emits a tape verbatim or mirrored
//!   (`1-u`, `-z`) for antithetic pairs.
//!
//! ## Module Structure
//!
//! - [`stream`]: [`PlanRng`] and the [`RandomSource`] trait
//! - [`tape`]: recording, replay, and antithetic mirroring
//!
//! ## Usage Example
//!
//! ```rust
//! use plan_engine::rng::{PlanRng, RandomSource};
//!
//! let mut rng = PlanRng::from_seed(12345);
//! let u = rng.next_uniform();
//! assert!((0.0..1.0).contains(&u));
//!
//! // Child streams are independent of parent consumption.
//! let mut mortality = rng.derive("mortality", 0);
//! let mut regimes = rng.derive("market-regime", 0);
//! assert_ne!(mortality.next_uniform(), regimes.next_uniform());
//! ```

mod stream;
mod tape;

pub use stream::{PlanRng, RandomSource};
pub use tape::{DrawTapes, Mirror, RecordingRng, ReplayRng};
