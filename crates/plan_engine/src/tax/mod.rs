//! U.S. tax model: pure functions over 2024 constants.
//!
//! Everything in this module is deterministic and side-effect free; the
//! withdrawal solver and the scenario walk call into it every simulated
//! year.
//!
//! - [`social_security`]: provisional-income taxation of benefits
//! - [`irmaa`]: Medicare premium surcharge brackets
//! - [`rmd`]: Required Minimum Distribution divisors
//! - [`rates`]: combined federal/state marginal and effective rates

pub mod irmaa;
pub mod rates;
pub mod rmd;
pub mod social_security;

pub use irmaa::annual_irmaa_surcharge;
pub use rates::{combined_tax, TaxAssessment};
pub use rmd::required_minimum_distribution;
pub use social_security::taxable_social_security;
