//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod safe_rate;
pub mod simulate;
pub mod template;
