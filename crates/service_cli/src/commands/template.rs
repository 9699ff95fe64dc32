//! Template command implementation
//!
//! Emits a starter plan file to edit.

use tracing::info;

use crate::config::PLAN_TEMPLATE;
use crate::Result;

/// Run the template command.
pub fn run(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, PLAN_TEMPLATE)?;
            info!("Template written to {}", path);
        }
        None => print!("{PLAN_TEMPLATE}"),
    }
    Ok(())
}
