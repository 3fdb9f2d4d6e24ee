//! Config command handler.

use classcast_core::RelaySettings;

use crate::error::CliError;

/// Print the effective settings as JSON.
pub fn execute(settings: &RelaySettings) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
