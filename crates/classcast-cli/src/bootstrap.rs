//! Settings resolution for CLI commands.

use std::path::Path;

use classcast_core::{RelaySettings, SettingsOverrides, validate_settings};
use tracing::debug;

use crate::error::CliError;

/// Read the settings file (if any), apply overrides and validate.
pub fn load_settings(
    config: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<RelaySettings, CliError> {
    let mut settings = match config {
        Some(path) => {
            debug!(path = %path.display(), "Loading settings file");
            RelaySettings::from_json_file(path)?
        }
        None => RelaySettings::default(),
    };
    settings.merge(overrides);
    validate_settings(&settings)?;
    Ok(settings)
}
