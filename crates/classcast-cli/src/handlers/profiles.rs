//! Profiles command handler.

use classcast_core::ADAPTIVE_PROFILES;

use crate::error::CliError;
use crate::presentation::{
    PROFILE_TABLE_WIDTH, format_profile_header, format_profile_row, print_separator,
};

/// Print the adaptive profile table, lowest quality first.
pub fn execute(json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(ADAPTIVE_PROFILES.as_slice())?);
        return Ok(());
    }

    println!("{}", format_profile_header());
    print_separator(PROFILE_TABLE_WIDTH);
    for profile in &ADAPTIVE_PROFILES {
        println!("{}", format_profile_row(profile));
    }
    Ok(())
}
