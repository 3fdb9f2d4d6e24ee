//! Recommend command handler.

use classcast_core::{NetworkMetrics, Recommendation, recommend};

use crate::error::CliError;
use crate::presentation::{format_profile_header, format_profile_row};

/// Score metrics and print the recommended profile.
pub fn execute(metrics: NetworkMetrics, json: bool) -> Result<Recommendation, CliError> {
    let recommendation = recommend(metrics)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("Score:       {:.1} / 100", recommendation.score.value());
        println!("Recommended: {}", recommendation.recommended);
        println!();
        println!("{}", format_profile_header());
        println!("{}", format_profile_row(recommendation.profile));
    }
    Ok(recommendation)
}
