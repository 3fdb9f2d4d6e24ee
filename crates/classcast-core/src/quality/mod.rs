//! Network quality assessment.
//!
//! Scores client-reported metrics, maps scores onto adaptive profiles and
//! follows per-user latency trends.

mod score;
mod tracker;

use thiserror::Error;

pub use score::{
    NetworkMetrics, QualityScore, Recommendation, Trend, adjust_for_trend, analyze_trend, recommend,
};
pub use tracker::{
    DEFAULT_HISTORY, QualityAssessment, QualityTracker, TREND_MIN_SAMPLES, UserQuality,
};

/// Quality assessment error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QualityError {
    #[error("Invalid metric {field}: {value}")]
    InvalidMetric { field: &'static str, value: f64 },
}
