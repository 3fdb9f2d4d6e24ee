//! Rule-based network quality scoring.
//!
//! The score is a sum of four capped components:
//!
//! | Component | Points | Formula |
//! |---|---|---|
//! | Latency | 0–25 | `25 − latency_ms / 20` |
//! | Bandwidth | 0–35 | `bandwidth_kbps / 10` |
//! | Packet loss | 0–25 | `25 − loss_percent × 2` |
//! | Jitter | 0–15 | `15 − jitter_ms / 5` |
//!
//! and is clamped to 0–100 before being mapped onto a profile.

use serde::{Deserialize, Serialize};

use super::QualityError;
use crate::profiles::{AdaptiveProfile, ProfileName};

/// Network conditions reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub latency_ms: f64,
    pub bandwidth_kbps: f64,
    #[serde(default)]
    pub packet_loss_percent: f64,
    #[serde(default)]
    pub jitter_ms: f64,
}

impl NetworkMetrics {
    pub const fn new(
        latency_ms: f64,
        bandwidth_kbps: f64,
        packet_loss_percent: f64,
        jitter_ms: f64,
    ) -> Self {
        Self {
            latency_ms,
            bandwidth_kbps,
            packet_loss_percent,
            jitter_ms,
        }
    }

    /// Reject negative, NaN and infinite readings.
    pub fn validate(&self) -> Result<(), QualityError> {
        let fields = [
            ("latencyMs", self.latency_ms),
            ("bandwidthKbps", self.bandwidth_kbps),
            ("packetLossPercent", self.packet_loss_percent),
            ("jitterMs", self.jitter_ms),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(QualityError::InvalidMetric { field, value });
            }
        }
        if self.packet_loss_percent > 100.0 {
            return Err(QualityError::InvalidMetric {
                field: "packetLossPercent",
                value: self.packet_loss_percent,
            });
        }
        Ok(())
    }

    /// Compute the 0–100 quality score.
    pub fn score(&self) -> QualityScore {
        let latency = (25.0 - self.latency_ms / 20.0).max(0.0);
        let bandwidth = (self.bandwidth_kbps / 10.0).min(35.0);
        let loss = self.packet_loss_percent.mul_add(-2.0, 25.0).max(0.0);
        let jitter = (15.0 - self.jitter_ms / 5.0).max(0.0);
        QualityScore((latency + bandwidth + loss + jitter).clamp(0.0, 100.0))
    }
}

/// A network quality score in the range 0–100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct QualityScore(f64);

impl QualityScore {
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Map the score onto the profile table.
    pub fn recommended_profile(self) -> ProfileName {
        match self.0 {
            s if s >= 90.0 => ProfileName::Excellent,
            s if s >= 75.0 => ProfileName::Good,
            s if s >= 60.0 => ProfileName::Fair,
            s if s >= 40.0 => ProfileName::Poor,
            s if s >= 20.0 => ProfileName::Critical,
            _ => ProfileName::Emergency,
        }
    }
}

/// A one-off recommendation, without history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub metrics: NetworkMetrics,
    pub score: QualityScore,
    pub recommended: ProfileName,
    pub profile: &'static AdaptiveProfile,
}

/// Score metrics and pick a profile for them.
pub fn recommend(metrics: NetworkMetrics) -> Result<Recommendation, QualityError> {
    metrics.validate()?;
    let score = metrics.score();
    let recommended = score.recommended_profile();
    Ok(Recommendation {
        metrics,
        score,
        recommended,
        profile: recommended.profile(),
    })
}

/// Direction of recent latency samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Degrading,
}

/// Classify the last three latency samples.
///
/// Strictly falling latency is `Improving`, strictly rising is `Degrading`,
/// anything else (including fewer than three samples) is `Stable`.
pub fn analyze_trend(latencies: &[f64]) -> Trend {
    if latencies.len() < 3 {
        return Trend::Stable;
    }
    let recent = &latencies[latencies.len() - 3..];
    if recent.windows(2).all(|w| w[1] < w[0]) {
        Trend::Improving
    } else if recent.windows(2).all(|w| w[1] > w[0]) {
        Trend::Degrading
    } else {
        Trend::Stable
    }
}

/// Move a profile one step in the direction of the trend.
pub const fn adjust_for_trend(current: ProfileName, trend: Trend) -> ProfileName {
    match trend {
        Trend::Improving => current.step_up(),
        Trend::Degrading => current.step_down(),
        Trend::Stable => current,
    }
}
