//! Per-user quality history and profile adaptation.
//!
//! The first reports from a user follow the score directly. Once enough
//! samples exist, the latency trend governs: rising or falling latency moves
//! the user's current profile one step, and a stable trend keeps it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::QualityError;
use super::score::{NetworkMetrics, QualityScore, Trend, adjust_for_trend, analyze_trend};
use crate::domain::UserId;
use crate::profiles::ProfileName;

/// Default number of samples kept per user.
pub const DEFAULT_HISTORY: usize = 10;

/// Samples required before trend adjustment kicks in.
pub const TREND_MIN_SAMPLES: usize = 5;

/// Result of recording one network report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    pub user_id: UserId,
    pub score: QualityScore,
    /// Profile the score alone maps to.
    pub recommended: ProfileName,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ProfileName>,
    /// Profile the user should use from now on.
    pub profile: ProfileName,
    pub samples: usize,
    pub assessed_at: DateTime<Utc>,
}

impl QualityAssessment {
    /// Whether the effective profile differs from before this report.
    pub fn changed(&self) -> bool {
        self.previous != Some(self.profile)
    }
}

/// Read-only view of a tracked user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuality {
    pub user_id: UserId,
    pub profile: ProfileName,
    pub trend: Trend,
    pub samples: usize,
    pub last_metrics: NetworkMetrics,
    pub last_score: QualityScore,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct UserHistory {
    samples: VecDeque<NetworkMetrics>,
    current: ProfileName,
    updated_at: DateTime<Utc>,
}

impl UserHistory {
    fn latencies(&self) -> Vec<f64> {
        self.samples.iter().map(|m| m.latency_ms).collect()
    }
}

/// Tracks recent reports per user.
///
/// Not synchronised; owners wrap it in a lock.
#[derive(Debug)]
pub struct QualityTracker {
    window: usize,
    users: HashMap<UserId, UserHistory>,
}

impl Default for QualityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

impl QualityTracker {
    /// Create a tracker keeping `window` samples per user (at least
    /// [`TREND_MIN_SAMPLES`]).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(TREND_MIN_SAMPLES),
            users: HashMap::new(),
        }
    }

    pub const fn window(&self) -> usize {
        self.window
    }

    /// Record a report and return the resulting assessment.
    pub fn record(
        &mut self,
        user_id: UserId,
        metrics: NetworkMetrics,
    ) -> Result<QualityAssessment, QualityError> {
        metrics.validate()?;

        let score = metrics.score();
        let recommended = score.recommended_profile();
        let now = Utc::now();

        let previous = self.users.get(&user_id).map(|h| h.current);
        let window = self.window;
        let history = self.users.entry(user_id).or_insert_with(|| UserHistory {
            samples: VecDeque::with_capacity(window),
            current: recommended,
            updated_at: now,
        });

        if history.samples.len() == window {
            history.samples.pop_front();
        }
        history.samples.push_back(metrics);
        history.updated_at = now;

        let samples = history.samples.len();
        let trend = if samples >= TREND_MIN_SAMPLES {
            analyze_trend(&history.latencies())
        } else {
            Trend::Stable
        };

        let profile = match previous {
            Some(current) if samples >= TREND_MIN_SAMPLES => adjust_for_trend(current, trend),
            _ => recommended,
        };
        history.current = profile;

        if previous.is_some_and(|p| p != profile) {
            tracing::info!(
                user_id = %user_id,
                from = %previous.unwrap_or_default(),
                to = %profile,
                trend = ?trend,
                "Adaptive profile changed"
            );
        }

        Ok(QualityAssessment {
            user_id,
            score,
            recommended,
            trend,
            previous,
            profile,
            samples,
            assessed_at: now,
        })
    }

    /// Current profile for a user, if any report was recorded.
    pub fn current_profile(&self, user_id: UserId) -> Option<ProfileName> {
        self.users.get(&user_id).map(|h| h.current)
    }

    pub fn snapshot(&self, user_id: UserId) -> Option<UserQuality> {
        let history = self.users.get(&user_id)?;
        let last_metrics = *history.samples.back()?;
        Some(UserQuality {
            user_id,
            profile: history.current,
            trend: analyze_trend(&history.latencies()),
            samples: history.samples.len(),
            last_metrics,
            last_score: last_metrics.score(),
            updated_at: history.updated_at,
        })
    }

    /// Drop a user's history. Returns whether anything was tracked.
    pub fn forget(&mut self, user_id: UserId) -> bool {
        self.users.remove(&user_id).is_some()
    }

    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }
}
