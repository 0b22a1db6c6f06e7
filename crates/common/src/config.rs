//! Bot configuration types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Kalshi trade API base URL (public, unauthenticated endpoints).
    #[serde(default = "default_kalshi_base_url")]
    pub kalshi_base_url: String,

    /// Kalshi series ticker for the Fed decision event family.
    #[serde(default = "default_series_ticker")]
    pub series_ticker: String,

    /// Meeting/contract overrides (all optional; auto-resolved from the
    /// FOMC calendar when absent).
    #[serde(default)]
    pub meeting: MeetingConfig,

    /// Model parameters.
    #[serde(default)]
    pub model: ModelConfig,

    /// Timing parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Manual meeting/contract selection. Left empty, the bot resolves the
/// next meeting from the official calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingConfig {
    /// The date the decision is announced.
    #[serde(default)]
    pub decision_date: Option<NaiveDate>,

    /// First date the post-decision rate is presumed effective.
    /// Defaults to the day after the decision date.
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,

    /// Futures contract year representing the meeting month.
    #[serde(default)]
    pub futures_year: Option<i32>,

    /// Futures contract month (1-12) representing the meeting month.
    #[serde(default)]
    pub futures_month: Option<u32>,
}

/// Model thresholds and anchors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Canonical rate-move increment (25bp = 0.25).
    #[serde(default = "default_rate_step")]
    pub rate_step: f64,

    /// Minimum absolute probability divergence to flag an edge.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,

    /// Pre-decision anchor rate override. When absent, the prior-month
    /// contract's implied average rate is used.
    #[serde(default)]
    pub pre_rate_mid: Option<f64>,
}

/// Timing configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Evaluation interval.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_kalshi_base_url() -> String {
    "https://api.elections.kalshi.com/trade-api/v2".into()
}

fn default_series_ticker() -> String {
    "KXFEDDECISION".into()
}

fn default_rate_step() -> f64 {
    0.25
}

fn default_edge_threshold() -> f64 {
    0.03
}

fn default_poll_interval() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    20
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rate_step: default_rate_step(),
            edge_threshold: default_edge_threshold(),
            pre_rate_mid: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            kalshi_base_url: default_kalshi_base_url(),
            series_ticker: default_series_ticker(),
            meeting: MeetingConfig::default(),
            model: ModelConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}
