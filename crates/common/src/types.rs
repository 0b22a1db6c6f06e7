//! Domain types shared across the bot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Outcome Types ─────────────────────────────────────────────────────

/// One of the three canonical decision outcomes the comparison runs over.
///
/// Ordered for display: CUT25 < HOLD < HIKE25.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKey {
    Cut25,
    Hold,
    Hike25,
}

impl OutcomeKey {
    /// All outcomes in display order.
    pub const ALL: [OutcomeKey; 3] = [OutcomeKey::Cut25, OutcomeKey::Hold, OutcomeKey::Hike25];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKey::Cut25 => "CUT25",
            OutcomeKey::Hold => "HOLD",
            OutcomeKey::Hike25 => "HIKE25",
        }
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a rate move, before magnitude is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateAction {
    Cut,
    Hold,
    Hike,
}

/// A classified market title: action plus magnitude in basis points.
///
/// The classifier recognizes 25/50/75/100bp moves; only the ±25bp and
/// hold outcomes fold into an [`OutcomeKey`] bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub action: RateAction,
    pub bps: u32,
}

impl DecisionOutcome {
    pub fn new(action: RateAction, bps: u32) -> Self {
        Self { action, bps }
    }

    /// Fold onto the three-outcome comparison ladder.
    ///
    /// Returns `None` for off-ladder magnitudes (e.g. a 50bp cut).
    pub fn bucket(&self) -> Option<OutcomeKey> {
        match (self.action, self.bps) {
            (RateAction::Hold, _) => Some(OutcomeKey::Hold),
            (RateAction::Cut, 25) => Some(OutcomeKey::Cut25),
            (RateAction::Hike, 25) => Some(OutcomeKey::Hike25),
            _ => None,
        }
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            RateAction::Hold => write!(f, "HOLD"),
            RateAction::Cut => write!(f, "CUT{}", self.bps),
            RateAction::Hike => write!(f, "HIKE{}", self.bps),
        }
    }
}

// ── Kalshi Market Types ───────────────────────────────────────────────

/// One prediction-market contract nested in a Kalshi event payload.
///
/// Prices are cents-on-the-dollar in [0, 100]; absent fields stay
/// absent rather than defaulting to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KalshiMarket {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub yes_bid: Option<i64>,
    #[serde(default)]
    pub yes_ask: Option<i64>,
    #[serde(default)]
    pub last_price: Option<i64>,
    #[serde(default)]
    pub status: String,
}

impl KalshiMarket {
    /// Implied probability from the bid/ask midpoint, with last trade
    /// as fallback.
    ///
    /// `None` means "no quote", which is distinct from probability 0.
    pub fn mid_prob(&self) -> Option<f64> {
        if let (Some(bid), Some(ask)) = (self.yes_bid, self.yes_ask) {
            if bid >= 0 && ask >= 0 {
                return Some((bid + ask) as f64 / 2.0 / 100.0);
            }
        }
        match self.last_price {
            Some(last) if last >= 0 => Some(last as f64 / 100.0),
            _ => None,
        }
    }
}

/// A Kalshi event: one decision-date grouping of markets.
///
/// Date/time fields vary across event schemas, so every candidate is
/// optional; the selector tries them in a fixed priority order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub event_ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub strike_date: Option<String>,
    #[serde(default)]
    pub strike_time: Option<String>,
    #[serde(default)]
    pub strike_datetime: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub close_date: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub markets: Vec<KalshiMarket>,
}

impl EventRecord {
    /// Candidate date fields in selection priority order.
    pub fn date_fields(&self) -> [(&'static str, Option<&str>); 10] {
        [
            ("strike_date", self.strike_date.as_deref()),
            ("strike_time", self.strike_time.as_deref()),
            ("strike_datetime", self.strike_datetime.as_deref()),
            ("close_time", self.close_time.as_deref()),
            ("close_date", self.close_date.as_deref()),
            ("settlement_time", self.settlement_time.as_deref()),
            ("end_date", self.end_date.as_deref()),
            ("end_time", self.end_time.as_deref()),
            ("start_date", self.start_date.as_deref()),
            ("start_time", self.start_time.as_deref()),
        ]
    }
}

// ── Futures Types ─────────────────────────────────────────────────────

/// A settlement-price observation for one fed funds contract month.
///
/// Retrieval failures land in `error`; `last_close == None` means the
/// price is unavailable and every derived rate stays unavailable too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesObservation {
    /// The symbol that was requested.
    pub symbol: String,
    /// Last non-null settlement close, if any candidate produced one.
    pub last_close: Option<f64>,
    /// The candidate symbol that actually returned data.
    pub used_symbol: Option<String>,
    /// Candidate symbols tried, in order.
    pub attempted: Vec<String>,
    /// Accumulated per-candidate error text, if all failed.
    pub error: Option<String>,
}

impl FuturesObservation {
    /// Implied average overnight rate for the contract month.
    pub fn implied_month_avg_rate(&self) -> Option<f64> {
        self.last_close.map(|close| 100.0 - close)
    }
}

// ── Distribution Types ────────────────────────────────────────────────

/// A probability per outcome, in [0, 1].
///
/// Not required to sum to 1: the market-derived instance is built from
/// independent per-contract quotes. Keys can be absent; comparisons
/// treat absent as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpliedDistribution {
    probs: BTreeMap<OutcomeKey, f64>,
}

impl ImpliedDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: OutcomeKey, prob: f64) {
        self.probs.insert(key, prob);
    }

    /// The probability for a key, if one was recorded.
    pub fn get(&self, key: OutcomeKey) -> Option<f64> {
        self.probs.get(&key).copied()
    }

    /// The probability for a key, with absent treated as 0.
    pub fn prob_or_zero(&self, key: OutcomeKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeKey, f64)> + '_ {
        self.probs.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }
}

impl FromIterator<(OutcomeKey, f64)> for ImpliedDistribution {
    fn from_iter<I: IntoIterator<Item = (OutcomeKey, f64)>>(iter: I) -> Self {
        Self {
            probs: iter.into_iter().collect(),
        }
    }
}

// ── Edge Types ────────────────────────────────────────────────────────

/// Which way the market side is mispriced relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Reference probability exceeds the market's — market looks cheap.
    Cheap,
    /// Reference probability is below the market's — market looks rich.
    Rich,
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeDirection::Cheap => f.write_str("looks cheap"),
            EdgeDirection::Rich => f.write_str("looks rich"),
        }
    }
}

/// A thresholded divergence on one outcome. Produced fresh per cycle,
/// never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSignal {
    pub outcome: OutcomeKey,
    pub direction: EdgeDirection,
    /// Signed edge: reference minus market probability.
    pub edge: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_ordering() {
        let mut keys = vec![OutcomeKey::Hike25, OutcomeKey::Cut25, OutcomeKey::Hold];
        keys.sort();
        assert_eq!(
            keys,
            vec![OutcomeKey::Cut25, OutcomeKey::Hold, OutcomeKey::Hike25]
        );
    }

    #[test]
    fn test_bucket_folding() {
        assert_eq!(
            DecisionOutcome::new(RateAction::Cut, 25).bucket(),
            Some(OutcomeKey::Cut25)
        );
        assert_eq!(
            DecisionOutcome::new(RateAction::Hold, 0).bucket(),
            Some(OutcomeKey::Hold)
        );
        assert_eq!(
            DecisionOutcome::new(RateAction::Hike, 25).bucket(),
            Some(OutcomeKey::Hike25)
        );
        // Off-ladder magnitudes don't fold.
        assert_eq!(DecisionOutcome::new(RateAction::Cut, 50).bucket(), None);
        assert_eq!(DecisionOutcome::new(RateAction::Hike, 100).bucket(), None);
    }

    #[test]
    fn test_mid_prob_prefers_bid_ask() {
        let m = KalshiMarket {
            ticker: "T".into(),
            title: String::new(),
            yes_bid: Some(40),
            yes_ask: Some(50),
            last_price: Some(99),
            status: "open".into(),
        };
        assert_eq!(m.mid_prob(), Some(0.45));
    }

    #[test]
    fn test_mid_prob_falls_back_to_last_price() {
        let m = KalshiMarket {
            ticker: "T".into(),
            title: String::new(),
            yes_bid: None,
            yes_ask: Some(50),
            last_price: Some(30),
            status: "open".into(),
        };
        assert_eq!(m.mid_prob(), Some(0.30));
    }

    #[test]
    fn test_mid_prob_absent_is_none_not_zero() {
        let m = KalshiMarket {
            ticker: "T".into(),
            title: String::new(),
            yes_bid: None,
            yes_ask: None,
            last_price: None,
            status: "open".into(),
        };
        assert_eq!(m.mid_prob(), None);
    }

    #[test]
    fn test_mid_prob_rejects_negative_quotes() {
        let m = KalshiMarket {
            ticker: "T".into(),
            title: String::new(),
            yes_bid: Some(-1),
            yes_ask: Some(50),
            last_price: Some(-1),
            status: "open".into(),
        };
        assert_eq!(m.mid_prob(), None);
    }

    #[test]
    fn test_implied_avg_rate_propagates_absence() {
        let obs = FuturesObservation {
            symbol: "ZQF25.CBT".into(),
            last_close: None,
            used_symbol: None,
            attempted: vec!["ZQF25.CBT".into()],
            error: Some("no data".into()),
        };
        assert_eq!(obs.implied_month_avg_rate(), None);

        let obs = FuturesObservation {
            last_close: Some(95.67),
            ..obs
        };
        let rate = obs.implied_month_avg_rate().unwrap();
        assert!((rate - 4.33).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_absent_key_is_zero_on_read() {
        let dist: ImpliedDistribution =
            [(OutcomeKey::Hold, 0.9)].into_iter().collect();
        assert_eq!(dist.get(OutcomeKey::Cut25), None);
        assert_eq!(dist.prob_or_zero(OutcomeKey::Cut25), 0.0);
        assert_eq!(dist.prob_or_zero(OutcomeKey::Hold), 0.9);
    }
}
