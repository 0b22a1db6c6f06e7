//! Fed-decision series discovery.
//!
//! The exchange lists thousands of series; this ranks them by keyword
//! relevance to the Fed rate decision so the bot can fall back to
//! discovery when the configured series ticker disappears.

use serde::{Deserialize, Serialize};

/// A series as returned by GET /series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesInfo {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub title: String,
}

/// Keyword weights over lowercased `title + " " + ticker`.
const KEYWORD_WEIGHTS: [(&str, i32); 13] = [
    ("kxfeddecision", 999),
    ("fomc", 50),
    ("fed decision", 40),
    ("rate decision", 35),
    ("federal open market", 30),
    ("kxfed", 25),
    ("meeting", 20),
    ("decision", 20),
    ("target rate", 15),
    ("federal reserve", 10),
    ("fed funds", 10),
    ("interest rate", 8),
    ("policy rate", 8),
];

/// Rank series tickers by Fed-decision relevance, best first.
///
/// The known decision series `KXFEDDECISION` is pinned to the front
/// whenever it exists; `KXFED`-prefixed tickers get an extra boost.
pub fn rank_decision_series(series: &[SeriesInfo], top_n: usize) -> Vec<String> {
    let pinned: Vec<String> = series
        .iter()
        .map(|s| s.ticker.trim())
        .filter(|t| *t == "KXFEDDECISION")
        .map(|t| t.to_string())
        .collect();

    let mut scored: Vec<(i32, String)> = Vec::new();
    for s in series {
        let ticker = s.ticker.trim();
        if ticker.is_empty() {
            continue;
        }

        let text = format!("{} {}", s.title, ticker).to_lowercase();
        let mut score: i32 = KEYWORD_WEIGHTS
            .iter()
            .filter(|(kw, _)| text.contains(kw))
            .map(|(_, w)| w)
            .sum();

        if ticker.to_lowercase().starts_with("kxfed") {
            score += 30;
        }

        if score > 0 {
            scored.push((score, ticker.to_string()));
        }
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ranked = pinned;
    for (_, ticker) in scored {
        if !ranked.contains(&ticker) {
            ranked.push(ticker);
        }
    }
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(ticker: &str, title: &str) -> SeriesInfo {
        SeriesInfo {
            ticker: ticker.into(),
            title: title.into(),
        }
    }

    #[test]
    fn test_known_series_is_pinned_first() {
        let input = vec![
            series("KXFOMCMOVE", "FOMC rate decision size"),
            series("KXFEDDECISION", "Fed decision"),
            series("KXHIGHNY", "High temperature in NYC"),
        ];
        let ranked = rank_decision_series(&input, 5);
        assert_eq!(ranked[0], "KXFEDDECISION");
        assert!(!ranked.contains(&"KXHIGHNY".to_string()));
    }

    #[test]
    fn test_keyword_scoring_orders_candidates() {
        let input = vec![
            series("KXECB", "Interest rate decision by the ECB"),
            series("KXFOMCMEETING", "FOMC meeting target rate decision"),
        ];
        let ranked = rank_decision_series(&input, 5);
        // FOMC + meeting + decision + target rate outweighs a bare
        // interest-rate-decision match.
        assert_eq!(ranked[0], "KXFOMCMEETING");
        assert_eq!(ranked[1], "KXECB");
    }

    #[test]
    fn test_unrelated_series_are_dropped() {
        let input = vec![
            series("KXNBA", "NBA champion"),
            series("", "Blank ticker"),
        ];
        assert!(rank_decision_series(&input, 5).is_empty());
    }

    #[test]
    fn test_top_n_truncation() {
        let input = vec![
            series("KXFEDDECISION", "Fed decision"),
            series("KXFEDCHAIR", "Federal reserve chair decision"),
            series("KXFOMC", "FOMC meeting"),
        ];
        let ranked = rank_decision_series(&input, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], "KXFEDDECISION");
    }
}
