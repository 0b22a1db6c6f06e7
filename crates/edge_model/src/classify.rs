//! Market title classification and aggregation.
//!
//! Kalshi decision-market titles are free text ("Fed cuts rates by
//! 50 bps", "The Fed maintains the target range"). Classification is
//! case-insensitive ordered substring matching — hold keywords win
//! over cut/hike, first match ends the scan.

use common::{DecisionOutcome, ImpliedDistribution, KalshiMarket, RateAction};
use serde::Serialize;
use tracing::debug;

/// Magnitudes the classifier recognizes, scanned in this order.
const MAGNITUDES_BPS: [u32; 4] = [25, 50, 75, 100];

const HOLD_KEYWORDS: [&str; 4] = ["maintain", "no change", "holds", "hold"];

/// Classify a contract title into an (action, magnitude) outcome.
///
/// Returns `None` for titles matching no known pattern; those are
/// excluded from aggregation, never defaulted to a hold.
pub fn classify_title(title: &str) -> Option<DecisionOutcome> {
    let t = title.to_lowercase();

    if HOLD_KEYWORDS.iter().any(|kw| t.contains(kw)) {
        return Some(DecisionOutcome::new(RateAction::Hold, 0));
    }

    if t.contains("cut") {
        return Some(DecisionOutcome::new(RateAction::Cut, scan_magnitude(&t)));
    }

    if t.contains("hike") || t.contains("raise") {
        return Some(DecisionOutcome::new(RateAction::Hike, scan_magnitude(&t)));
    }

    None
}

/// First recognized magnitude whose decimal string appears in the
/// title; 25bp when none does.
fn scan_magnitude(lowered: &str) -> u32 {
    MAGNITUDES_BPS
        .into_iter()
        .find(|bps| lowered.contains(&bps.to_string()))
        .unwrap_or(25)
}

// ── Aggregation ───────────────────────────────────────────────────────

/// Why a market was left out of the aggregated distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    /// Title matched no known pattern.
    Unclassifiable,
    /// Classified, but the magnitude has no bucket on the 3-outcome ladder.
    OffLadder(DecisionOutcome),
    /// No usable bid/ask midpoint or last trade.
    NoQuote,
}

/// A market excluded from the comparison, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoredMarket {
    pub ticker: String,
    pub title: String,
    pub reason: IgnoredReason,
}

/// Aggregated market-implied distribution plus the exclusion report.
#[derive(Debug, Clone)]
pub struct ClassifiedBook {
    pub distribution: ImpliedDistribution,
    pub ignored: Vec<IgnoredMarket>,
}

/// Fold an event's markets into the three-bucket distribution.
///
/// Each classifiable, quoted market contributes its mid-probability to
/// its bucket; if two markets classify to the same bucket the later
/// one wins. Everything excluded is reported in `ignored` rather than
/// dropped silently.
pub fn distribution_from_markets(markets: &[KalshiMarket]) -> ClassifiedBook {
    let mut distribution = ImpliedDistribution::new();
    let mut ignored = Vec::new();

    for market in markets {
        let outcome = match classify_title(&market.title) {
            Some(o) => o,
            None => {
                debug!("{}: unclassifiable title {:?}", market.ticker, market.title);
                ignored.push(IgnoredMarket {
                    ticker: market.ticker.clone(),
                    title: market.title.clone(),
                    reason: IgnoredReason::Unclassifiable,
                });
                continue;
            }
        };

        let prob = match market.mid_prob() {
            Some(p) => p,
            None => {
                debug!("{}: no usable quote", market.ticker);
                ignored.push(IgnoredMarket {
                    ticker: market.ticker.clone(),
                    title: market.title.clone(),
                    reason: IgnoredReason::NoQuote,
                });
                continue;
            }
        };

        match outcome.bucket() {
            Some(key) => distribution.set(key, prob),
            None => {
                debug!("{}: off-ladder outcome {}", market.ticker, outcome);
                ignored.push(IgnoredMarket {
                    ticker: market.ticker.clone(),
                    title: market.title.clone(),
                    reason: IgnoredReason::OffLadder(outcome),
                });
            }
        }
    }

    ClassifiedBook {
        distribution,
        ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OutcomeKey;

    fn market(ticker: &str, title: &str, bid: Option<i64>, ask: Option<i64>) -> KalshiMarket {
        KalshiMarket {
            ticker: ticker.into(),
            title: title.into(),
            yes_bid: bid,
            yes_ask: ask,
            last_price: None,
            status: "open".into(),
        }
    }

    #[test]
    fn test_hold_keywords() {
        for title in [
            "The Fed maintains the target range",
            "No change to the federal funds rate",
            "Fed holds rates steady",
            "Will the Fed hold?",
        ] {
            assert_eq!(
                classify_title(title),
                Some(DecisionOutcome::new(RateAction::Hold, 0)),
                "title {:?} should classify as HOLD",
                title
            );
        }
    }

    #[test]
    fn test_cut_with_magnitude() {
        assert_eq!(
            classify_title("Fed cuts rates by 50 bps"),
            Some(DecisionOutcome::new(RateAction::Cut, 50))
        );
        assert_eq!(
            classify_title("Fed cuts rates by 100 bps"),
            Some(DecisionOutcome::new(RateAction::Cut, 100))
        );
    }

    #[test]
    fn test_default_magnitude_is_25() {
        assert_eq!(
            classify_title("Fed hikes"),
            Some(DecisionOutcome::new(RateAction::Hike, 25))
        );
        assert_eq!(
            classify_title("Fed cuts rates"),
            Some(DecisionOutcome::new(RateAction::Cut, 25))
        );
    }

    #[test]
    fn test_raise_is_a_hike() {
        assert_eq!(
            classify_title("Fed raises rates by 75 bps"),
            Some(DecisionOutcome::new(RateAction::Hike, 75))
        );
    }

    #[test]
    fn test_hold_wins_over_later_keywords() {
        // Ordered matching: hold keywords are checked first.
        assert_eq!(
            classify_title("Fed holds instead of a cut"),
            Some(DecisionOutcome::new(RateAction::Hold, 0))
        );
    }

    #[test]
    fn test_unclassifiable() {
        assert_eq!(classify_title("Sideways chop"), None);
        assert_eq!(classify_title(""), None);
    }

    #[test]
    fn test_aggregation_folds_and_reports() {
        let markets = vec![
            market("CUT", "Fed cuts rates by 25 bps", Some(8), Some(12)),
            market("HOLD", "Fed maintains the target range", Some(78), Some(82)),
            market("HIKE", "Fed hikes rates by 25 bps", Some(4), Some(6)),
            market("CUT50", "Fed cuts rates by 50 bps", Some(1), Some(3)),
            market("JUNK", "Sideways chop", Some(50), Some(52)),
            market("NOQUOTE", "Fed cuts rates by 25 bps", None, None),
        ];

        let book = distribution_from_markets(&markets);

        assert_eq!(book.distribution.get(OutcomeKey::Cut25), Some(0.10));
        assert_eq!(book.distribution.get(OutcomeKey::Hold), Some(0.80));
        assert_eq!(book.distribution.get(OutcomeKey::Hike25), Some(0.05));

        assert_eq!(book.ignored.len(), 3);
        assert_eq!(book.ignored[0].ticker, "CUT50");
        assert_eq!(
            book.ignored[0].reason,
            IgnoredReason::OffLadder(DecisionOutcome::new(RateAction::Cut, 50))
        );
        assert_eq!(book.ignored[1].reason, IgnoredReason::Unclassifiable);
        assert_eq!(book.ignored[2].reason, IgnoredReason::NoQuote);
    }

    #[test]
    fn test_aggregation_matches_direct_mids() {
        // One market per outcome: aggregation must reproduce the same
        // mapping as building the distribution from mid-probs directly.
        let markets = vec![
            market("C", "Fed cuts rates by 25 bps", Some(10), Some(14)),
            market("H", "Fed holds", Some(70), Some(74)),
            market("K", "Fed hikes by 25 bps", Some(10), Some(14)),
        ];
        let book = distribution_from_markets(&markets);

        let direct: ImpliedDistribution = markets
            .iter()
            .zip([OutcomeKey::Cut25, OutcomeKey::Hold, OutcomeKey::Hike25])
            .map(|(m, key)| (key, m.mid_prob().unwrap()))
            .collect();

        assert_eq!(book.distribution, direct);
        assert!(book.ignored.is_empty());
    }

    #[test]
    fn test_duplicate_bucket_last_wins() {
        let markets = vec![
            market("A", "Fed holds", Some(60), Some(64)),
            market("B", "Fed maintains the target range", Some(70), Some(74)),
        ];
        let book = distribution_from_markets(&markets);
        assert_eq!(book.distribution.get(OutcomeKey::Hold), Some(0.72));
    }
}
