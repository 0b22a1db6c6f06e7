//! Edge computation between two implied distributions.
//!
//! The reference side is the futures-implied distribution, the market
//! side the prediction-market one; edge = reference − market per
//! outcome. Positive edge beyond the threshold means the market side
//! underprices that outcome ("looks cheap").

use common::{EdgeDirection, EdgeSignal, ImpliedDistribution, OutcomeKey};

/// One row of the per-outcome comparison.
#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub outcome: OutcomeKey,
    pub reference: f64,
    pub market: f64,
    /// reference − market.
    pub edge: f64,
}

/// Full per-outcome comparison over the union of present keys,
/// missing values zero-filled, in display order.
pub fn edge_table(reference: &ImpliedDistribution, market: &ImpliedDistribution) -> Vec<EdgeRow> {
    OutcomeKey::ALL
        .into_iter()
        .filter(|key| reference.get(*key).is_some() || market.get(*key).is_some())
        .map(|outcome| {
            let r = reference.prob_or_zero(outcome);
            let m = market.prob_or_zero(outcome);
            EdgeRow {
                outcome,
                reference: r,
                market: m,
                edge: r - m,
            }
        })
        .collect()
}

/// Signals for every outcome whose |edge| strictly exceeds the
/// threshold. Each outcome is judged independently; an edge exactly
/// at the threshold emits nothing.
pub fn edge_signals(
    reference: &ImpliedDistribution,
    market: &ImpliedDistribution,
    threshold: f64,
) -> Vec<EdgeSignal> {
    edge_table(reference, market)
        .into_iter()
        .filter_map(|row| {
            if row.edge > threshold {
                Some(EdgeSignal {
                    outcome: row.outcome,
                    direction: EdgeDirection::Cheap,
                    edge: row.edge,
                })
            } else if row.edge < -threshold {
                Some(EdgeSignal {
                    outcome: row.outcome,
                    direction: EdgeDirection::Rich,
                    edge: row.edge,
                })
            } else {
                None
            }
        })
        .collect()
}
