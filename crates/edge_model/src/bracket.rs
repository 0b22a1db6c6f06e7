//! Piecewise-linear bracket probability model.
//!
//! Allocates an implied post-decision rate onto the discrete ladder
//! {base - step, base, base + step} by linear interpolation between
//! adjacent rungs. A heuristic, not a statistical model: mass goes to
//! whichever rungs the implied rate sits between.

use common::{ImpliedDistribution, OutcomeKey};

/// Map a continuous implied rate to a three-outcome distribution.
///
/// Sums to exactly 1 for any real input. The boundary `implied ==
/// base_mid` falls in the hold/hike branch and yields HOLD = 1.
pub fn bracket_probs(implied: f64, base_mid: f64, step: f64) -> ImpliedDistribution {
    let cut = base_mid - step;
    let hike = base_mid + step;

    if implied <= cut {
        return [
            (OutcomeKey::Cut25, 1.0),
            (OutcomeKey::Hold, 0.0),
            (OutcomeKey::Hike25, 0.0),
        ]
        .into_iter()
        .collect();
    }
    if implied >= hike {
        return [
            (OutcomeKey::Cut25, 0.0),
            (OutcomeKey::Hold, 0.0),
            (OutcomeKey::Hike25, 1.0),
        ]
        .into_iter()
        .collect();
    }

    if implied < base_mid {
        let p_hold = (implied - cut) / step;
        return [
            (OutcomeKey::Cut25, 1.0 - p_hold),
            (OutcomeKey::Hold, p_hold),
            (OutcomeKey::Hike25, 0.0),
        ]
        .into_iter()
        .collect();
    }

    let p_hike = (implied - base_mid) / step;
    [
        (OutcomeKey::Cut25, 0.0),
        (OutcomeKey::Hold, 1.0 - p_hike),
        (OutcomeKey::Hike25, p_hike),
    ]
    .into_iter()
    .collect()
}
