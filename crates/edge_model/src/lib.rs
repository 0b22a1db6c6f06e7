//! Pure model core for the FOMC edge bot.
//!
//! Everything here is a deterministic map from inputs to outputs:
//! no I/O, no shared state, no clocks. The retrieval crates hand in
//! already-parsed values and the binary compares the results.

pub mod bracket;
pub mod classify;
pub mod edge;
pub mod events;
pub mod rates;

pub use bracket::bracket_probs;
pub use classify::{classify_title, distribution_from_markets, ClassifiedBook, IgnoredMarket, IgnoredReason};
pub use edge::{edge_signals, edge_table, EdgeRow};
pub use events::{choose_event_for_date, event_timestamp};
pub use rates::{days_in_month, futures_to_distribution, implied_post_decision_rate, FuturesImpliedProbs};
