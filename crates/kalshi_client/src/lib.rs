//! Kalshi API client library.
//!
//! Read-only access to the public trade API endpoints the bot needs:
//! series listing, event listing, and event-with-markets retrieval.

pub mod discovery;
pub mod rate_limit;
pub mod rest;

pub use discovery::{rank_decision_series, SeriesInfo};
pub use rate_limit::RateLimiter;
pub use rest::KalshiRestClient;
