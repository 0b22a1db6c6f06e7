//! REST client for the public Kalshi trade API.
//!
//! Covers series listing, paginated event listing, and single-event
//! retrieval with nested markets. These endpoints are unauthenticated;
//! all reads go through the shared rate limiter.

use common::{Error, EventRecord, KalshiMarket};
use serde::Deserialize;
use tracing::debug;

use crate::discovery::SeriesInfo;
use crate::rate_limit::RateLimiter;

/// Async REST client for the Kalshi trade API.
#[derive(Debug, Clone)]
pub struct KalshiRestClient {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<EventRecord>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    /// Some payload versions omit the event object entirely and only
    /// carry top-level markets.
    #[serde(default)]
    event: Option<EventRecord>,
    /// Some payload versions put the markets beside the event instead
    /// of nesting them.
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

impl EventResponse {
    /// Collapse the two payload shapes into one record, preferring
    /// nested markets when both are present.
    fn into_event(self) -> EventRecord {
        let mut event = self.event.unwrap_or_default();
        if event.markets.is_empty() && !self.markets.is_empty() {
            event.markets = self.markets;
        }
        event
    }
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    series: Vec<SeriesInfo>,
}

impl KalshiRestClient {
    /// Create a new client against `base_url`, e.g.
    /// `https://api.elections.kalshi.com/trade-api/v2`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(),
        }
    }

    /// URL helper.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List all series in the exchange.
    pub async fn list_series(&self) -> Result<Vec<SeriesInfo>, Error> {
        self.limiter.wait_read().await;

        let resp = self
            .client
            .get(self.url("/series"))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::KalshiApi {
                status,
                message: body,
            });
        }

        let body: SeriesResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        debug!("Fetched {} series", body.series.len());
        Ok(body.series)
    }

    /// Fetch all events for a series, following cursors.
    pub async fn get_events(
        &self,
        series_ticker: &str,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<EventRecord>, Error> {
        let mut all_events = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            self.limiter.wait_read().await;

            let mut req = self
                .client
                .get(self.url("/events"))
                .query(&[("series_ticker", series_ticker)])
                .query(&[("limit", &limit.to_string())]);

            if let Some(s) = status {
                req = req.query(&[("status", s)]);
            }
            if let Some(ref c) = cursor {
                req = req.query(&[("cursor", c.as_str())]);
            }

            let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;

            let status_code = resp.status().as_u16();
            if status_code != 200 {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::KalshiApi {
                    status: status_code,
                    message: body,
                });
            }

            let body: EventsResponse =
                resp.json().await.map_err(|e| Error::Http(e.to_string()))?;

            let count = body.events.len();
            all_events.extend(body.events);

            debug!(
                "Fetched {} events for {} (total: {})",
                count,
                series_ticker,
                all_events.len()
            );

            match body.cursor {
                Some(c) if !c.is_empty() => cursor = Some(c),
                _ => break,
            }
        }

        Ok(all_events)
    }

    /// Fetch a single event with its nested markets.
    pub async fn get_event(&self, event_ticker: &str) -> Result<EventRecord, Error> {
        self.limiter.wait_read().await;

        let path = format!("/events/{}", event_ticker);
        let resp = self
            .client
            .get(self.url(&path))
            .query(&[("with_nested_markets", "true")])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::KalshiApi {
                status,
                message: body,
            });
        }

        let body: EventResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        let event = body.into_event();

        debug!(
            "Fetched event {} with {} markets",
            event.event_ticker,
            event.markets.len()
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_with_nested_markets() {
        let raw = r#"{
            "event": {
                "event_ticker": "KXFEDDECISION-25JAN",
                "title": "Fed decision in January",
                "markets": [
                    {"ticker": "A", "title": "Cut by 25 bps", "status": "open"}
                ]
            }
        }"#;
        let body: EventResponse = serde_json::from_str(raw).unwrap();
        let event = body.into_event();
        assert_eq!(event.event_ticker, "KXFEDDECISION-25JAN");
        assert_eq!(event.markets.len(), 1);
        assert_eq!(event.markets[0].ticker, "A");
    }

    #[test]
    fn test_event_payload_with_only_top_level_markets() {
        // Some payloads omit the event object entirely; the markets
        // must still come through.
        let raw = r#"{
            "markets": [
                {"ticker": "A", "title": "Cut by 25 bps", "status": "open"},
                {"ticker": "B", "title": "No change", "status": "open"}
            ]
        }"#;
        let body: EventResponse = serde_json::from_str(raw).unwrap();
        let event = body.into_event();
        assert_eq!(event.event_ticker, "");
        assert_eq!(event.markets.len(), 2, "top-level markets must be adopted");
    }

    #[test]
    fn test_nested_markets_win_over_top_level() {
        let raw = r#"{
            "event": {
                "event_ticker": "KXFEDDECISION-25JAN",
                "markets": [
                    {"ticker": "NESTED", "title": "No change", "status": "open"}
                ]
            },
            "markets": [
                {"ticker": "TOP", "title": "No change", "status": "open"}
            ]
        }"#;
        let body: EventResponse = serde_json::from_str(raw).unwrap();
        let event = body.into_event();
        assert_eq!(event.markets.len(), 1);
        assert_eq!(event.markets[0].ticker, "NESTED");
    }
}
