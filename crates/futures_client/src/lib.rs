//! Fed funds futures settlement retrieval.
//!
//! Builds CME 30-day fed funds symbols (`ZQ` + month code + 2-digit
//! year + `.CBT`) and fetches the last settlement close from the Yahoo
//! chart endpoint, trying the known symbol quirks in order. Missing
//! prices are data, not errors: every fetch returns an observation.

use common::FuturesObservation;
use serde::Deserialize;
use tracing::{debug, warn};

/// CME month codes, January through December.
const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Yahoo symbol for the fed funds contract of a given month,
/// e.g. `ZQF25.CBT` for January 2025.
pub fn fed_funds_symbol(year: i32, month: u32) -> String {
    let code = MONTH_CODES[(month - 1) as usize];
    format!("ZQ{}{:02}.CBT", code, year.rem_euclid(100))
}

/// Symbol variants worth trying, in order: the raw symbol, its
/// `0`-prefixed form, and both again without the exchange suffix.
pub fn symbol_candidates(symbol: &str) -> Vec<String> {
    let base = symbol.trim();
    let mut out = Vec::new();
    if !base.is_empty() {
        out.push(base.to_string());
        out.push(format!("0{}", base));
        if let Some(no_suffix) = base.strip_suffix(".CBT") {
            out.push(no_suffix.to_string());
            out.push(format!("0{}", no_suffix));
        }
    }

    let mut seen = std::collections::HashSet::new();
    out.retain(|s| seen.insert(s.clone()));
    out
}

// ── Yahoo chart response types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Last non-null close in a chart payload.
fn last_close(resp: &ChartResponse) -> Option<f64> {
    let result = resp.chart.result.as_ref()?.first()?;
    let quote = result.indicators.quote.first()?;
    quote.close.iter().rev().find_map(|c| *c)
}

// ── Client ────────────────────────────────────────────────────────────

/// Futures quote client against the Yahoo v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct FuturesClient {
    client: reqwest::Client,
    base_url: String,
}

impl FuturesClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com", timeout_secs)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build futures HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the latest settlement close for `symbol`, trying each
    /// candidate variant until one yields a price.
    ///
    /// Always returns an observation: a missing price leaves
    /// `last_close` absent and records the per-candidate errors.
    pub async fn fetch_settlement(&self, symbol: &str) -> FuturesObservation {
        let attempted = symbol_candidates(symbol);
        let mut errors: Vec<String> = Vec::new();

        for candidate in &attempted {
            match self.fetch_chart_close(candidate).await {
                Ok(Some(close)) => {
                    debug!("{}: close {} via {}", symbol, close, candidate);
                    return FuturesObservation {
                        symbol: symbol.to_string(),
                        last_close: Some(close),
                        used_symbol: Some(candidate.clone()),
                        attempted,
                        error: None,
                    };
                }
                Ok(None) => errors.push(format!("{}: no close data", candidate)),
                Err(e) => errors.push(format!("{}: {}", candidate, e)),
            }
        }

        warn!("{}: no settlement price from any candidate", symbol);
        FuturesObservation {
            symbol: symbol.to_string(),
            last_close: None,
            used_symbol: None,
            attempted,
            error: if errors.is_empty() {
                Some("no candidates to try".into())
            } else {
                Some(errors.join(" | "))
            },
        }
    }

    async fn fetch_chart_close(&self, symbol: &str) -> Result<Option<f64>, String> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("range", "1y"),
                ("interval", "1d"),
                ("includePrePost", "false"),
                ("events", "div,splits"),
            ])
            .send()
            .await
            .map_err(|e| format!("http: {}", e))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(format!("status {}", status));
        }

        let body: ChartResponse = resp.json().await.map_err(|e| format!("json: {}", e))?;
        if let Some(err) = &body.chart.error {
            return Err(format!("chart error: {}", err));
        }
        Ok(last_close(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_construction() {
        assert_eq!(fed_funds_symbol(2025, 1), "ZQF25.CBT");
        assert_eq!(fed_funds_symbol(2024, 12), "ZQZ24.CBT");
        assert_eq!(fed_funds_symbol(2026, 6), "ZQM26.CBT");
        assert_eq!(fed_funds_symbol(2030, 9), "ZQU30.CBT");
    }

    #[test]
    fn test_candidates_order_and_dedup() {
        let c = symbol_candidates("ZQF25.CBT");
        assert_eq!(c, vec!["ZQF25.CBT", "0ZQF25.CBT", "ZQF25", "0ZQF25"]);

        let c = symbol_candidates("ZQF25");
        assert_eq!(c, vec!["ZQF25", "0ZQF25"]);

        assert!(symbol_candidates("  ").is_empty());
    }

    #[test]
    fn test_last_close_skips_trailing_nulls() {
        let body = r#"{
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{"close": [95.1, 95.2, null, 95.67, null, null]}]
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(last_close(&resp), Some(95.67));
    }

    #[test]
    fn test_last_close_empty_payload() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(last_close(&resp), None);

        let body = r#"{"chart": {"result": null, "error": null}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(last_close(&resp), None);
    }
}
