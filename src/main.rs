//! FOMC edge bot: Kalshi vs fed funds futures divergence monitor.
//!
//! Single-binary Tokio application that:
//! 1. Resolves the next FOMC meeting (calendar or manual override)
//! 2. Fetches fed funds futures settlements for the meeting and prior month
//! 3. Fetches the matching Kalshi decision event and its markets
//! 4. Converts both sides to 3-outcome probability distributions
//! 5. Logs and journals per-outcome edges beyond the threshold

mod config;

use std::{
    fs::{create_dir_all, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::{Datelike, NaiveDate, SecondsFormat, Utc};
use clap::Parser;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{error, info, warn};

use common::config::BotConfig;
use common::{EdgeSignal, Error, EventRecord};
use edge_model::{
    choose_event_for_date, distribution_from_markets, edge_signals, edge_table,
    futures_to_distribution, ClassifiedBook, FuturesImpliedProbs,
};
use fomc_calendar::CalendarClient;
use futures_client::{fed_funds_symbol, FuturesClient};
use kalshi_client::KalshiRestClient;

/// Kalshi vs fed funds futures edge monitor.
#[derive(Parser)]
#[command(name = "fomc-edge-bot", about = "Kalshi vs fed funds futures edge monitor")]
struct Cli {
    /// Run a single evaluation cycle and exit.
    #[arg(long)]
    once: bool,

    /// Path to config.toml.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

const BOT_SNAPSHOT_DIR: &str = "fomc-edge-bot";

type SharedJournal = Arc<Mutex<SnapshotJournal>>;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn resolve_repo_root() -> Option<PathBuf> {
    let mut cursor = std::env::current_dir().ok()?;
    loop {
        if cursor.join(".git").is_dir() {
            return Some(cursor);
        }
        if !cursor.pop() {
            return None;
        }
    }
}

fn resolve_snapshots_dir() -> PathBuf {
    if let Ok(raw) = std::env::var("SNAPSHOTS_DIR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join(BOT_SNAPSHOT_DIR);
        }
    }

    if let Some(root) = resolve_repo_root() {
        return root.join("SNAPSHOTS").join(BOT_SNAPSHOT_DIR);
    }

    PathBuf::from("SNAPSHOTS").join(BOT_SNAPSHOT_DIR)
}

/// Day-rotated JSON-lines journal of per-cycle snapshots.
struct SnapshotJournal {
    dir: PathBuf,
    day_key: String,
    file: File,
}

impl SnapshotJournal {
    fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        let day_key = Utc::now().format("%Y-%m-%d").to_string();
        let file = Self::open_day_file(&dir, &day_key)?;
        Ok(Self { dir, day_key, file })
    }

    fn open_day_file(dir: &Path, day_key: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("snapshots-{}.jsonl", day_key)))
    }

    fn rotate_if_needed(&mut self) -> std::io::Result<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        if today != self.day_key {
            self.file = Self::open_day_file(&self.dir, &today)?;
            self.day_key = today;
        }
        Ok(())
    }

    fn write_event(&mut self, event: serde_json::Value) {
        let write_result = (|| -> std::io::Result<()> {
            self.rotate_if_needed()?;
            let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            writeln!(self.file, "{}", line)?;
            self.file.flush()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            warn!("Snapshot journal write failed: {}", e);
        }
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn write_snapshot(journal: &SharedJournal, event: serde_json::Value) {
    let mut guard = journal.lock().await;
    guard.write_event(event);
}

// ── Meeting resolution ────────────────────────────────────────────────

/// The fully resolved meeting/contract selection for one cycle.
#[derive(Debug, Clone)]
struct MeetingPlan {
    decision_date: NaiveDate,
    effective_from: NaiveDate,
    futures_year: i32,
    futures_month: u32,
    prior_year: i32,
    prior_month: u32,
    source: &'static str,
}

fn prior_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Resolve the meeting from config overrides, falling back to the
/// official calendar.
async fn resolve_meeting(cfg: &BotConfig, calendar: &CalendarClient) -> Result<MeetingPlan, Error> {
    if let Some(decision_date) = cfg.meeting.decision_date {
        let effective_from = cfg
            .meeting
            .effective_from
            .unwrap_or(decision_date + chrono::Duration::days(1));
        let (futures_year, futures_month) =
            match (cfg.meeting.futures_year, cfg.meeting.futures_month) {
                (Some(y), Some(m)) => (y, m),
                _ => (decision_date.year(), decision_date.month()),
            };
        let (prior_year, prior_month) = prior_month(futures_year, futures_month);
        return Ok(MeetingPlan {
            decision_date,
            effective_from,
            futures_year,
            futures_month,
            prior_year,
            prior_month,
            source: "config",
        });
    }

    let today = Utc::now().date_naive();
    let meeting = calendar.next_meeting(today).await?;
    let decision_date = meeting
        .end_date()
        .ok_or_else(|| Error::Calendar(format!("invalid meeting date in {:?}", meeting)))?;
    let effective_from = meeting
        .effective_from()
        .ok_or_else(|| Error::Calendar(format!("invalid meeting date in {:?}", meeting)))?;
    let (prior_year, prior_month) = prior_month(meeting.year, meeting.month);

    Ok(MeetingPlan {
        decision_date,
        effective_from,
        futures_year: meeting.year,
        futures_month: meeting.month,
        prior_year,
        prior_month,
        source: "calendar",
    })
}

// ── Evaluation cycle ──────────────────────────────────────────────────

struct CycleReport {
    event: EventRecord,
    book: ClassifiedBook,
    futures: FuturesImpliedProbs,
    pre_rate_mid: f64,
    signals: Vec<EdgeSignal>,
}

async fn run_cycle(
    cfg: &BotConfig,
    plan: &MeetingPlan,
    kalshi: &KalshiRestClient,
    futures: &FuturesClient,
) -> Result<CycleReport, Error> {
    // 1. Futures side: meeting-month and prior-month settlements.
    let meeting_symbol = fed_funds_symbol(plan.futures_year, plan.futures_month);
    let prior_symbol = fed_funds_symbol(plan.prior_year, plan.prior_month);

    let meeting_obs = futures.fetch_settlement(&meeting_symbol).await;
    let prior_obs = futures.fetch_settlement(&prior_symbol).await;

    let month_avg_rate = meeting_obs.implied_month_avg_rate().ok_or_else(|| {
        Error::MissingData(format!(
            "no settlement for meeting-month contract {} (attempted {:?}: {})",
            meeting_symbol,
            meeting_obs.attempted,
            meeting_obs.error.as_deref().unwrap_or("unknown"),
        ))
    })?;

    // Pre-decision anchor: explicit override, else the prior-month
    // contract's implied average rate.
    let pre_rate_mid = match cfg.model.pre_rate_mid {
        Some(r) => r,
        None => prior_obs.implied_month_avg_rate().ok_or_else(|| {
            Error::MissingData(format!(
                "no pre-decision anchor: prior-month contract {} unavailable ({}) and no \
                 pre_rate_mid override",
                prior_symbol,
                prior_obs.error.as_deref().unwrap_or("unknown"),
            ))
        })?,
    };

    let fut = futures_to_distribution(
        month_avg_rate,
        pre_rate_mid,
        plan.futures_year,
        plan.futures_month,
        plan.effective_from,
        cfg.model.rate_step,
    )?;

    info!(
        "Futures: {} close→avg {:.3}%, anchor {:.3}%, implied post-decision rate {:.3}%",
        meeting_symbol, month_avg_rate, pre_rate_mid, fut.implied_post_rate
    );

    // 2. Kalshi side: pick the event for the decision date, classify
    // its markets.
    let events = kalshi.get_events(&cfg.series_ticker, None, 200).await?;
    let chosen = choose_event_for_date(&events, plan.decision_date)?;
    let event = kalshi.get_event(&chosen.event_ticker).await?;
    info!(
        "Kalshi event: {} ({:?}), {} markets",
        event.event_ticker,
        event.title,
        event.markets.len()
    );

    let book = distribution_from_markets(&event.markets);
    for ignored in &book.ignored {
        info!(
            "  excluded {}: {:?} ({:?})",
            ignored.ticker, ignored.title, ignored.reason
        );
    }

    // 3. Compare.
    for row in edge_table(&fut.probs, &book.distribution) {
        info!(
            "  {:<6} futures={:.3} kalshi={:.3} edge={:+.3}",
            row.outcome.to_string(),
            row.reference,
            row.market,
            row.edge
        );
    }

    let signals = edge_signals(&fut.probs, &book.distribution, cfg.model.edge_threshold);
    if signals.is_empty() {
        info!("No signals beyond threshold {:.3}", cfg.model.edge_threshold);
    }
    for signal in &signals {
        info!(
            "SIGNAL: {} — Kalshi {} (edge {:+.3})",
            signal.outcome, signal.direction, signal.edge
        );
    }

    Ok(CycleReport {
        event,
        book,
        futures: fut,
        pre_rate_mid,
        signals,
    })
}

async fn journal_cycle(journal: &SharedJournal, plan: &MeetingPlan, report: &CycleReport) {
    let kalshi_probs: serde_json::Map<String, serde_json::Value> = report
        .book
        .distribution
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    let futures_probs: serde_json::Map<String, serde_json::Value> = report
        .futures
        .probs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();

    write_snapshot(
        journal,
        json!({
            "ts": now_iso(),
            "kind": "cycle",
            "decision_date": plan.decision_date,
            "effective_from": plan.effective_from,
            "meeting_source": plan.source,
            "event_ticker": report.event.event_ticker,
            "event_title": report.event.title,
            "pre_rate_mid": report.pre_rate_mid,
            "implied_post_rate": report.futures.implied_post_rate,
            "kalshi": kalshi_probs,
            "futures": futures_probs,
            "excluded_markets": report.book.ignored,
            "signals": report.signals.iter().map(|s| {
                json!({
                    "outcome": s.outcome,
                    "direction": s.direction,
                    "edge": s.edge,
                })
            }).collect::<Vec<_>>(),
        }),
    )
    .await;
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fomc_edge_bot=info,kalshi_client=info,futures_client=info,fomc_calendar=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("FOMC edge bot starting up...");

    let cfg = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Kalshi series: {}", cfg.series_ticker);
    info!(
        "Model: step={:.3}, edge_threshold={:.3}, pre_rate_override={:?}",
        cfg.model.rate_step, cfg.model.edge_threshold, cfg.model.pre_rate_mid
    );
    info!(
        "Timing: poll={}s, request_timeout={}s",
        cfg.timing.poll_interval_secs, cfg.timing.request_timeout_secs
    );

    let snapshots_dir = resolve_snapshots_dir();
    let journal = match SnapshotJournal::open(snapshots_dir) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to initialize snapshot journal: {}", e);
            std::process::exit(1);
        }
    };
    let journal_path = journal.dir().to_path_buf();
    let journal: SharedJournal = Arc::new(Mutex::new(journal));
    info!("Snapshot journal path: {}", journal_path.display());

    let kalshi = KalshiRestClient::new(&cfg.kalshi_base_url, cfg.timing.request_timeout_secs);
    let futures = FuturesClient::new(cfg.timing.request_timeout_secs);
    let calendar = CalendarClient::new(cfg.timing.request_timeout_secs);

    write_snapshot(
        &journal,
        json!({
            "ts": now_iso(),
            "kind": "bot_start",
            "bot": "fomc-edge-bot",
            "mode": if cli.once { "once" } else { "loop" },
            "series_ticker": cfg.series_ticker,
            "model": {
                "rate_step": cfg.model.rate_step,
                "edge_threshold": cfg.model.edge_threshold,
                "pre_rate_mid": cfg.model.pre_rate_mid,
            },
            "timing": {
                "poll_interval_secs": cfg.timing.poll_interval_secs,
            },
        }),
    )
    .await;

    loop {
        match resolve_meeting(&cfg, &calendar).await {
            Ok(plan) => {
                info!(
                    "Meeting ({}): decision {}, effective {}, contract {}-{:02} (prior {}-{:02})",
                    plan.source,
                    plan.decision_date,
                    plan.effective_from,
                    plan.futures_year,
                    plan.futures_month,
                    plan.prior_year,
                    plan.prior_month,
                );

                match run_cycle(&cfg, &plan, &kalshi, &futures).await {
                    Ok(report) => journal_cycle(&journal, &plan, &report).await,
                    Err(e) => {
                        error!("Evaluation cycle failed: {}", e);
                        write_snapshot(
                            &journal,
                            json!({
                                "ts": now_iso(),
                                "kind": "cycle_error",
                                "error": e.to_string(),
                            }),
                        )
                        .await;
                    }
                }
            }
            Err(e) => {
                error!("Meeting resolution failed: {}", e);
                write_snapshot(
                    &journal,
                    json!({
                        "ts": now_iso(),
                        "kind": "meeting_error",
                        "error": e.to_string(),
                    }),
                )
                .await;
            }
        }

        if cli.once {
            break;
        }
        sleep(Duration::from_secs(cfg.timing.poll_interval_secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prior_month_rollover() {
        assert_eq!(prior_month(2025, 1), (2024, 12));
        assert_eq!(prior_month(2025, 6), (2025, 5));
    }
}
