//! Configuration loader — merges env vars, .env file, and config.toml.

use chrono::NaiveDate;
use common::config::BotConfig;
use common::Error;
use std::path::Path;

fn parse_positive_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number > 0")))?;
    if parsed <= 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number > 0")));
    }
    Ok(parsed)
}

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn parse_date(raw: &str, env_name: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Config(format!("{env_name} must be a YYYY-MM-DD date")))
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.kalshi_base_url.trim().is_empty() {
        issues.push("kalshi_base_url must not be empty".into());
    }
    if config.series_ticker.trim().is_empty() {
        issues.push("series_ticker must not be empty".into());
    }

    if config.model.rate_step <= 0.0 {
        issues.push("model.rate_step must be > 0".into());
    }
    if config.model.edge_threshold < 0.0 {
        issues.push("model.edge_threshold must be >= 0".into());
    }

    if let Some(month) = config.meeting.futures_month {
        if !(1..=12).contains(&month) {
            issues.push("meeting.futures_month must be in 1..=12".into());
        }
    }
    if config.meeting.futures_year.is_some() != config.meeting.futures_month.is_some() {
        issues.push("meeting.futures_year and meeting.futures_month must be set together".into());
    }
    if let (Some(decision), Some(effective)) =
        (config.meeting.decision_date, config.meeting.effective_from)
    {
        if effective <= decision {
            issues.push("meeting.effective_from must be after meeting.decision_date".into());
        }
    }
    if config.meeting.effective_from.is_some() && config.meeting.decision_date.is_none() {
        issues.push("meeting.effective_from requires meeting.decision_date".into());
    }

    if config.timing.poll_interval_secs == 0 {
        issues.push("timing.poll_interval_secs must be > 0".into());
    }
    if config.timing.request_timeout_secs == 0 {
        issues.push("timing.request_timeout_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(issues.join("; ")))
    }
}

/// Load configuration: config.toml (if present), then env overrides,
/// then validation.
pub fn load_config(path: &Path) -> Result<BotConfig, Error> {
    // Pull in .env first so file-based secrets land in the env pass.
    dotenvy::dotenv().ok();

    let mut config: BotConfig = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("config.toml: {}", e)))?
    } else {
        BotConfig::default()
    };

    if let Ok(v) = std::env::var("KALSHI_BASE_URL") {
        if !v.trim().is_empty() {
            config.kalshi_base_url = v.trim().to_string();
        }
    }
    if let Ok(v) = std::env::var("KALSHI_SERIES_TICKER") {
        if !v.trim().is_empty() {
            config.series_ticker = v.trim().to_string();
        }
    }
    if let Ok(v) = std::env::var("MEETING_DECISION_DATE") {
        config.meeting.decision_date = Some(parse_date(&v, "MEETING_DECISION_DATE")?);
    }
    if let Ok(v) = std::env::var("MEETING_EFFECTIVE_FROM") {
        config.meeting.effective_from = Some(parse_date(&v, "MEETING_EFFECTIVE_FROM")?);
    }
    if let Ok(v) = std::env::var("FUTURES_YEAR") {
        let year = v
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::Config("FUTURES_YEAR must be an integer".into()))?;
        config.meeting.futures_year = Some(year);
    }
    if let Ok(v) = std::env::var("FUTURES_MONTH") {
        let month = v
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config("FUTURES_MONTH must be an integer in 1..=12".into()))?;
        config.meeting.futures_month = Some(month);
    }
    if let Ok(v) = std::env::var("RATE_STEP") {
        config.model.rate_step = parse_positive_f64(&v, "RATE_STEP")?;
    }
    if let Ok(v) = std::env::var("EDGE_THRESHOLD") {
        config.model.edge_threshold = parse_non_negative_f64(&v, "EDGE_THRESHOLD")?;
    }
    if let Ok(v) = std::env::var("PRE_RATE_MID") {
        config.model.pre_rate_mid = Some(parse_positive_f64(&v, "PRE_RATE_MID")?);
    }
    if let Ok(v) = std::env::var("POLL_INTERVAL_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config("POLL_INTERVAL_SECS must be an integer > 0".into()))?;
        config.timing.poll_interval_secs = secs;
    }

    validate_config(&config)?;
    Ok(config)
}
