//! Nearest-date event selection.
//!
//! Kalshi event schemas disagree on which field carries the decision
//! date, so each record exposes a priority-ordered list of optional
//! date fields and the first parseable one wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use common::{Error, EventRecord, Result};
use tracing::debug;

/// Representative timestamp for a record: the first present, parseable
/// date field in priority order. `None` excludes the record from
/// candidacy.
pub fn event_timestamp(record: &EventRecord) -> Option<NaiveDateTime> {
    for (_name, value) in record.date_fields() {
        let Some(raw) = value else { continue };
        if let Some(ts) = parse_timestamp(raw) {
            return Some(ts);
        }
    }
    None
}

/// Parse an absolute timestamp from the formats Kalshi emits:
/// RFC 3339, a naive datetime, or a bare date (midnight).
///
/// Offset-bearing timestamps are deliberately normalized to UTC
/// before the offset is dropped, so a `+05:00` and the equivalent `Z`
/// timestamp compare equal. Kalshi emits `Z`-suffixed timestamps, for
/// which normalization is a no-op.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Pick the record closest in time to the target decision date.
///
/// The target is anchored at noon so day-boundary timezone rounding
/// can't flip which side of the date a timestamp lands on. Ties keep
/// the earlier-listed record. Records with no parseable date field
/// are excluded; an empty candidate set or a winner without an event
/// ticker is an error.
pub fn choose_event_for_date<'a>(
    events: &'a [EventRecord],
    target: NaiveDate,
) -> Result<&'a EventRecord> {
    let anchor = target
        .and_hms_opt(12, 0, 0)
        .expect("noon is always a valid time");

    let mut best: Option<(i64, &EventRecord)> = None;
    for event in events {
        let Some(ts) = event_timestamp(event) else {
            debug!("{}: no parseable date field, skipping", event.event_ticker);
            continue;
        };
        let dist = (ts - anchor).num_seconds().abs();
        // Strict < keeps the first record on ties.
        if best.map_or(true, |(best_dist, _)| dist < best_dist) {
            best = Some((dist, event));
        }
    }

    let winner = best.map(|(_, event)| event).ok_or_else(|| {
        Error::NoMatchingEvent(format!(
            "no event with a parseable date among {} records for {}",
            events.len(),
            target
        ))
    })?;

    // A dated record without a ticker cannot be fetched; treat it the
    // same as finding nothing.
    if winner.event_ticker.is_empty() {
        return Err(Error::NoMatchingEvent(format!(
            "nearest event to {} has no event ticker",
            target
        )));
    }
    Ok(winner)
}
