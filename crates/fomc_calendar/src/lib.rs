//! FOMC meeting calendar retrieval and parsing.
//!
//! The Federal Reserve publishes the meeting schedule as an HTML page
//! with per-year sections ("2026 FOMC Meetings") listing entries like
//! "January 27-28". Markup is stripped, the year block sliced out, and
//! the month/day ranges regex-extracted.

use chrono::{Datelike, Duration, NaiveDate};
use common::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FOMC_CALENDAR_URL: &str =
    "https://www.federalreserve.gov/monetarypolicy/fomccalendars.htm";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One scheduled FOMC meeting. The decision is announced on the end
/// day; the post-decision rate is presumed effective the day after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FomcMeeting {
    pub year: i32,
    pub month: u32,
    pub start_day: u32,
    pub end_day: u32,
}

impl FomcMeeting {
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.start_day)
    }

    /// The decision date.
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.end_day)
    }

    /// First date the post-decision rate applies (day after the decision).
    pub fn effective_from(&self) -> Option<NaiveDate> {
        self.end_date().map(|d| d + Duration::days(1))
    }
}

// ── Parsing ───────────────────────────────────────────────────────────

/// Replace markup tags with newlines so ranges split across table
/// cells still match.
fn strip_tags(html: &str) -> String {
    let tag = Regex::new(r"<[^>]*>").expect("static regex");
    tag.replace_all(html, "\n").into_owned()
}

/// Slice the text between "<year> FOMC Meetings" and the next year's
/// heading (or the end of the document).
fn year_block<'a>(text: &'a str, year: i32) -> Option<&'a str> {
    let start_pat = Regex::new(&format!(r"{}\s+FOMC\s+Meetings", year)).ok()?;
    let end_pat = Regex::new(&format!(r"{}\s+FOMC\s+Meetings", year + 1)).ok()?;

    let start = start_pat.find(text)?.start();
    let rest = &text[start..];
    match end_pat.find(rest) {
        Some(m) => Some(&rest[..m.start()]),
        None => Some(rest),
    }
}

/// Extract `Month D-D` meeting ranges from one year block.
pub fn parse_meetings(block: &str, year: i32) -> Vec<FomcMeeting> {
    let pat = Regex::new(&format!(
        r"(?i)({})\s+(\d{{1,2}})\s*-\s*(\d{{1,2}})",
        MONTHS.join("|")
    ))
    .expect("static regex");

    let mut meetings = Vec::new();
    for caps in pat.captures_iter(block) {
        let month_name = caps[1].to_lowercase();
        let Some(month) = MONTHS
            .iter()
            .position(|m| m.to_lowercase() == month_name)
            .map(|i| (i + 1) as u32)
        else {
            continue;
        };
        let (Ok(start_day), Ok(end_day)) = (caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
            continue;
        };
        meetings.push(FomcMeeting {
            year,
            month,
            start_day,
            end_day,
        });
    }
    meetings
}

/// Parse all meetings for the given years from raw page HTML.
pub fn parse_calendar(html: &str, years: &[i32]) -> Vec<FomcMeeting> {
    let text = strip_tags(html);
    let mut meetings = Vec::new();
    for &year in years {
        match year_block(&text, year) {
            Some(block) => meetings.extend(parse_meetings(block, year)),
            None => debug!("no calendar block found for {}", year),
        }
    }
    meetings
}

/// The next meeting whose decision date is on or after `today`.
pub fn upcoming_meeting(meetings: &[FomcMeeting], today: NaiveDate) -> Option<FomcMeeting> {
    let mut dated: Vec<(NaiveDate, FomcMeeting)> = meetings
        .iter()
        .filter_map(|m| m.end_date().map(|d| (d, *m)))
        .collect();
    dated.sort_by_key(|(d, _)| *d);
    dated
        .into_iter()
        .find(|(end, _)| *end >= today)
        .map(|(_, m)| m)
}

// ── Client ────────────────────────────────────────────────────────────

/// Fetches the official calendar page.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: reqwest::Client,
    url: String,
}

impl CalendarClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_url(FOMC_CALENDAR_URL, timeout_secs)
    }

    pub fn with_url(url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("fomc-edge-bot/0.1")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build calendar HTTP client");

        Self {
            client,
            url: url.to_string(),
        }
    }

    /// Fetch and parse the next meeting on or after `today`.
    ///
    /// Parses the current and following year to stay correct across
    /// year boundaries.
    pub async fn next_meeting(&self, today: NaiveDate) -> Result<FomcMeeting> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::Calendar(format!(
                "calendar page returned status {}",
                status
            )));
        }

        let html = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        let years = [today.year(), today.year() + 1];
        let meetings = parse_calendar(&html, &years);
        debug!("Parsed {} meetings for {:?}", meetings.len(), years);

        upcoming_meeting(&meetings, today).ok_or_else(|| {
            Error::Calendar(format!(
                "no upcoming meeting found on the calendar after {}",
                today
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const PAGE: &str = r#"
        <h4>2025 FOMC Meetings</h4>
        <table><tr><td>January</td><td>28-29</td></tr>
        <tr><td>March</td><td>18-19*</td></tr>
        <tr><td>December</td><td>9-10</td></tr></table>
        <h4>2026 FOMC Meetings</h4>
        <table><tr><td>January</td><td>27-28</td></tr></table>
    "#;

    #[test]
    fn test_parse_calendar_blocks() {
        let meetings = parse_calendar(PAGE, &[2025, 2026]);
        assert_eq!(meetings.len(), 4);
        assert_eq!(
            meetings[0],
            FomcMeeting {
                year: 2025,
                month: 1,
                start_day: 28,
                end_day: 29
            }
        );
        assert_eq!(meetings[3].year, 2026);
        assert_eq!(meetings[3].month, 1);
    }

    #[test]
    fn test_year_block_isolation() {
        // The 2025 block must not swallow the 2026 January meeting.
        let meetings = parse_calendar(PAGE, &[2025]);
        assert_eq!(meetings.len(), 3);
        assert!(meetings.iter().all(|m| m.year == 2025));
    }

    #[test]
    fn test_markup_between_month_and_days() {
        // Month name and day range live in separate table cells.
        let meetings = parse_calendar("<td>June</td><td>17-18</td> 2025 FOMC Meetings <td>June</td><td>17-18</td>", &[2025]);
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].month, 6);
    }

    #[test]
    fn test_upcoming_meeting_selection() {
        let meetings = parse_calendar(PAGE, &[2025, 2026]);

        let next = upcoming_meeting(&meetings, date(2025, 2, 1)).unwrap();
        assert_eq!((next.year, next.month), (2025, 3));

        // The decision day itself still counts as upcoming.
        let next = upcoming_meeting(&meetings, date(2025, 1, 29)).unwrap();
        assert_eq!((next.year, next.month), (2025, 1));

        // Past the last 2025 meeting, roll into 2026.
        let next = upcoming_meeting(&meetings, date(2025, 12, 11)).unwrap();
        assert_eq!((next.year, next.month), (2026, 1));
    }

    #[test]
    fn test_no_upcoming_meeting() {
        let meetings = parse_calendar(PAGE, &[2025, 2026]);
        assert_eq!(upcoming_meeting(&meetings, date(2027, 1, 1)), None);
    }

    #[test]
    fn test_meeting_derived_dates() {
        let m = FomcMeeting {
            year: 2025,
            month: 1,
            start_day: 28,
            end_day: 29,
        };
        assert_eq!(m.start_date(), Some(date(2025, 1, 28)));
        assert_eq!(m.end_date(), Some(date(2025, 1, 29)));
        assert_eq!(m.effective_from(), Some(date(2025, 1, 30)));

        // Effective date rolls across a month boundary.
        let m = FomcMeeting {
            year: 2025,
            month: 7,
            start_day: 30,
            end_day: 31,
        };
        assert_eq!(m.effective_from(), Some(date(2025, 8, 1)));
    }
}
