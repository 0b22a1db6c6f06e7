//! Futures-implied rate interpolation.
//!
//! A fed funds contract settles on the month's *average* overnight
//! rate. With the pre-decision rate known, the post-decision rate is
//! recovered from the day-count weighted blend:
//!
//! `month_avg = (pre_rate * n_pre + post_rate * n_post) / n`

use chrono::{Datelike, NaiveDate};
use common::{Error, ImpliedDistribution, Result};

use crate::bracket::bracket_probs;

/// Futures-implied post-decision rate plus its bracket distribution.
#[derive(Debug, Clone)]
pub struct FuturesImpliedProbs {
    /// Implied overnight rate after the decision takes effect.
    pub implied_post_rate: f64,
    pub probs: ImpliedDistribution,
}

/// Number of calendar days in `(year, month)`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("month must be in 1..=12");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of next month is always valid");
    next.signed_duration_since(first).num_days() as u32
}

/// Solve the day-weighted blend for the post-decision rate.
///
/// `effective_from` is the first date the new rate applies, so
/// `effective_from.day - 1` days of the month accrue at `pre_rate`.
/// An effective date on or before the 1st is valid (the whole month
/// accrues at the new rate); one beyond the month's end leaves no
/// post-decision days and is a configuration error.
pub fn implied_post_decision_rate(
    month_avg_rate: f64,
    pre_rate: f64,
    year: i32,
    month: u32,
    effective_from: NaiveDate,
) -> Result<f64> {
    let n = days_in_month(year, month) as f64;
    let n_pre = (effective_from.day() - 1) as f64;
    let n_post = n - n_pre;
    if n_post <= 0.0 {
        return Err(Error::Config(format!(
            "effective_from {} leaves no post-decision days in {}-{:02}",
            effective_from, year, month
        )));
    }
    Ok((month_avg_rate * n - pre_rate * n_pre) / n_post)
}

/// Full futures pipeline: settlement-implied month average to a
/// three-outcome distribution, with the post-decision rate as an
/// auxiliary output.
pub fn futures_to_distribution(
    month_avg_rate: f64,
    pre_rate_mid: f64,
    year: i32,
    month: u32,
    effective_from: NaiveDate,
    step: f64,
) -> Result<FuturesImpliedProbs> {
    let post = implied_post_decision_rate(month_avg_rate, pre_rate_mid, year, month, effective_from)?;
    Ok(FuturesImpliedProbs {
        implied_post_rate: post,
        probs: bracket_probs(post, pre_rate_mid, step),
    })
}
