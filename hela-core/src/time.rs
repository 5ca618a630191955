//! Date utilities: timezone-aware "today" and calendar period ranges.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Today's calendar date in an IANA tz like "Africa/Nairobi".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

/// First and last day of the month containing `date`.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Monday through Sunday of the ISO week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as i64;
    let monday = date - Duration::days(offset);
    (monday, monday + Duration::days(6))
}

/// Parse "YYYY-MM" into the month's inclusive date range.
pub fn parse_month(s: &str) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid month '{s}' (expected YYYY-MM): {e}"))?;
    Ok(month_range(first))
}

/// Whole months from `from` until `to`, rounding a partial month up.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() > from.day() {
        months += 1;
    }
    months.max(1) as u32
}
