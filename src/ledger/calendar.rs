use crate::Error;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;

/// Count the whole calendar months between two timestamps.
///
/// Partial months are truncated toward zero, and the count is negative when
/// `to` precedes `from`. `to` is moved back by the calendar month difference
/// and the last month only counts if that lands at or after `from`. Moving a
/// date doesn't clamp it: days past the end of the target month carry into
/// the next one, so March 31st moved back one month is March 2nd or 3rd.
///
/// Two month-end rules apply on top:
/// - the end of February (28th or later) is moved as if it were the 30th;
/// - a single month is complete when `to` is the last day of its month, so
///   January 31st to February 28th counts one month.
pub fn whole_months_between(from: NaiveDateTime, to: NaiveDateTime) -> Result<i32, Error> {
    let sign = match to.cmp(&from) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => return Ok(0),
    };

    let difference = ((to.year() - from.year()) * 12
        + (to.month() as i32 - from.month() as i32))
        .abs();
    if difference == 0 {
        return Ok(0);
    }

    let anchor = if to.month() == 2 && to.day() > 27 {
        rolled(to.year(), 2, 30, to.time())
    } else {
        Some(to)
    };
    let shifted = anchor
        .and_then(|anchor| {
            rolled(
                anchor.year(),
                anchor.month() as i32 - sign * difference,
                anchor.day(),
                anchor.time(),
            )
        })
        .ok_or(Error::Overflow("elapsed months"))?;

    let mut last_month_incomplete = match sign {
        1 => shifted < from,
        _ => shifted > from,
    };
    if difference == 1 && sign == 1 && is_last_day_of_month(to) {
        last_month_incomplete = false;
    }

    Ok(sign * (difference - i32::from(last_month_incomplete)))
}

/// Build a timestamp leniently: months outside 1..=12 carry into the year, and
/// days past the end of the month carry into the next month.
fn rolled(year: i32, month: i32, day: u32, time: NaiveTime) -> Option<NaiveDateTime> {
    let year = year.checked_add((month - 1).div_euclid(12))?;
    let month = u32::try_from((month - 1).rem_euclid(12) + 1).ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .map(|date| date.and_time(time))
}

fn is_last_day_of_month(timestamp: NaiveDateTime) -> bool {
    timestamp
        .date()
        .succ_opt()
        .map_or(true, |next| next.month() != timestamp.month())
}

// Accepted timestamp layouts, tried in order after RFC 3339.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an effective date as supplied by a caller.
///
/// RFC 3339 timestamps carrying an offset are converted to UTC. Timestamps
/// without an offset, including the `datetime-local` layout `YYYY-MM-DDTHH:MM`,
/// are taken as is, and a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, Error> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.naive_utc());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(timestamp);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::default()))
        .map_err(|_| Error::InvalidInput(format!("malformed date `{raw}`")))
}
