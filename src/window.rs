//! Calendar windows that bound every airplay query.
//!
//! Day and ISO-8601 week boundaries are computed in an explicit time zone:
//! "a day" and "a week" are meant in the listeners' locale, not in UTC.

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

/// Text format of calendar dates at the API boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Zone used when nothing else is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Vienna;

const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("week {week} of {year} is out of range")]
    OutOfRange { year: i32, week: u32 },
}

/// An inclusive `[since, until]` range in a fixed time zone.
///
/// `week_no` is set when the window was built from an ISO week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub since: DateTime<Tz>,
    pub until: DateTime<Tz>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_no: Option<u32>,
}

impl Window {
    /// Returns `true` if both bounds fall on the same calendar date.
    pub fn is_single_day(&self) -> bool {
        self.since.date_naive() == self.until.date_naive()
    }

    pub fn begin_date(&self) -> String {
        self.since.format(DATE_FORMAT).to_string()
    }

    pub fn end_date(&self) -> String {
        self.until.format(DATE_FORMAT).to_string()
    }
}

/// Builds the window covering `date` (`YYYY-MM-DD`) from 00:00:00 to 23:59:59.
///
/// # Errors
///
/// Returns [`WindowError::InvalidDate`] if `date` is not a calendar date in
/// exactly that form.
pub fn day_window(date: &str, tz: Tz) -> Result<Window, WindowError> {
    let invalid = || WindowError::InvalidDate(date.to_string());
    if !is_iso_date_shape(date) {
        return Err(invalid());
    }
    let day = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;

    Ok(Window {
        since: start_of_day(day, tz),
        until: end_of_day(day, tz),
        week_no: None,
    })
}

/// Builds the window of ISO week `iso_week` of `iso_year`, Monday 00:00:00
/// through Sunday 23:59:59.
///
/// # Errors
///
/// Returns [`WindowError::OutOfRange`] if `iso_week` is outside `1..=53`, or
/// names week 53 of a year that only has 52 weeks.
pub fn week_window(iso_year: i32, iso_week: u32, tz: Tz) -> Result<Window, WindowError> {
    let out_of_range = || WindowError::OutOfRange {
        year: iso_year,
        week: iso_week,
    };

    if !(1..=53).contains(&iso_week) {
        return Err(out_of_range());
    }

    let monday = first_day_of_iso_week(iso_year, iso_week).ok_or_else(out_of_range)?;
    let sunday = monday
        .checked_add_days(Days::new(6))
        .ok_or_else(out_of_range)?;

    Ok(Window {
        since: start_of_day(monday, tz),
        until: end_of_day(sunday, tz),
        week_no: Some(iso_week),
    })
}

/// Builds the window of the ISO week containing `now`, as seen in `tz`.
pub fn current_week(now: DateTime<Utc>, tz: Tz) -> Result<Window, WindowError> {
    let week = now.with_timezone(&tz).iso_week();
    week_window(week.year(), week.week(), tz)
}

/// `chrono` accepts unpadded fields and signed years; only `DDDD-DD-DD` passes here.
fn is_iso_date_shape(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Walks from day zero of `iso_year` (Dec 31 of the year before) back to a
/// Monday, then forward in whole weeks until the ISO year and week match.
fn first_day_of_iso_week(iso_year: i32, iso_week: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(iso_year.checked_sub(1)?, 12, 31)?;

    while date.weekday() != Weekday::Mon {
        date = date.pred_opt()?;
    }

    while date.iso_week().year() < iso_year {
        date = date.checked_add_days(Days::new(7))?;
    }

    while date.iso_week().year() == iso_year && date.iso_week().week() < iso_week {
        date = date.checked_add_days(Days::new(7))?;
    }

    // Stepping past the last week lands in the next ISO year.
    let week = date.iso_week();
    (week.year() == iso_year && week.week() == iso_week).then_some(date)
}

fn start_of_day(day: NaiveDate, tz: Tz) -> DateTime<Tz> {
    localize(tz, day.and_time(NaiveTime::MIN))
}

fn end_of_day(day: NaiveDate, tz: Tz) -> DateTime<Tz> {
    localize(
        tz,
        day.and_time(NaiveTime::MIN) + TimeDelta::seconds(LAST_SECOND_OF_DAY),
    )
}

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earliest instant; times inside a
/// DST gap are moved forward by one hour.
fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&local)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_window_bounds() {
        let window = day_window("2023-03-15", DEFAULT_TIMEZONE).unwrap();

        assert_eq!(window.since.date_naive(), date(2023, 3, 15));
        assert_eq!(window.since.time(), NaiveTime::MIN);
        assert_eq!(window.until.date_naive(), date(2023, 3, 15));
        assert_eq!(
            (window.until.hour(), window.until.minute(), window.until.second()),
            (23, 59, 59)
        );
        assert_eq!(window.until.nanosecond(), 0);
        assert_eq!(window.week_no, None);
        assert!(window.is_single_day());
    }

    #[test]
    fn test_day_window_uses_zone_not_utc() {
        let window = day_window("2023-03-15", DEFAULT_TIMEZONE).unwrap();
        // Vienna is UTC+1 in March before the switch to summer time
        assert_eq!(window.since.offset().fix().local_minus_utc(), 3600);
        assert_eq!(
            window.since.with_timezone(&Utc).to_rfc3339(),
            "2023-03-14T23:00:00+00:00"
        );
    }

    #[test]
    fn test_day_window_across_dst_switch() {
        let window = day_window("2023-03-26", DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.since.offset().fix().local_minus_utc(), 3600);
        assert_eq!(window.until.offset().fix().local_minus_utc(), 7200);
    }

    #[test]
    fn test_day_window_invalid_date() {
        assert_eq!(
            day_window("2023-02-30", DEFAULT_TIMEZONE),
            Err(WindowError::InvalidDate("2023-02-30".to_string()))
        );
        assert!(day_window("yesterday", DEFAULT_TIMEZONE).is_err());
        assert!(day_window("", DEFAULT_TIMEZONE).is_err());
    }

    #[test]
    fn test_day_window_requires_padded_four_digit_year() {
        for text in [
            "2023-3-5",
            "2023-03-5",
            " 2023-03-15",
            "2023-03-15 ",
            "+262142-12-31",
            "-262143-01-01",
            "20230315",
            "2023/03/15",
        ] {
            assert_eq!(
                day_window(text, DEFAULT_TIMEZONE),
                Err(WindowError::InvalidDate(text.to_string())),
                "{text:?} should be rejected"
            );
        }
        assert!(day_window("0999-01-01", DEFAULT_TIMEZONE).is_ok());
    }

    #[test]
    fn test_week_window_year_rollover() {
        let window = week_window(2016, 1, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.since.date_naive(), date(2016, 1, 4));
        assert_eq!(window.since.weekday(), Weekday::Mon);
        assert_eq!(window.until.date_naive(), date(2016, 1, 10));
        assert_eq!(window.until.weekday(), Weekday::Sun);
        assert_eq!(window.week_no, Some(1));
        assert_eq!(window.begin_date(), "2016-01-04");
        assert_eq!(window.end_date(), "2016-01-10");
        assert!(!window.is_single_day());
    }

    #[test]
    fn test_week_one_starting_in_previous_year() {
        // 2020-W01 begins on Monday 2019-12-30
        let window = week_window(2020, 1, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.since.date_naive(), date(2019, 12, 30));
        assert_eq!(window.until.date_naive(), date(2020, 1, 5));
    }

    #[test]
    fn test_week_53() {
        let window = week_window(2020, 53, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.since.date_naive(), date(2020, 12, 28));
        assert_eq!(window.until.date_naive(), date(2021, 1, 3));

        assert_eq!(
            week_window(2021, 53, DEFAULT_TIMEZONE),
            Err(WindowError::OutOfRange {
                year: 2021,
                week: 53
            })
        );
    }

    #[test]
    fn test_week_out_of_range() {
        assert_eq!(
            week_window(2023, 54, DEFAULT_TIMEZONE),
            Err(WindowError::OutOfRange {
                year: 2023,
                week: 54
            })
        );
        assert!(week_window(2023, 0, DEFAULT_TIMEZONE).is_err());
    }

    #[test]
    fn test_every_week_round_trips_through_iso_calendar() {
        for year in 1995..=2040 {
            // Dec 28 always falls into the last ISO week of its year
            let weeks = date(year, 12, 28).iso_week().week();
            for week in 1..=weeks {
                let window = week_window(year, week, DEFAULT_TIMEZONE).unwrap();
                let monday = window.since.date_naive();

                assert_eq!(monday.weekday(), Weekday::Mon);
                assert_eq!(monday.iso_week().year(), year);
                assert_eq!(monday.iso_week().week(), week);
                assert_eq!(window.until.weekday(), Weekday::Sun);
                assert_eq!(
                    window.until.date_naive() - monday,
                    TimeDelta::days(6)
                );
            }
            assert!(week_window(year, weeks + 1, DEFAULT_TIMEZONE).is_err());
        }
    }

    #[test]
    fn test_current_week_contains_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let window = current_week(now, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.week_no, Some(1));
        assert!(window.since <= now && now <= window.until);
    }

    #[test]
    fn test_current_week_uses_local_date() {
        // Sunday 23:30 UTC is already Monday in Vienna
        let now = Utc.with_ymd_and_hms(2024, 1, 7, 23, 30, 0).unwrap();
        let window = current_week(now, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.week_no, Some(2));
        assert_eq!(window.since.date_naive(), date(2024, 1, 8));
    }
}
