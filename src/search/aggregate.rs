use crate::search::types::{AggregatedResult, Period, SearchResponse, Track, TrackDetails};
use crate::window::{DATE_FORMAT, Window};
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("search result and window start must not be empty")]
    EmptyInput,
    #[error("invalid window: {0}")]
    InvalidWindow(&'static str),
}

/// Merges relevance-ordered backend rows into a [`SearchResponse`].
///
/// Stations are numbered in order of first appearance and every result
/// carries one play count per station (`0` where the track never aired).
/// Results keep the order in which their track id first appears in `rows`.
/// If a (track, station) pair repeats, the last row wins.
///
/// # Errors
///
/// [`AggregateError::EmptyInput`] if `rows` is empty or `since` is unset,
/// [`AggregateError::InvalidWindow`] if `until` and `week_no` do not describe
/// either a single day or a numbered week.
pub fn aggregate(
    rows: &[Track],
    since: Option<DateTime<Tz>>,
    until: Option<DateTime<Tz>>,
    week_no: Option<u32>,
) -> Result<SearchResponse, AggregateError> {
    let since = since
        .filter(|_| !rows.is_empty())
        .ok_or(AggregateError::EmptyInput)?;
    let period = period_for(since, until, week_no)?;

    let (stations, station_index) = index_stations(rows);
    let results = group_tracks(rows, &station_index, stations.len());

    Ok(SearchResponse {
        stations,
        period,
        results,
    })
}

/// Aggregates `rows` fetched for `window`.
pub fn aggregate_window(rows: &[Track], window: &Window) -> Result<SearchResponse, AggregateError> {
    aggregate(rows, Some(window.since), Some(window.until), window.week_no)
}

/// Picks the response shape for a window: one calendar day, or a numbered week.
pub(crate) fn period_for(
    since: DateTime<Tz>,
    until: Option<DateTime<Tz>>,
    week_no: Option<u32>,
) -> Result<Period, AggregateError> {
    let until = match until {
        Some(until) if until < since => {
            return Err(AggregateError::InvalidWindow("window ends before it begins"));
        }
        Some(until) if until.date_naive() != since.date_naive() => until,
        _ => {
            if week_no.is_some() {
                return Err(AggregateError::InvalidWindow(
                    "a single-day window takes no week number",
                ));
            }
            return Ok(Period::Day {
                date: since.format(DATE_FORMAT).to_string(),
            });
        }
    };

    match week_no {
        Some(week_no) if (1..=53).contains(&week_no) => Ok(Period::Week {
            week_no,
            begin_date: since.format(DATE_FORMAT).to_string(),
            end_date: until.format(DATE_FORMAT).to_string(),
        }),
        _ => Err(AggregateError::InvalidWindow(
            "a multi-day window needs a week number in 1..=53",
        )),
    }
}

/// Assigns each distinct station uri a column, in first-seen order.
fn index_stations(rows: &[Track]) -> (Vec<String>, HashMap<&str, usize>) {
    let mut names = Vec::new();
    let mut index = HashMap::new();

    for row in rows {
        index.entry(row.station.uri.as_str()).or_insert_with(|| {
            names.push(row.station.name.clone());
            names.len() - 1
        });
    }

    (names, index)
}

/// Groups rows by track id. `results` grows in first-seen order, so the
/// position recorded for a track is also its place in the output.
fn group_tracks(
    rows: &[Track],
    station_index: &HashMap<&str, usize>,
    width: usize,
) -> Vec<AggregatedResult> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut results: Vec<AggregatedResult> = Vec::new();

    for row in rows {
        let position = *positions.entry(row.id).or_insert_with(|| {
            results.push(AggregatedResult {
                track: TrackDetails::from(row),
                plays: vec![0; width],
            });
            results.len() - 1
        });

        if let Some(&column) = station_index.get(row.station.uri.as_str()) {
            results[position].plays[column] = row.count;
        }
    }

    results
}
