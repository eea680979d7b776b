use crate::search::aggregate::{AggregateError, period_for};
use crate::search::types::{StationTracksResponse, Track};
use crate::window::Window;

/// Wraps one station's backend listing with the period it covers.
///
/// The listing is passed through as-is; an empty list is a valid answer.
pub fn station_tracks(
    station: &str,
    plays: Vec<Track>,
    window: &Window,
) -> Result<StationTracksResponse, AggregateError> {
    let period = period_for(window.since, Some(window.until), window.week_no)?;

    Ok(StationTracksResponse {
        station: station.to_string(),
        period,
        plays,
    })
}
