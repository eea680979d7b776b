//! Query flows combining a backend call with window and aggregation logic.

use anyhow::{Result, bail};
use radio_airplay::search::{
    AggregateError, SearchResponse, StationTracksResponse, Track, TrackFilter, aggregate_window,
    station_tracks,
};
use radio_airplay::window::Window;
use tracing::{debug, info, warn};

use crate::services::backend_api::AirplayBackend;

/// Raw backend rows together with the response built from them.
#[derive(Debug)]
pub struct SearchOutcome {
    pub rows: Vec<Track>,
    pub response: SearchResponse,
}

/// Searches all stations within `window` and aggregates the hits.
///
/// Returns `None` if nothing matched.
#[tracing::instrument(skip(backend, window), fields(since = %window.since, until = %window.until))]
pub async fn search_airplay(
    backend: &dyn AirplayBackend,
    query: &str,
    window: &Window,
) -> Result<Option<SearchOutcome>> {
    let rows = backend.search(query, window.since, window.until).await?;
    debug!(rows = rows.len(), "Search rows received");

    match aggregate_window(&rows, window) {
        Ok(response) => {
            info!(
                stations = response.stations.len(),
                tracks = response.results.len(),
                "Search aggregated"
            );
            Ok(Some(SearchOutcome { rows, response }))
        }
        Err(AggregateError::EmptyInput) => {
            warn!("No tracks matched");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Lists what `station` played within `window`.
///
/// # Errors
///
/// Fails if the backend does not know `station`.
#[tracing::instrument(skip(backend, window), fields(since = %window.since, until = %window.until))]
pub async fn station_airplay(
    backend: &dyn AirplayBackend,
    station: &str,
    window: &Window,
    filter: TrackFilter,
) -> Result<StationTracksResponse> {
    if !backend.station_exists(station).await? {
        bail!("Unknown station '{station}'");
    }

    let plays = backend
        .station_tracks(station, window.since, window.until, filter)
        .await?;
    info!(tracks = plays.len(), "Station tracks received");

    Ok(station_tracks(station, plays, window)?)
}
