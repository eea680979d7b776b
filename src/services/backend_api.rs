//! Trait for the datastore that records what each station played.

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use radio_airplay::search::{Station, Track, TrackFilter};

/// Abstraction over the airplay datastore and its search engine.
///
/// Track lists come back in the backend's own order (play count for station
/// listings, relevance for searches) and may hold one row per track and
/// station.
#[async_trait::async_trait]
pub trait AirplayBackend: Send + Sync {
    /// Returns all stations the backend records.
    async fn list_stations(&self) -> Result<Vec<Station>>;

    /// Returns `true` if `station` names a known station.
    async fn station_exists(&self, station: &str) -> Result<bool>;

    /// Returns the tracks `station` played between `since` and `until`.
    async fn station_tracks(
        &self,
        station: &str,
        since: DateTime<Tz>,
        until: DateTime<Tz>,
        filter: TrackFilter,
    ) -> Result<Vec<Track>>;

    /// Full-text search over all stations between `since` and `until`.
    async fn search(
        &self,
        query: &str,
        since: DateTime<Tz>,
        until: DateTime<Tz>,
    ) -> Result<Vec<Track>>;
}
