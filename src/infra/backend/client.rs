use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use radio_airplay::fetch::{HttpClient, ensure_success, fetch_json, get};
use radio_airplay::search::{Station, Track, TrackFilter};
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::services::backend_api::AirplayBackend;

/// [`AirplayBackend`] served by a JSON HTTP API below `base_url`:
///
/// - `GET stations`
/// - `GET stations/{station}`
/// - `GET stations/{station}/tracks?since&until&filter`
/// - `GET search?q&since&until`
///
/// Timestamps are sent as RFC 3339.
pub struct HttpBackend<C> {
    base_url: Url,
    client: C,
}

impl<C: HttpClient> HttpBackend<C> {
    pub fn new(base_url: &str, client: C) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Backend URL '{base_url}' cannot be a base"));
        }

        Ok(Self { base_url, client })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn stations_url(&self) -> Url {
        self.endpoint(&["stations"])
    }

    fn station_url(&self, station: &str) -> Url {
        self.endpoint(&["stations", station])
    }

    fn tracks_url(
        &self,
        station: &str,
        since: DateTime<Tz>,
        until: DateTime<Tz>,
        filter: TrackFilter,
    ) -> Url {
        let mut url = self.endpoint(&["stations", station, "tracks"]);
        url.query_pairs_mut()
            .append_pair("since", &since.to_rfc3339())
            .append_pair("until", &until.to_rfc3339())
            .append_pair("filter", filter.as_str());
        url
    }

    fn search_url(&self, query: &str, since: DateTime<Tz>, until: DateTime<Tz>) -> Url {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("since", &since.to_rfc3339())
            .append_pair("until", &until.to_rfc3339());
        url
    }
}

#[async_trait]
impl<C: HttpClient> AirplayBackend for HttpBackend<C> {
    #[tracing::instrument(skip(self))]
    async fn list_stations(&self) -> Result<Vec<Station>> {
        fetch_json(&self.client, self.stations_url()).await
    }

    #[tracing::instrument(skip(self))]
    async fn station_exists(&self, station: &str) -> Result<bool> {
        let resp = get(&self.client, self.station_url(station)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("Station not found");
            return Ok(false);
        }

        ensure_success(resp).await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn station_tracks(
        &self,
        station: &str,
        since: DateTime<Tz>,
        until: DateTime<Tz>,
        filter: TrackFilter,
    ) -> Result<Vec<Track>> {
        fetch_json(&self.client, self.tracks_url(station, since, until, filter)).await
    }

    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        since: DateTime<Tz>,
        until: DateTime<Tz>,
    ) -> Result<Vec<Track>> {
        fetch_json(&self.client, self.search_url(query, since, until)).await
    }
}
