//! Decoding of backend rows from JSON or CSV.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::search::{Station, Track};

/// Flat CSV form of a [`Track`] row.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub station_name: String,
    pub station_uri: String,
    pub count: u32,
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        Track {
            id: record.id,
            title: record.title,
            artist: record.artist,
            station: Station {
                name: record.station_name,
                uri: record.station_uri,
            },
            count: record.count,
        }
    }
}

impl From<&Track> for TrackRecord {
    fn from(track: &Track) -> Self {
        TrackRecord {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist.clone(),
            station_name: track.station.name.clone(),
            station_uri: track.station.uri.clone(),
            count: track.count,
        }
    }
}

/// Decodes a JSON array of rows.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON array of tracks.
pub fn parse_rows_json(bytes: &[u8]) -> Result<Vec<Track>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes CSV rows with a `id,title,artist,station_name,station_uri,count` header.
pub fn parse_rows_csv<R: Read>(reader: R) -> Result<Vec<Track>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: TrackRecord = result?;
        rows.push(record.into());
    }

    Ok(rows)
}

/// Loads rows from a file; `.csv` files are read as CSV, anything else as JSON.
pub fn load_rows(path: &str) -> Result<Vec<Track>> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read rows from {path}"))?;
    let rows = if is_csv {
        parse_rows_csv(bytes.as_slice())
    } else {
        parse_rows_json(&bytes)
    };

    rows.with_context(|| format!("Failed to parse rows from {path}"))
}
