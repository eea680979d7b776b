//! Data types exchanged with the backend and returned to API callers.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A radio station. `uri` is the identity key, `name` is for display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub uri: String,
}

/// One backend row: how often a track aired on one station within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub station: Station,
    pub count: u32,
}

/// Display fields of a track once its per-station rows have been merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackDetails {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

impl From<&Track> for TrackDetails {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// A deduplicated track with its play counts, one slot per station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    pub track: TrackDetails,
    pub plays: Vec<u32>,
}

/// The period a response covers: a single day or a whole ISO week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Period {
    Day {
        date: String,
    },
    #[serde(rename_all = "camelCase")]
    Week {
        week_no: u32,
        begin_date: String,
        end_date: String,
    },
}

/// Search results across all stations for one period.
///
/// `stations[i]` names the station counted in `plays[i]` of every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub stations: Vec<String>,
    #[serde(flatten)]
    pub period: Period,
    pub results: Vec<AggregatedResult>,
}

/// Tracks played on one station during one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationTracksResponse {
    pub station: String,
    #[serde(flatten)]
    pub period: Period,
    pub plays: Vec<Track>,
}

/// Which of a station's tracks the backend should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackFilter {
    /// Only the most played tracks.
    Top,
    #[default]
    All,
}

impl TrackFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackFilter::Top => "top",
            TrackFilter::All => "all",
        }
    }
}

impl FromStr for TrackFilter {
    type Err = Infallible;

    /// Anything but `top` selects all tracks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "top" {
            TrackFilter::Top
        } else {
            TrackFilter::All
        })
    }
}

impl fmt::Display for TrackFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_day_period_serializes_date_only() {
        let response = SearchResponse {
            stations: vec!["Ö3".to_string()],
            period: Period::Day {
                date: "2023-03-15".to_string(),
            },
            results: vec![],
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "stations": ["Ö3"], "date": "2023-03-15", "results": [] })
        );
    }

    #[test]
    fn test_week_period_uses_camel_case() {
        let response = SearchResponse {
            stations: vec![],
            period: Period::Week {
                week_no: 1,
                begin_date: "2016-01-04".to_string(),
                end_date: "2016-01-10".to_string(),
            },
            results: vec![AggregatedResult {
                track: TrackDetails {
                    id: 7,
                    title: "Jump".to_string(),
                    artist: "Van Halen".to_string(),
                },
                plays: vec![2],
            }],
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "stations": [],
                "weekNo": 1,
                "beginDate": "2016-01-04",
                "endDate": "2016-01-10",
                "results": [
                    { "track": { "id": 7, "title": "Jump", "artist": "Van Halen" }, "plays": [2] }
                ]
            })
        );
    }

    #[test]
    fn test_track_filter_parsing() {
        assert_eq!("top".parse::<TrackFilter>().unwrap(), TrackFilter::Top);
        assert_eq!("TOP".parse::<TrackFilter>().unwrap(), TrackFilter::All);
        assert_eq!("all".parse::<TrackFilter>().unwrap(), TrackFilter::All);
        assert_eq!("whatever".parse::<TrackFilter>().unwrap(), TrackFilter::All);
        assert_eq!(TrackFilter::Top.to_string(), "top");
    }
}
