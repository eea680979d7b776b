//! Search result aggregation and station listings.
//!
//! The backend answers a search with one row per track and station, ranked
//! by relevance. This module folds those rows into one entry per track with
//! a play count per station, without disturbing the ranking.

pub mod aggregate;
pub mod station;
pub mod types;

pub use aggregate::{AggregateError, aggregate, aggregate_window};
pub use station::station_tracks;
pub use types::{
    AggregatedResult, Period, SearchResponse, Station, StationTracksResponse, Track,
    TrackDetails, TrackFilter,
};
