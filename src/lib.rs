//! Historical radio airplay queries.
//!
//! [`window`] computes the day and ISO-week ranges that bound each query;
//! [`search`] turns the backend's per-station rows into API responses.

pub mod config;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod search;
pub mod window;
