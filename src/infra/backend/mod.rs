//! JSON-over-HTTP access to the airplay datastore.

mod client;

pub use client::HttpBackend;
