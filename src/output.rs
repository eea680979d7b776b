//! Output formatting and persistence for query results.
//!
//! Supports pretty-printing, JSON serialization, and CSV dumps of raw rows.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::TrackRecord;
use crate::search::Track;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Serializes `value` as pretty JSON to `path`, or to stdout if no path is given.
pub fn write_json(path: Option<&str>, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match path {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {path}"))?;
            info!(path, "Wrote JSON output");
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Appends rows to a CSV file in the flat `TrackRecord` layout.
///
/// Creates the file with headers if it does not already exist.
pub fn append_rows(path: &str, rows: &[Track]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(TrackRecord::from(row))?;
    }
    writer.flush()?;

    Ok(())
}
