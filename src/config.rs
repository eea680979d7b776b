//! Runtime settings.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! environment variables. The CLI applies its own flags on top.
//!
//! The log file path is the exception: logging starts before any of this is
//! read, so it only comes from `LOG_FILE_PATH` or the default.
//!
//! ```json
//! {
//!   "backend_url": "https://airplay.example.org/api",
//!   "timezone": "Europe/Vienna"
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::window::DEFAULT_TIMEZONE;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/radio_airplay.log";

/// Settings as they appear in a config file; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsFile {
    pub backend_url: Option<String>,
    pub backend_token: Option<String>,
    pub timezone: Option<String>,
}

impl SettingsFile {
    /// Loads the settings file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config file {path}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub timezone: Tz,
}

impl Settings {
    /// Resolves settings from `file` and the process environment.
    pub fn load(file: Option<&str>) -> Result<Self> {
        let file = match file {
            Some(path) => SettingsFile::load(path)?,
            None => SettingsFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Layers `env` over `file` over the defaults.
    pub fn resolve(file: SettingsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend_url = env("RADIO_BACKEND_URL")
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_token = env("RADIO_BACKEND_TOKEN")
            .or(file.backend_token)
            .filter(|t| !t.is_empty());
        let timezone = match env("RADIO_TIMEZONE").or(file.timezone) {
            Some(name) => parse_timezone(&name)?,
            None => DEFAULT_TIMEZONE,
        };

        Ok(Self {
            backend_url,
            backend_token,
            timezone,
        })
    }
}

/// Path of the JSON log file: `LOG_FILE_PATH`, or the default if unset or empty.
pub fn log_file_path(env: impl Fn(&str) -> Option<String>) -> String {
    env("LOG_FILE_PATH")
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string())
}

/// Parses an IANA zone name such as `Europe/Vienna`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown time zone '{name}': {e}"))
}
