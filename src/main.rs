//! CLI entry point for radio airplay queries.
//!
//! Computes day and ISO-week windows, lists stations and their tracks, and
//! searches all stations through the airplay backend.

mod infra;
mod services;

use crate::infra::backend::HttpBackend;
use crate::services::backend_api::AirplayBackend;
use crate::services::queries::{search_airplay, station_airplay};
use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use radio_airplay::config::{Settings, log_file_path, parse_timezone};
use radio_airplay::fetch::auth::ApiKey;
use radio_airplay::fetch::{BasicClient, HttpClient};
use radio_airplay::output::{append_rows, print_pretty, write_json};
use radio_airplay::parser::load_rows;
use radio_airplay::search::{TrackFilter, aggregate_window};
use radio_airplay::window::{Window, current_week, day_window, week_window};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "radio-airplay")]
#[command(about = "Query historical radio airplay by day or ISO week", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Base URL of the airplay backend (overrides RADIO_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// IANA time zone for day and week boundaries (overrides RADIO_TIMEZONE)
    #[arg(long, global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Selects a single day or an ISO week; defaults to the current week.
#[derive(Args)]
struct PeriodArgs {
    /// Single day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["year", "week"])]
    date: Option<String>,

    /// ISO year
    #[arg(long, requires = "week")]
    year: Option<i32>,

    /// ISO week number (1-53)
    #[arg(long, requires = "year")]
    week: Option<u32>,
}

impl PeriodArgs {
    fn window(&self, tz: Tz) -> Result<Window> {
        let window = match (&self.date, self.year, self.week) {
            (Some(date), _, _) => day_window(date, tz)?,
            (None, Some(year), Some(week)) => week_window(year, week, tz)?,
            _ => current_week(Utc::now(), tz)?,
        };
        print_pretty(&window);
        Ok(window)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the window covering one day
    DayWindow {
        #[arg(value_name = "DATE")]
        date: String,
    },
    /// Print the window covering an ISO week
    WeekWindow {
        #[arg(value_name = "YEAR")]
        year: i32,

        #[arg(value_name = "WEEK")]
        week: u32,
    },
    /// Aggregate a saved row file (JSON, or CSV by extension)
    Aggregate {
        #[arg(value_name = "ROWS_FILE")]
        rows: String,

        #[command(flatten)]
        period: PeriodArgs,

        /// Write the response to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the stations known to the backend
    Stations {
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List what a station played during a day or week
    Tracks {
        #[arg(value_name = "STATION")]
        station: String,

        #[command(flatten)]
        period: PeriodArgs,

        /// `top` for the most played tracks only, anything else for all
        #[arg(short, long, default_value = "all")]
        filter: TrackFilter,

        #[arg(short, long)]
        output: Option<String>,
    },
    /// Search all stations for a day or week
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        #[command(flatten)]
        period: PeriodArgs,

        /// Also append the raw backend rows to this CSV file
        #[arg(long)]
        dump_rows: Option<String>,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let _file_guard = init_logging(&log_file_path(|key| std::env::var(key).ok()));

    if let Err(e) = run(cli).await {
        error!("Command failed: {e:#}");
        return Err(e);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }
    if let Some(name) = cli.timezone.as_deref() {
        settings.timezone = parse_timezone(name)?;
    }

    let tz = settings.timezone;

    match cli.command {
        Commands::DayWindow { date } => {
            write_json(None, &day_window(&date, tz)?)?;
        }
        Commands::WeekWindow { year, week } => {
            write_json(None, &week_window(year, week, tz)?)?;
        }
        Commands::Aggregate {
            rows,
            period,
            output,
        } => {
            let window = period.window(tz)?;
            let rows = load_rows(&rows)?;
            info!(rows = rows.len(), "Rows loaded");

            let response = aggregate_window(&rows, &window)?;
            write_json(output.as_deref(), &response)?;
        }
        Commands::Stations { output } => {
            let backend = connect(&settings)?;
            let stations = backend.list_stations().await?;
            info!(total = stations.len(), "Station list fetched");

            write_json(output.as_deref(), &stations)?;
        }
        Commands::Tracks {
            station,
            period,
            filter,
            output,
        } => {
            let window = period.window(tz)?;
            let backend = connect(&settings)?;

            let response = station_airplay(&backend, &station, &window, filter).await?;
            write_json(output.as_deref(), &response)?;
        }
        Commands::Search {
            query,
            period,
            dump_rows,
            output,
        } => {
            let window = period.window(tz)?;
            let backend = connect(&settings)?;

            if let Some(outcome) = search_airplay(&backend, &query, &window).await? {
                if let Some(path) = dump_rows.as_deref() {
                    append_rows(path, &outcome.rows)?;
                    info!(path, rows = outcome.rows.len(), "Raw rows saved");
                }
                write_json(output.as_deref(), &outcome.response)?;
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(log_file_path: &str) -> WorkerGuard {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("radio_airplay.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

/// Builds the HTTP backend, authenticating with a bearer token if one is set.
fn connect(settings: &Settings) -> Result<HttpBackend<Box<dyn HttpClient>>> {
    let base = BasicClient::new()?;
    let client: Box<dyn HttpClient> = match settings.backend_token.as_deref() {
        Some(token) => Box::new(ApiKey::bearer(base, token)?),
        None => Box::new(base),
    };

    info!(
        backend_url = %settings.backend_url,
        authenticated = settings.backend_token.is_some(),
        "Using airplay backend"
    );
    HttpBackend::new(&settings.backend_url, client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_airplay::window::DEFAULT_TIMEZONE;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_period_args_select_window() {
        let cli = Cli::parse_from(["radio-airplay", "search", "Falco", "--year", "2016", "--week", "1"]);
        let Commands::Search { period, .. } = cli.command else {
            panic!("expected search command");
        };

        let window = period.window(DEFAULT_TIMEZONE).unwrap();
        assert_eq!(window.begin_date(), "2016-01-04");
        assert_eq!(window.week_no, Some(1));
    }

    #[test]
    fn test_date_conflicts_with_week() {
        let result = Cli::try_parse_from([
            "radio-airplay",
            "tracks",
            "oe3",
            "--date",
            "2016-01-04",
            "--year",
            "2016",
            "--week",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_week_requires_year() {
        let result = Cli::try_parse_from(["radio-airplay", "search", "Falco", "--week", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tracks_filter_parsing() {
        let cli = Cli::parse_from(["radio-airplay", "tracks", "oe3", "--filter", "top"]);
        let Commands::Tracks { filter, period, .. } = cli.command else {
            panic!("expected tracks command");
        };
        assert_eq!(filter, TrackFilter::Top);
        // no period given: current week
        assert!(period.window(DEFAULT_TIMEZONE).unwrap().week_no.is_some());
    }
}
