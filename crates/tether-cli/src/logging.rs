//! Logging and tracing setup for tetherd
//!
//! Diagnostics go to stderr (and optionally a daily-rotated JSON file) so
//! that stdout carries only the timestamped error lines of the error sink.
//! `RUST_LOG` overrides the configured filter; `--log-filter` overrides both.

use std::io::IsTerminal;
use std::path::PathBuf;

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// `[logging]` section of the daemon config
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directives
    pub filter: String,

    /// Human-readable output on stderr
    pub console: bool,

    /// JSON output to a daily-rotated file under `log_dir`
    pub json_file: bool,

    /// Directory for the JSON log files
    pub log_dir: PathBuf,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Whether to log span open/close (e.g. per driver statement)
    pub spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tether_connection=info,tether_driver_mysql=info,tetherd=info"
                .to_string(),
            console: true,
            json_file: false,
            log_dir: log_directory(),
            include_location: cfg!(debug_assertions),
            spans: false,
        }
    }
}

/// Pick the filter: command line, then `RUST_LOG`, then the config file.
fn resolve_filter(cli: Option<&str>, env: Option<String>, configured: &str) -> String {
    cli.map(str::to_string)
        .or(env.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| configured.to_string())
}

/// Install the global subscriber.
///
/// The returned guard flushes the JSON writer on drop and must be kept alive
/// for as long as the process logs.
pub fn init(config: &LoggingConfig, cli_filter: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let directives = resolve_filter(
        cli_filter,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        &config.filter,
    );
    let env_filter = EnvFilter::try_new(&directives)?;

    let span_events = if config.spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.console {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_ansi(std::io::stderr().is_terminal())
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if config.json_file {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "tetherd.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        filter = %directives,
        json_enabled = config.json_file,
        log_dir = %config.log_dir.display(),
        "logging initialized"
    );

    Ok(guard)
}

/// Default directory for JSON log files
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tether")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert!(config.console);
        assert!(!config.json_file);
        assert!(config.filter.starts_with("info"));
    }

    #[test]
    fn test_logging_config_from_toml() {
        let config: LoggingConfig = toml::from_str(
            r#"
            filter = "debug"
            json_file = true
            log_dir = "/var/log/tether"
            "#,
        )
        .unwrap();

        assert_eq!(config.filter, "debug");
        assert!(config.json_file);
        assert!(config.console);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/tether"));
    }

    #[test]
    fn test_filter_precedence() {
        assert_eq!(
            resolve_filter(Some("trace"), Some("debug".into()), "info"),
            "trace"
        );
        assert_eq!(resolve_filter(None, Some("debug".into()), "info"), "debug");
        assert_eq!(resolve_filter(None, Some("  ".into()), "info"), "info");
        assert_eq!(resolve_filter(None, None, "info"), "info");
    }
}
