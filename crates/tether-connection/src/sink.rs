//! Console error reporting

use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

/// Destination for the one-line error reports of the resilience layer.
///
/// Reporting is synchronous and best-effort: a sink must never fail or
/// panic back into the caller.
pub trait ErrorSink: Send + Sync {
    fn error(&self, message: &str);
}

/// `[2026-01-01T00:00:00Z] ERROR: message`
pub fn format_error_line(timestamp: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] ERROR: {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        message
    )
}

/// Writes error lines to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn error(&self, message: &str) {
        let line = format_error_line(Utc::now(), message);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_line_format() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 5).unwrap();
        assert_eq!(
            format_error_line(ts, "Maximum retries made (10)"),
            "[2026-03-01T08:30:05Z] ERROR: Maximum retries made (10)"
        );
    }

    #[test]
    fn test_console_sink_does_not_panic() {
        ConsoleSink.error("written during tests");
    }
}
