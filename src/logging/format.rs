//! Line formatting
//!
//! Stateless: turns a level and a rendered message into one line of text.

use std::fmt;

use chrono::{DateTime, Local};

use super::level::LogLevel;

/// Render each value with its debug representation, separated by single spaces
pub fn render_values(values: &[&dyn fmt::Debug]) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a line as `[2026-01-21 14:30:45.123] [info] message\n`
pub fn format_line(timestamp: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_values() {
        let count = 3;
        let rendered = render_values(&[&"loaded", &count, &Some("cfg")]);
        assert_eq!(rendered, r#""loaded" 3 Some("cfg")"#);
    }

    #[test]
    fn test_render_values_empty() {
        assert_eq!(render_values(&[]), "");
    }

    #[test]
    fn test_format_line() {
        let ts = Local.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).unwrap();
        let line = format_line(ts, LogLevel::Warn, "disk nearly full");
        assert_eq!(line, "[2026-01-21 14:30:45.000] [warn] disk nearly full\n");
    }
}
