//! Date format round-trip rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Passes when the value parses under any of the configured strftime
/// formats and re-formats to an identical string. The round-trip check
/// rejects values a lenient parser would otherwise wave through (e.g. a
/// `2024-1-05` against `%Y-%m-%d`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub formats: Vec<String>,
}

impl DateRule {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn passes(&self, value: &str) -> bool {
        self.formats
            .iter()
            .any(|format| Self::round_trips(value, format))
    }

    // Formatting only ever runs with a format string the value just parsed
    // under, so the DelayedFormat cannot fail to render.
    fn round_trips(value: &str, format: &str) -> bool {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return parsed.format(format).to_string() == value;
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return parsed.format(format).to_string() == value;
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.format(format).to_string() == value;
        }
        if let Ok(parsed) = NaiveTime::parse_from_str(value, format) {
            return parsed.format(format).to_string() == value;
        }
        false
    }
}
