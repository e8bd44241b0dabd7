//! Time parsing and formatting utilities

use crate::error::{EditorError, EditorResult};

/// Parser for the `HH:MM:SS.fraction` timestamps the transcoder prints
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse `HH:MM:SS` with an optional fractional part into seconds.
    ///
    /// The digits after the dot are read as a decimal fraction, so both
    /// `00:00:10.50` and `00:00:10.500000` give 10.5.
    pub fn parse_hms(&self, text: &str) -> EditorResult<f64> {
        let text = text.trim();
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 3 {
            return Err(EditorError::parse(text, "expected HH:MM:SS.fraction"));
        }

        let hours = parse_component(text, parts[0], "hours")?;
        let minutes = parse_component(text, parts[1], "minutes")?;

        let (whole, fraction) = match parts[2].split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (parts[2], ""),
        };
        let seconds = parse_component(text, whole, "seconds")?;
        if minutes >= 60 || seconds >= 60 {
            return Err(EditorError::parse(text, "minutes and seconds must be below 60"));
        }

        let fractional = if fraction.is_empty() {
            0.0
        } else {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(EditorError::parse(text, "fraction must be digits"));
            }
            format!("0.{}", fraction)
                .parse::<f64>()
                .map_err(|e| EditorError::parse(text, e.to_string()))?
        };

        let whole_seconds = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60))
            .and_then(|t| t.checked_add(seconds))
            .ok_or_else(|| EditorError::parse(text, "time value too large"))?;

        Ok(whole_seconds as f64 + fractional)
    }

    /// Format seconds as `HH:MM:SS`, dropping any fraction
    pub fn format_hms(&self, seconds: f64) -> String {
        let total = if seconds.is_finite() && seconds > 0.0 {
            seconds as u64
        } else {
            0
        };
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
}

fn parse_component(text: &str, component: &str, label: &str) -> EditorResult<u64> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EditorError::parse(text, format!("invalid {}", label)));
    }
    component
        .parse::<u64>()
        .map_err(|e| EditorError::parse(text, format!("invalid {}: {}", label, e)))
}
