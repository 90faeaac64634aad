//! Locations and time values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::wire::format_number;

/// Immutable latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    latitude: f64,
    longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Wire form `lat|lon`
    pub fn to_wire(&self) -> String {
        format!(
            "{}|{}",
            format_number(self.latitude),
            format_number(self.longitude)
        )
    }
}

/// Parse a date (`YYYY-MM-DD`) into midnight of that day
pub fn parse_date(value: &str) -> Result<NaiveDateTime, ModelError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ModelError::InvalidTime(value.to_string()))
}

/// Parse an ISO-8601 local date-time
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]` with an optional `Z` or `±HH:MM`
/// suffix, and a bare date. Offsets are dropped; the local clock time is kept.
pub fn parse_time(value: &str) -> Result<NaiveDateTime, ModelError> {
    let text = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }
    if let Some(local) = text.strip_suffix('Z') {
        if let Ok(dt) = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(dt);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
    {
        return Ok(dt);
    }
    parse_date(text).map_err(|_| ModelError::InvalidTime(value.to_string()))
}

/// Start and end time strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Both ends parse and start is not after end
    pub fn is_valid(&self) -> bool {
        match (parse_time(&self.start), parse_time(&self.end)) {
            (Ok(start), Ok(end)) => start <= end,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_latlon_range() {
        assert!(LatLon::new(53.5, -113.5).is_valid());
        assert!(LatLon::new(-90.0, 180.0).is_valid());
        assert!(!LatLon::new(90.5, 0.0).is_valid());
        assert!(!LatLon::new(0.0, -181.0).is_valid());
        assert_eq!(LatLon::new(53.5, -113.0).to_wire(), "53.5|-113");
    }

    #[test]
    fn test_parse_time_forms() {
        let plain = parse_time("2024-06-01T13:00:00").unwrap();
        assert_eq!(parse_time("2024-06-01T13:00:00Z").unwrap(), plain);
        assert_eq!(parse_time("2024-06-01T13:00:00-06:00").unwrap(), plain);
        assert_eq!(parse_time("2024-06-01T13:00").unwrap(), plain);
        assert!(parse_time("2024-06-01T13:00:00.250").is_ok());
        assert!(parse_time("2024-06-01").is_ok());
        assert!(parse_time("June 1st").is_err());
    }

    #[test]
    fn test_parse_date_strict() {
        assert!(parse_date("2024-06-01").is_ok());
        assert!(parse_date("2024-06-01T00:00:00").is_err());
    }

    #[test]
    fn test_time_range() {
        assert!(TimeRange::new("2024-06-01T10:00:00", "2024-06-01T10:00:00").is_valid());
        assert!(!TimeRange::new("2024-06-02T10:00:00", "2024-06-01T10:00:00").is_valid());
        assert!(!TimeRange::new("bad", "2024-06-01T10:00:00").is_valid());
    }
}
