//! Sensor series types and timestamp handling.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Timestamp layouts accepted in raw exports, tried in order.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Layout used when writing timestamps back out.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a timestamp in any accepted layout. A bare date reads as midnight.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(timestamp) = date.and_hms_opt(0, 0, 0) {
            return Ok(timestamp);
        }
    }
    Err(DataError::InvalidTimestamp(trimmed.to_string()))
}

/// One timestamped force observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Chronologically ordered readings for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSeries {
    sensor_id: String,
    readings: Vec<Reading>,
}

impl SensorSeries {
    /// Builds a series, sorting the readings by timestamp. The sort is
    /// stable, so readings sharing a timestamp keep their input order.
    pub fn from_readings(sensor_id: &str, mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self {
            sensor_id: sensor_id.to_string(),
            readings,
        }
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Force values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    /// Index of the first reading at exactly `timestamp`.
    pub fn position(&self, timestamp: NaiveDateTime) -> Option<usize> {
        self.readings.iter().position(|r| r.timestamp == timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn test_parse_full_timestamp() {
        let parsed = parse_timestamp("2021-03-05 14:30:00").unwrap();
        assert_eq!(parsed.format(TIMESTAMP_OUTPUT_FORMAT).to_string(), "2021-03-05 14:30:00");
    }

    #[test]
    fn test_parse_iso_separator() {
        assert_eq!(ts("2021-03-05T14:30:00"), ts("2021-03-05 14:30:00"));
    }

    #[test]
    fn test_parse_without_seconds() {
        assert_eq!(ts("2021-03-05 14:30"), ts("2021-03-05 14:30:00"));
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        assert_eq!(ts("2021-03-05"), ts("2021-03-05 00:00:00"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(ts("  2021-03-05 14:30:00 "), ts("2021-03-05 14:30:00"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("not a date"),
            Err(DataError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_series_sorts_by_timestamp() {
        let readings = vec![
            Reading { timestamp: ts("2021-01-03"), value: 3.0 },
            Reading { timestamp: ts("2021-01-01"), value: 1.0 },
            Reading { timestamp: ts("2021-01-02"), value: 2.0 },
        ];
        let series = SensorSeries::from_readings("SLS01", readings);
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let readings = vec![
            Reading { timestamp: ts("2021-01-02"), value: 20.0 },
            Reading { timestamp: ts("2021-01-01"), value: 1.0 },
            Reading { timestamp: ts("2021-01-02"), value: 21.0 },
            Reading { timestamp: ts("2021-01-02"), value: 22.0 },
        ];
        let series = SensorSeries::from_readings("SLS01", readings);
        assert_eq!(series.values(), vec![1.0, 20.0, 21.0, 22.0]);
    }

    #[test]
    fn test_position_finds_first_match() {
        let readings = vec![
            Reading { timestamp: ts("2021-01-01"), value: 1.0 },
            Reading { timestamp: ts("2021-01-02"), value: 2.0 },
            Reading { timestamp: ts("2021-01-02"), value: 3.0 },
        ];
        let series = SensorSeries::from_readings("SLS01", readings);
        assert_eq!(series.position(ts("2021-01-02")), Some(1));
        assert_eq!(series.position(ts("2021-01-09")), None);
    }
}
