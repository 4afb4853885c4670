//! Assembly of per-sensor series from raw CSV exports.
//!
//! Raw exports arrive as a directory tree of CSV files, each holding rows
//! for any mixture of sensors. The loader walks the tree, collects one
//! sensor's rows, orders them chronologically and caches the assembled
//! series so later runs skip the scan.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{DataError, Result};
use crate::series::{parse_timestamp, Reading, SensorSeries, TIMESTAMP_OUTPUT_FORMAT};

/// Column positions of a raw export file.
struct RawColumns {
    sensor_id: usize,
    timestamp: usize,
    value: usize,
}

impl RawColumns {
    fn locate(headers: &csv::StringRecord) -> Option<Self> {
        Some(Self {
            sensor_id: headers.iter().position(|h| h == "sensor_id")?,
            timestamp: headers.iter().position(|h| h == "timestamp")?,
            value: headers.iter().position(|h| h == "value")?,
        })
    }
}

/// Loads per-sensor series from a directory of raw exports, with a cache of
/// assembled series.
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl SeriesLoader {
    pub fn new(data_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            data_dir,
            cache_dir,
        }
    }

    /// Location of the cached series for `sensor_id`.
    pub fn cache_path(&self, sensor_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}_sorted.csv", sensor_id))
    }

    /// Loads the series for one sensor.
    ///
    /// Prefers the cache; otherwise scans the raw exports, assembles and
    /// caches the series. A missing data directory or a sensor with no rows
    /// yields an empty series, not an error.
    pub fn load(&self, sensor_id: &str) -> Result<SensorSeries> {
        let cache = self.cache_path(sensor_id);
        if cache.is_file() {
            tracing::debug!("loading sensor {} from {}", sensor_id, cache.display());
            return self.read_cache(sensor_id, &cache);
        }

        let files = self.csv_files()?;
        let mut readings = Vec::new();
        for path in &files {
            self.read_raw_file(path, sensor_id, &mut readings)?;
        }
        let series = SensorSeries::from_readings(sensor_id, readings);
        tracing::info!(
            "assembled {} readings for sensor {} from {} files",
            series.len(),
            sensor_id,
            files.len()
        );
        if !series.is_empty() {
            self.write_cache(&series)?;
        }
        Ok(series)
    }

    /// Distinct sensor ids across all raw exports, in order of first
    /// appearance over the sorted file list.
    pub fn sensor_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for path in self.csv_files()? {
            let file = File::open(&path)?;
            let mut reader = csv::Reader::from_reader(BufReader::new(file));
            let headers = reader.headers()?.clone();
            let columns = match RawColumns::locate(&headers) {
                Some(columns) => columns,
                None => continue,
            };
            for result in reader.records() {
                let record = result?;
                if let Some(id) = record.get(columns.sensor_id) {
                    if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                        ids.push(id.to_string());
                    }
                }
            }
        }
        Ok(ids)
    }

    /// All CSV files under the data directory, sorted by path.
    fn csv_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if self.data_dir.is_dir() {
            collect_csv_files(&self.data_dir, &mut files)?;
        }
        files.sort();
        Ok(files)
    }

    fn read_raw_file(
        &self,
        path: &Path,
        sensor_id: &str,
        readings: &mut Vec<Reading>,
    ) -> Result<()> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let headers = reader.headers()?.clone();
        let columns = match RawColumns::locate(&headers) {
            Some(columns) => columns,
            None => {
                tracing::warn!(
                    "skipping {}: no sensor_id/timestamp/value columns",
                    path.display()
                );
                return Ok(());
            }
        };

        for result in reader.records() {
            let record = result?;
            if record.get(columns.sensor_id) != Some(sensor_id) {
                continue;
            }
            let timestamp = match record.get(columns.timestamp).map(parse_timestamp) {
                Some(Ok(timestamp)) => timestamp,
                _ => {
                    tracing::debug!("skipping row with bad timestamp in {}", path.display());
                    continue;
                }
            };
            let parsed = record
                .get(columns.value)
                .and_then(|v| v.trim().parse::<f64>().ok());
            let value = match parsed {
                Some(value) => value,
                None => {
                    tracing::debug!("skipping row with bad value in {}", path.display());
                    continue;
                }
            };
            readings.push(Reading { timestamp, value });
        }
        Ok(())
    }

    fn read_cache(&self, sensor_id: &str, path: &Path) -> Result<SensorSeries> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let mut readings = Vec::new();
        for result in reader.records() {
            let record = result?;
            let raw_timestamp = record.get(1).ok_or_else(|| DataError::MissingColumn {
                column: "timestamp".to_string(),
                file: path.display().to_string(),
            })?;
            let raw_value = record.get(2).ok_or_else(|| DataError::MissingColumn {
                column: "value".to_string(),
                file: path.display().to_string(),
            })?;
            let value = raw_value
                .trim()
                .parse::<f64>()
                .map_err(|_| DataError::InvalidValue(raw_value.to_string()))?;
            readings.push(Reading {
                timestamp: parse_timestamp(raw_timestamp)?,
                value,
            });
        }
        Ok(SensorSeries::from_readings(sensor_id, readings))
    }

    fn write_cache(&self, series: &SensorSeries) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_path(series.sensor_id());
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["sensor_id", "timestamp", "value"])?;
        for reading in series.readings() {
            writer.write_record(&[
                series.sensor_id().to_string(),
                reading.timestamp.format(TIMESTAMP_OUTPUT_FORMAT).to_string(),
                reading.value.to_string(),
            ])?;
        }
        writer.flush()?;
        tracing::debug!("cached {} readings at {}", series.len(), path.display());
        Ok(())
    }
}

fn collect_csv_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_csv_files(&path, files)?;
        } else if path.extension().map_or(false, |ext| ext == "csv") {
            files.push(path);
        }
    }
    Ok(())
}
