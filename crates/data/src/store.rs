//! Persistence for anomaly records and trained models.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::series::{parse_timestamp, TIMESTAMP_OUTPUT_FORMAT};

/// One detected anomaly, with the reconstruction once it exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
    /// Reconstructed value; unset until reconstruction has run, or when it
    /// was skipped for this record.
    pub prediction: Option<f64>,
}

/// CSV-backed storage for anomaly records.
///
/// The combined records file holds every sensor's detections; each sensor
/// additionally gets its own file once reconstruction has processed it.
#[derive(Debug, Clone)]
pub struct AnomalyStore {
    dir: PathBuf,
}

impl AnomalyStore {
    /// Opens the store, creating its directory. Failure here means the
    /// output location is unusable.
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Location of the combined records file.
    pub fn info_path(&self) -> PathBuf {
        self.dir.join("anomaly_info.csv")
    }

    /// Location of one sensor's completed records file.
    pub fn completed_path(&self, sensor_id: &str) -> PathBuf {
        self.dir.join(format!("{}_anomaly_completed.csv", sensor_id))
    }

    pub fn write_info(&self, records: &[AnomalyRecord]) -> Result<()> {
        write_records(&self.info_path(), records)
    }

    pub fn read_info(&self) -> Result<Vec<AnomalyRecord>> {
        read_records(&self.info_path())
    }

    pub fn write_completed(&self, sensor_id: &str, records: &[AnomalyRecord]) -> Result<()> {
        write_records(&self.completed_path(sensor_id), records)
    }

    pub fn read_completed(&self, sensor_id: &str) -> Result<Vec<AnomalyRecord>> {
        read_records(&self.completed_path(sensor_id))
    }
}

fn write_records(path: &Path, records: &[AnomalyRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["sensor_id", "timestamp", "value", "prediction"])?;
    for record in records {
        let prediction = match record.prediction {
            Some(p) => p.to_string(),
            None => String::new(),
        };
        writer.write_record(&[
            record.sensor_id.clone(),
            record.timestamp.format(TIMESTAMP_OUTPUT_FORMAT).to_string(),
            record.value.to_string(),
            prediction,
        ])?;
    }
    writer.flush()?;
    tracing::debug!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn field<'r>(
    record: &'r csv::StringRecord,
    path: &Path,
    index: usize,
    column: &str,
) -> Result<&'r str> {
    record.get(index).ok_or_else(|| DataError::MissingColumn {
        column: column.to_string(),
        file: path.display().to_string(),
    })
}

fn read_records(path: &Path) -> Result<Vec<AnomalyRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let sensor_id = field(&record, path, 0, "sensor_id")?.to_string();
        let timestamp = parse_timestamp(field(&record, path, 1, "timestamp")?)?;
        let raw_value = field(&record, path, 2, "value")?;
        let value = raw_value
            .trim()
            .parse::<f64>()
            .map_err(|_| DataError::InvalidValue(raw_value.to_string()))?;
        let prediction = match field(&record, path, 3, "prediction")? {
            "" => None,
            raw => Some(
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| DataError::InvalidValue(raw.to_string()))?,
            ),
        };
        records.push(AnomalyRecord {
            sensor_id,
            timestamp,
            value,
            prediction,
        });
    }
    Ok(records)
}

/// JSON document storage for trained models, one file per sensor.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Opens the store, creating its directory.
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Location of one sensor's model document.
    pub fn model_path(&self, sensor_id: &str) -> PathBuf {
        self.dir.join(format!("{}_model.json", sensor_id))
    }

    pub fn exists(&self, sensor_id: &str) -> bool {
        self.model_path(sensor_id).is_file()
    }

    pub fn save<M: Serialize>(&self, sensor_id: &str, model: &M) -> Result<()> {
        let path = self.model_path(sensor_id);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), model)?;
        tracing::debug!("saved model for sensor {} at {}", sensor_id, path.display());
        Ok(())
    }

    pub fn load<M: DeserializeOwned>(&self, sensor_id: &str) -> Result<M> {
        let path = self.model_path(sensor_id);
        if !path.is_file() {
            return Err(DataError::ModelNotFound(sensor_id.to_string()));
        }
        let file = File::open(&path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
