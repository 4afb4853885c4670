//! Batch detection and reconstruction over many sensors.
//!
//! Detection walks the configured sensors, flags anomalous readings and
//! writes every flagged reading to the combined records file. Reconstruction
//! reads that file back, orders the records by timestamp, and works through
//! the sensors in order of first appearance: fit a fresh model on the
//! sensor's series, persist it, predict each flagged reading from the window
//! before it and write the sensor's completed records.
//!
//! Trouble local to one sensor (no data, degenerate clustering, too little
//! history) is captured in that sensor's outcome and the batch moves on.
//! Only an unusable store or a rejected configuration fails the whole run.

use anomaly::GapDbscanDetector;
use data::{AnomalyRecord, AnomalyStore, ModelStore, SeriesLoader};
use recurrent::{ModelError, Trainer};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::report::{BatchReport, SensorOutcome, Stage};

/// Runs the detection and reconstruction stages over a set of sensors.
pub struct Runner {
    loader: SeriesLoader,
    records: AnomalyStore,
    models: ModelStore,
    detector: GapDbscanDetector,
    trainer: Trainer,
    sensors: Vec<String>,
}

impl Runner {
    /// Builds a runner from configuration.
    ///
    /// Opening either store and validating the trainer settings happen here;
    /// failure means the run cannot proceed at all. Per-sensor trouble later
    /// never does this.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let loader = SeriesLoader::new(config.data_dir.clone(), config.cache_dir.clone());
        let records = AnomalyStore::new(config.output_dir)?;
        let models = ModelStore::new(config.model_dir)?;
        let detector = GapDbscanDetector::from_config(config.detector);
        let trainer = Trainer::new(config.trainer)?;
        Ok(Self {
            loader,
            records,
            models,
            detector,
            trainer,
            sensors: config.sensors,
        })
    }

    /// Store holding the combined and per-sensor record files.
    pub fn anomaly_store(&self) -> &AnomalyStore {
        &self.records
    }

    /// Store holding the trained model documents.
    pub fn model_store(&self) -> &ModelStore {
        &self.models
    }

    /// Detects anomalies for every configured sensor and writes the combined
    /// records file.
    ///
    /// With no sensors configured, every sensor found in the raw exports is
    /// processed. Failing to scan for sensors or to write the combined file
    /// is fatal; everything else lands in the report.
    pub fn detect_sensors(&self) -> Result<BatchReport> {
        let sensors = if self.sensors.is_empty() {
            self.loader.sensor_ids()?
        } else {
            self.sensors.clone()
        };
        tracing::info!("detecting anomalies for {} sensors", sensors.len());

        let mut report = BatchReport::default();
        let mut records = Vec::new();
        for sensor_id in &sensors {
            report.push(self.detect_sensor(sensor_id, &mut records));
        }

        self.records.write_info(&records)?;
        tracing::info!(
            "wrote {} anomaly records to {}",
            records.len(),
            self.records.info_path().display()
        );
        Ok(report)
    }

    fn detect_sensor(&self, sensor_id: &str, sink: &mut Vec<AnomalyRecord>) -> SensorOutcome {
        let series = match self.loader.load(sensor_id) {
            Ok(series) => series,
            Err(err) => {
                return SensorOutcome::failed(sensor_id, Stage::Detect, err.to_string());
            }
        };
        if series.is_empty() {
            return SensorOutcome::skipped(sensor_id, Stage::Detect, "no readings".to_string());
        }

        let values = series.values();
        let detection = match self.detector.detect(&values) {
            Ok(detection) => detection,
            Err(err) => {
                return SensorOutcome::failed(sensor_id, Stage::Detect, err.to_string());
            }
        };

        let indices = detection.anomaly_indices();
        for &index in &indices {
            let reading = series.readings()[index];
            sink.push(AnomalyRecord {
                sensor_id: sensor_id.to_string(),
                timestamp: reading.timestamp,
                value: reading.value,
                prediction: None,
            });
        }

        SensorOutcome::completed(
            sensor_id,
            Stage::Detect,
            format!(
                "{} anomalies in {} readings (epsilon {:.1})",
                indices.len(),
                values.len(),
                detection.epsilon
            ),
        )
        .with_counts(indices.len(), 0)
    }

    /// Reconstructs values for the records in the combined file.
    ///
    /// Records are ordered by timestamp and sensors processed in order of
    /// first appearance. Each sensor gets a freshly trained model, replacing
    /// whatever the store held for it. An unreadable combined file is fatal:
    /// there is no batch to run without it.
    pub fn reconstruct(&self) -> Result<BatchReport> {
        let mut records = self.records.read_info()?;
        records.sort_by_key(|r| r.timestamp);
        let sensors = sensor_order(&records);
        tracing::info!(
            "reconstructing {} records across {} sensors",
            records.len(),
            sensors.len()
        );

        let mut report = BatchReport::default();
        for sensor_id in &sensors {
            report.push(self.reconstruct_sensor(sensor_id, &records)?);
        }
        Ok(report)
    }

    fn reconstruct_sensor(
        &self,
        sensor_id: &str,
        all_records: &[AnomalyRecord],
    ) -> Result<SensorOutcome> {
        let mut records: Vec<AnomalyRecord> = all_records
            .iter()
            .filter(|r| r.sensor_id == sensor_id)
            .cloned()
            .collect();

        let series = match self.loader.load(sensor_id) {
            Ok(series) => series,
            Err(err) => {
                return Ok(SensorOutcome::failed(
                    sensor_id,
                    Stage::Reconstruct,
                    err.to_string(),
                ));
            }
        };
        if series.is_empty() {
            return Ok(SensorOutcome::skipped(
                sensor_id,
                Stage::Reconstruct,
                "no readings".to_string(),
            ));
        }

        let values = series.values();
        let model = match self.trainer.fit(&values) {
            Ok(model) => model,
            Err(err @ ModelError::InsufficientHistory { .. }) => {
                // Observed values still reach the completed file; their
                // predictions stay unset.
                self.records.write_completed(sensor_id, &records)?;
                return Ok(SensorOutcome::skipped(
                    sensor_id,
                    Stage::Reconstruct,
                    err.to_string(),
                )
                .with_counts(records.len(), 0));
            }
            Err(err) => {
                return Ok(SensorOutcome::failed(
                    sensor_id,
                    Stage::Reconstruct,
                    err.to_string(),
                ));
            }
        };

        self.models.save(sensor_id, &model)?;
        tracing::info!(
            "saved model for sensor {} ({} training pairs)",
            sensor_id,
            model.trained_pairs()
        );

        let mut reconstructed = 0usize;
        for record in records.iter_mut() {
            let index = match series.position(record.timestamp) {
                Some(index) => index,
                None => {
                    tracing::warn!(
                        "sensor {}: no reading at {}, leaving prediction unset",
                        sensor_id,
                        record.timestamp
                    );
                    continue;
                }
            };
            match model.reconstruct(&values, index) {
                Ok(value) => {
                    record.prediction = Some(value);
                    reconstructed += 1;
                }
                Err(ModelError::InsufficientHistory { .. }) => {
                    tracing::debug!(
                        "sensor {}: index {} has fewer than {} preceding readings",
                        sensor_id,
                        index,
                        model.window()
                    );
                }
                Err(err) => {
                    return Ok(SensorOutcome::failed(
                        sensor_id,
                        Stage::Reconstruct,
                        err.to_string(),
                    ));
                }
            }
        }

        self.records.write_completed(sensor_id, &records)?;
        tracing::info!("saved {} records for sensor {}", records.len(), sensor_id);

        Ok(SensorOutcome::completed(
            sensor_id,
            Stage::Reconstruct,
            format!("reconstructed {} of {} records", reconstructed, records.len()),
        )
        .with_counts(records.len(), reconstructed))
    }

    /// Runs detection and then reconstruction, returning the combined report.
    pub fn run(&self) -> Result<BatchReport> {
        let detection = self.detect_sensors()?;
        let reconstruction = self.reconstruct()?;
        Ok(detection.merge(reconstruction))
    }
}

/// Sensor ids in order of first appearance.
fn sensor_order(records: &[AnomalyRecord]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for record in records {
        if !order.iter().any(|id| id == &record.sensor_id) {
            order.push(record.sensor_id.clone());
        }
    }
    order
}
