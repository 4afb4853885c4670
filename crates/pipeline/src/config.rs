//! Pipeline configuration.

use std::path::PathBuf;

use anomaly::DetectorConfig;
use recurrent::TrainerConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory tree of raw CSV exports.
    pub data_dir: PathBuf,
    /// Directory holding cached per-sensor series.
    pub cache_dir: PathBuf,
    /// Directory holding trained model documents.
    pub model_dir: PathBuf,
    /// Directory receiving anomaly record files.
    pub output_dir: PathBuf,
    /// Sensors to process; empty means every sensor found in the exports.
    pub sensors: Vec<String>,
    pub detector: DetectorConfig,
    pub trainer: TrainerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_dir: PathBuf::from("cache"),
            model_dir: PathBuf::from("models"),
            output_dir: PathBuf::from("output"),
            sensors: Vec::new(),
            detector: DetectorConfig::default(),
            trainer: TrainerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directories() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.sensors.is_empty());
    }

    #[test]
    fn test_default_component_settings() {
        let config = PipelineConfig::default();
        assert_eq!(config.detector.epsilon_floor, 100.0);
        assert_eq!(config.trainer.window, 10);
        assert_eq!(config.trainer.hidden, 50);
        assert_eq!(config.trainer.epochs, 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = PipelineConfig::default();
        config.sensors = vec!["SLS01".to_string()];
        config.detector.epsilon_floor = 250.0;
        config.trainer.epochs = 5;

        let json = serde_json::to_string(&config).unwrap();
        let restored: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.sensors, vec!["SLS01".to_string()]);
        assert_eq!(restored.detector.epsilon_floor, 250.0);
        assert_eq!(restored.trainer.epochs, 5);
    }
}
