//! # cablesense-pipeline
//!
//! Batch detection and reconstruction for cable-force sensor series.
//!
//! The [`Runner`] ties the other cablesense crates together: it loads each
//! sensor's series, flags anomalous readings with the density detector,
//! writes the combined records file, then trains a per-sensor sequence model
//! and fills in reconstructed values for the flagged readings. Every sensor
//! produces a [`SensorOutcome`] in the returned [`BatchReport`]; one sensor's
//! failure never stops the rest of the batch.
//!
//! ## Example
//!
//! ```no_run
//! use pipeline::{PipelineConfig, Runner};
//!
//! let mut config = PipelineConfig::default();
//! config.data_dir = "exports".into();
//! config.sensors = vec!["SLS01".to_string()];
//!
//! let runner = Runner::new(config)?;
//! let report = runner.run()?;
//! println!("{} completed, {} failed", report.completed(), report.failed());
//! # Ok::<(), pipeline::PipelineError>(())
//! ```

mod config;
mod error;
mod report;
mod runner;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use report::{BatchReport, SensorOutcome, SensorStatus, Stage};
pub use runner::Runner;
