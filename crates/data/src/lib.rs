//! # cablesense-data
//!
//! Sensor series loading and persistence for the cablesense pipeline.
//!
//! Raw measurements arrive as CSV files scattered across a directory tree,
//! one or more sensors per file, in no particular order. [`SeriesLoader`]
//! walks the tree, assembles one chronologically sorted series per sensor
//! and caches the result so subsequent runs skip the scan. [`AnomalyStore`]
//! and [`ModelStore`] persist detection output and trained models.
//!
//! ## Example
//!
//! ```no_run
//! use data::SeriesLoader;
//!
//! let loader = SeriesLoader::new("data".into(), "cache".into());
//! let series = loader.load("C01")?;
//! println!("{} readings for {}", series.len(), series.sensor_id());
//! # Ok::<(), data::DataError>(())
//! ```

mod error;
mod loader;
mod series;
mod store;

pub use error::{DataError, Result};
pub use loader::SeriesLoader;
pub use series::{parse_timestamp, Reading, SensorSeries, TIMESTAMP_OUTPUT_FORMAT};
pub use store::{AnomalyRecord, AnomalyStore, ModelStore};
