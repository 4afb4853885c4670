//! # cablesense-anomaly
//!
//! Density-based anomaly detection for cable-force sensor series.
//!
//! Detection runs in two stages. First the series is histogrammed with
//! automatic bin sizing and the spacing between occupied bins yields a
//! clustering radius ([`estimate_threshold`]). Then one-dimensional DBSCAN
//! groups the observations at that radius, the cluster holding a strict
//! majority of the series is declared normal, and everything else is flagged
//! ([`GapDbscanDetector`]).
//!
//! ## Example
//!
//! ```rust
//! use anomaly::GapDbscanDetector;
//!
//! let mut values = vec![2000.0; 30];
//! values[7] = 9000.0;
//!
//! let detector = GapDbscanDetector::new();
//! let detection = detector.detect(&values).unwrap();
//! assert_eq!(detection.anomaly_indices(), vec![7]);
//! ```

mod dbscan;
mod epsilon;
mod error;

pub use dbscan::{Detection, GapDbscanDetector};
pub use epsilon::{estimate_threshold, BucketSpan, DetectorConfig, ThresholdEstimate};
pub use error::{DetectError, Result};
