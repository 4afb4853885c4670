//! # cablesense-recurrent
//!
//! Sequence reconstruction models for cable-force sensor series.
//!
//! A per-sensor LSTM learns to predict each reading from the window of
//! readings before it. The series is min-max scaled, cut into
//! (window, next value) pairs, and the leading fraction of the pairs trains
//! the cell one pair at a time under Adam. The fitted model then
//! reconstructs what a flagged reading should have been from its preceding
//! window alone.
//!
//! ## Example
//!
//! ```rust
//! use recurrent::{Trainer, TrainerConfig};
//!
//! let values: Vec<f64> = (0..60).map(|i| 2000.0 + (i as f64 * 0.2).sin() * 40.0).collect();
//! let config = TrainerConfig {
//!     window: 10,
//!     hidden: 8,
//!     seed: Some(42),
//!     ..TrainerConfig::default()
//! };
//!
//! let model = Trainer::new(config).unwrap().fit(&values).unwrap();
//! let restored = model.reconstruct(&values, 30).unwrap();
//! assert!(restored.is_finite());
//! ```

mod dataset;
mod error;
mod lstm;
mod scaler;
mod trainer;

pub use dataset::{create_dataset, train_len};
pub use error::{ModelError, Result};
pub use lstm::Lstm;
pub use scaler::MinMaxScaler;
pub use trainer::{TrainedModel, Trainer, TrainerConfig};
