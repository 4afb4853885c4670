//! Per-sensor training and reconstruction.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dataset::{create_dataset, train_len};
use crate::error::{ModelError, Result};
use crate::lstm::{Adam, Lstm};
use crate::scaler::MinMaxScaler;

/// Training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Observations per input window.
    pub window: usize,
    /// Hidden units in the LSTM cell.
    pub hidden: usize,
    /// Leading fraction of the pairs used for training.
    pub train_split: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Fixed seed for weight initialization; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            window: 10,
            hidden: 50,
            train_split: 0.7,
            epochs: 1,
            learning_rate: 1e-3,
            seed: None,
        }
    }
}

/// Trains a reconstruction model on one sensor's series.
///
/// The scaler is fitted over the whole series before windowing, and the
/// training set is the leading `train_split` fraction of the (window, next
/// value) pairs. Updates run one pair at a time in series order.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        if config.window == 0 {
            return Err(ModelError::InvalidParameter {
                name: "window".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if config.hidden == 0 {
            return Err(ModelError::InvalidParameter {
                name: "hidden".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(config.train_split > 0.0 && config.train_split <= 1.0) {
            return Err(ModelError::InvalidParameter {
                name: "train_split".to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
            return Err(ModelError::InvalidParameter {
                name: "learning_rate".to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fits a model to `values`.
    ///
    /// Requires at least `window + 2` observations, the minimum for one
    /// (window, next value) pair. With very short series the split can leave
    /// zero training pairs; the model is still returned, carrying only its
    /// initialization.
    pub fn fit(&self, values: &[f64]) -> Result<TrainedModel> {
        let required = self.config.window + 2;
        if values.len() < required {
            return Err(ModelError::InsufficientHistory {
                required,
                actual: values.len(),
            });
        }

        let scaler = MinMaxScaler::fit(values);
        let scaled = scaler.transform(values);
        let (windows, targets) = create_dataset(&scaled, self.config.window);
        let limit = train_len(windows.len(), self.config.train_split);

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut lstm = Lstm::new(self.config.hidden, &mut rng)?;
        let mut opt = Adam::new(self.config.learning_rate, self.config.hidden);

        if limit == 0 {
            tracing::debug!(
                "no training pairs from {} observations (window {}, split {})",
                values.len(),
                self.config.window,
                self.config.train_split
            );
        } else {
            for epoch in 0..self.config.epochs {
                let mut total = 0.0;
                for (window, &target) in windows[..limit].iter().zip(&targets[..limit]) {
                    total += lstm.train_pair(window, target, &mut opt);
                }
                tracing::info!(
                    "epoch {}/{} mean loss {:.6}",
                    epoch + 1,
                    self.config.epochs,
                    total / limit as f64
                );
            }
        }

        Ok(TrainedModel {
            lstm,
            scaler,
            window: self.config.window,
            trained_pairs: limit,
            epochs: self.config.epochs,
        })
    }
}

/// A fitted reconstruction model for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    lstm: Lstm,
    scaler: MinMaxScaler,
    window: usize,
    trained_pairs: usize,
    epochs: usize,
}

impl TrainedModel {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Pairs the model was actually trained on.
    pub fn trained_pairs(&self) -> usize {
        self.trained_pairs
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Predicts the value at `index` from the `window` observations before
    /// it. Only `values[index - window..index]` is read, so the observation
    /// at `index` and everything after it never influence the result.
    pub fn reconstruct(&self, values: &[f64], index: usize) -> Result<f64> {
        if index < self.window {
            return Err(ModelError::InsufficientHistory {
                required: self.window,
                actual: index,
            });
        }
        if index > values.len() {
            return Err(ModelError::InvalidParameter {
                name: "index".to_string(),
                reason: format!("series has only {} observations", values.len()),
            });
        }

        let window = self.scaler.transform(&values[index - self.window..index]);
        let output = self.lstm.predict(&window);
        Ok(self.scaler.inverse_value(output))
    }
}
