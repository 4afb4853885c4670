//! Min-max scaling to the unit interval.

use serde::{Deserialize, Serialize};

/// Min-max scaler fitted over a whole series.
///
/// Transformation is pointwise, so scaling a window of a series equals
/// taking the same window of the scaled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fits the scaler to `data`, recording its minimum and maximum.
    pub fn fit(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self { min: 0.0, max: 1.0 };
        }
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self { min, max }
    }

    /// Maps values into `[0, 1]`. A constant series maps to 0.5.
    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        let range = self.max - self.min;
        if range.abs() < 1e-10 {
            return vec![0.5; data.len()];
        }
        data.iter().map(|x| (x - self.min) / range).collect()
    }

    /// Maps a scaled value back to the original range.
    pub fn inverse_value(&self, value: f64) -> f64 {
        value * (self.max - self.min) + self.min
    }

    /// Maps scaled values back to the original range.
    pub fn inverse_transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|x| self.inverse_value(*x)).collect()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
