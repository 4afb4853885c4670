//! Density clustering over scalar series.
//!
//! One-dimensional DBSCAN with a minimum cluster size of one: every
//! observation belongs to some cluster, and two observations share a cluster
//! exactly when they are connected by a chain of neighbors no further than
//! the radius apart. The cluster holding a strict majority of the series is
//! taken as normal operation; everything outside it is anomalous.

use serde::{Deserialize, Serialize};

use crate::epsilon::{estimate_threshold, DetectorConfig, ThresholdEstimate};
use crate::error::{DetectError, Result};

/// Detection outcome for one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Radius the clustering ran with.
    pub epsilon: f64,
    /// Per-observation anomaly flags, aligned with the input series.
    pub is_anomaly: Vec<bool>,
    /// Cluster populations, indexed by cluster id.
    pub cluster_sizes: Vec<usize>,
}

impl Detection {
    /// Indices of the anomalous observations, in series order.
    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.is_anomaly
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn anomaly_count(&self) -> usize {
        self.is_anomaly.iter().filter(|&&flag| flag).count()
    }
}

/// Anomaly detector combining histogram-gap radius estimation with density
/// clustering and a majority-cluster normality rule.
#[derive(Debug, Clone, Default)]
pub struct GapDbscanDetector {
    config: DetectorConfig,
}

impl GapDbscanDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Flags the observations outside the majority cluster.
    ///
    /// Fails with [`DetectError::EmptySeries`] on an empty series and with
    /// [`DetectError::NoMajorityCluster`] when no cluster covers more than
    /// half of the observations.
    pub fn detect(&self, values: &[f64]) -> Result<Detection> {
        let estimate = estimate_threshold(values, self.config.epsilon_floor)?;
        self.detect_with_estimate(values, &estimate)
    }

    /// Same as [`detect`](Self::detect) but reuses an existing radius
    /// estimate.
    pub fn detect_with_estimate(
        &self,
        values: &[f64],
        estimate: &ThresholdEstimate,
    ) -> Result<Detection> {
        if values.is_empty() {
            return Err(DetectError::EmptySeries);
        }

        let labels = cluster(values, estimate.epsilon);
        let cluster_count = labels.iter().max().map_or(0, |&m| m + 1);
        let mut cluster_sizes = vec![0usize; cluster_count];
        for &label in &labels {
            cluster_sizes[label] += 1;
        }

        // Normal operation requires a strict majority.
        let normal = cluster_sizes
            .iter()
            .position(|&size| size * 2 > values.len());
        let normal = match normal {
            Some(id) => id,
            None => {
                let largest = cluster_sizes.iter().copied().max().unwrap_or(0);
                tracing::warn!(
                    "no majority cluster: {} clusters over {} points, largest {}",
                    cluster_count,
                    values.len(),
                    largest
                );
                return Err(DetectError::NoMajorityCluster {
                    clusters: cluster_count,
                    largest,
                });
            }
        };

        let is_anomaly = labels.iter().map(|&label| label != normal).collect();
        Ok(Detection {
            epsilon: estimate.epsilon,
            is_anomaly,
            cluster_sizes,
        })
    }
}

/// Assigns a cluster id to every observation. Ids are dense and numbered by
/// first appearance in series order.
///
/// In one dimension density-reachability reduces to chains of consecutive
/// sorted values: a break larger than `epsilon` between sorted neighbors
/// separates clusters.
fn cluster(values: &[f64], epsilon: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Component id per observation, in sorted order.
    let mut component = vec![0usize; values.len()];
    let mut current = 0usize;
    for w in 0..order.len() {
        if w > 0 && values[order[w]] - values[order[w - 1]] > epsilon {
            current += 1;
        }
        component[order[w]] = current;
    }

    // Renumber components by first appearance in the input.
    let mut remap: Vec<Option<usize>> = vec![None; current + 1];
    let mut labels = vec![0usize; values.len()];
    let mut next = 0usize;
    for (i, label) in labels.iter_mut().enumerate() {
        let id = match remap[component[i]] {
            Some(id) => id,
            None => {
                let id = next;
                remap[component[i]] = Some(id);
                next += 1;
                id
            }
        };
        *label = id;
    }
    labels
}
