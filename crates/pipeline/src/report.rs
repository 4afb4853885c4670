//! Batch outcome reporting.
//!
//! Every sensor a stage touches produces one [`SensorOutcome`], whatever
//! happened to it. The [`BatchReport`] collects them so callers can tell a
//! clean run from one that skipped or failed sensors without digging through
//! logs.

use serde::{Deserialize, Serialize};

/// Pipeline stage an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Detect,
    Reconstruct,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Detect => write!(f, "detect"),
            Stage::Reconstruct => write!(f, "reconstruct"),
        }
    }
}

/// How processing one sensor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorStatus {
    /// The stage ran to completion for this sensor.
    Completed,
    /// Nothing to do for this sensor; noted and moved past.
    Skipped,
    /// The stage failed for this sensor; the rest of the batch still ran.
    Failed,
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorStatus::Completed => write!(f, "completed"),
            SensorStatus::Skipped => write!(f, "skipped"),
            SensorStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One sensor's result for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorOutcome {
    pub sensor_id: String,
    pub stage: Stage,
    pub status: SensorStatus,
    /// Anomalous readings involved: found by detection, or carried into
    /// reconstruction.
    pub anomalies: usize,
    /// Records that received a reconstructed value.
    pub reconstructed: usize,
    /// What happened, phrased for logs and reports.
    pub detail: String,
}

impl SensorOutcome {
    pub(crate) fn completed(sensor_id: &str, stage: Stage, detail: String) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            stage,
            status: SensorStatus::Completed,
            anomalies: 0,
            reconstructed: 0,
            detail,
        }
    }

    pub(crate) fn skipped(sensor_id: &str, stage: Stage, detail: String) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            stage,
            status: SensorStatus::Skipped,
            anomalies: 0,
            reconstructed: 0,
            detail,
        }
    }

    pub(crate) fn failed(sensor_id: &str, stage: Stage, detail: String) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            stage,
            status: SensorStatus::Failed,
            anomalies: 0,
            reconstructed: 0,
            detail,
        }
    }

    pub(crate) fn with_counts(mut self, anomalies: usize, reconstructed: usize) -> Self {
        self.anomalies = anomalies;
        self.reconstructed = reconstructed;
        self
    }
}

/// Per-sensor outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<SensorOutcome>,
}

impl BatchReport {
    pub(crate) fn push(&mut self, outcome: SensorOutcome) {
        tracing::info!(
            "{} {}: {} ({})",
            outcome.stage,
            outcome.sensor_id,
            outcome.status,
            outcome.detail
        );
        self.outcomes.push(outcome);
    }

    pub(crate) fn merge(mut self, other: BatchReport) -> Self {
        self.outcomes.extend(other.outcomes);
        self
    }

    pub fn completed(&self) -> usize {
        self.count(SensorStatus::Completed)
    }

    pub fn skipped(&self) -> usize {
        self.count(SensorStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(SensorStatus::Failed)
    }

    fn count(&self, status: SensorStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Outcome for one sensor in one stage.
    pub fn outcome(&self, sensor_id: &str, stage: Stage) -> Option<&SensorOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.sensor_id == sensor_id && o.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BatchReport {
        let mut report = BatchReport::default();
        report.push(
            SensorOutcome::completed("SLS01", Stage::Detect, "2 anomalies".to_string())
                .with_counts(2, 0),
        );
        report.push(SensorOutcome::skipped(
            "SLS02",
            Stage::Detect,
            "no readings".to_string(),
        ));
        report.push(SensorOutcome::failed(
            "SLS03",
            Stage::Detect,
            "no majority cluster".to_string(),
        ));
        report
    }

    #[test]
    fn test_status_counts() {
        let report = sample_report();
        assert_eq!(report.completed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_outcome_lookup_by_sensor_and_stage() {
        let report = sample_report();
        let outcome = report.outcome("SLS01", Stage::Detect).unwrap();
        assert_eq!(outcome.status, SensorStatus::Completed);
        assert_eq!(outcome.anomalies, 2);
        assert!(report.outcome("SLS01", Stage::Reconstruct).is_none());
        assert!(report.outcome("SLS99", Stage::Detect).is_none());
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut second = BatchReport::default();
        second.push(
            SensorOutcome::completed("SLS01", Stage::Reconstruct, "1 of 2".to_string())
                .with_counts(2, 1),
        );
        let merged = sample_report().merge(second);

        assert_eq!(merged.outcomes.len(), 4);
        assert_eq!(merged.outcomes[0].stage, Stage::Detect);
        assert_eq!(merged.outcomes[3].stage, Stage::Reconstruct);
        assert!(merged.outcome("SLS01", Stage::Reconstruct).is_some());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Stage::Detect.to_string(), "detect");
        assert_eq!(Stage::Reconstruct.to_string(), "reconstruct");
        assert_eq!(SensorStatus::Completed.to_string(), "completed");
        assert_eq!(SensorStatus::Skipped.to_string(), "skipped");
        assert_eq!(SensorStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_serialize_round_trip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
