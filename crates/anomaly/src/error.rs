//! Detection error types.

use thiserror::Error;

/// Anomaly detection errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectError {
    #[error("Empty series: detection requires at least one observation")]
    EmptySeries,

    #[error("No majority cluster: {clusters} clusters found, largest covers {largest} points")]
    NoMajorityCluster { clusters: usize, largest: usize },
}

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_display() {
        let error = DetectError::EmptySeries;
        assert_eq!(
            error.to_string(),
            "Empty series: detection requires at least one observation"
        );
    }

    #[test]
    fn test_no_majority_cluster_display() {
        let error = DetectError::NoMajorityCluster {
            clusters: 3,
            largest: 4,
        };
        assert_eq!(
            error.to_string(),
            "No majority cluster: 3 clusters found, largest covers 4 points"
        );
    }

    #[test]
    fn test_error_is_debug() {
        let error = DetectError::EmptySeries;
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("EmptySeries"));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(DetectError::EmptySeries);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), DetectError::EmptySeries));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(DetectError::NoMajorityCluster {
            clusters: 2,
            largest: 1,
        });
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn test_all_error_variants_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DetectError>();
    }
}
