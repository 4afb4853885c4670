//! Basic example demonstrating cable-force anomaly detection
//!
//! Run with: cargo run --example basic -p cablesense-anomaly

use anomaly::{estimate_threshold, GapDbscanDetector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== cablesense-anomaly Basic Examples ===\n");

    // A steady cable around 2100 kN with three slack readings
    let mut values: Vec<f64> = (0..40).map(|i| 2100.0 + (i % 9) as f64 * 4.0).collect();
    values[6] = 140.0;
    values[21] = 155.0;
    values[33] = 131.0;

    println!("Series length: {}", values.len());
    println!("First readings: {:?}\n", &values[..8]);

    // 1. Threshold estimation
    println!("1. Histogram-gap threshold");
    let estimate = estimate_threshold(&values, 100.0)?;
    println!("   Epsilon: {:.2}", estimate.epsilon);
    println!("   Mean bin width: {:.2}", estimate.interval);
    println!("   Occupied-bin spans: {}", estimate.buckets.len());
    for bucket in &estimate.buckets {
        println!(
            "   [{:.1}, {:.1}] mean={:.1} std={:.2}",
            bucket.lower, bucket.upper, bucket.mean, bucket.std_dev
        );
    }
    println!();

    // 2. Density clustering
    println!("2. Density clustering");
    let detector = GapDbscanDetector::new();
    let detection = detector.detect(&values)?;
    println!("   Cluster sizes: {:?}", detection.cluster_sizes);
    println!("   Anomalous indices: {:?}", detection.anomaly_indices());
    for index in detection.anomaly_indices() {
        println!("   index {} value {:.1}", index, values[index]);
    }

    println!("\nSummary:");
    println!("   {} of {} readings flagged", detection.anomaly_count(), values.len());

    println!("\n=== Examples Complete ===");
    Ok(())
}
