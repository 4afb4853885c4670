//! Basic example demonstrating a full detection and reconstruction batch
//!
//! Run with: cargo run --example basic -p cablesense-pipeline

use std::fs;

use pipeline::{PipelineConfig, Runner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== cablesense-pipeline Basic Examples ===\n");

    let root = std::env::temp_dir().join("cablesense_pipeline_example");
    if root.exists() {
        fs::remove_dir_all(&root)?;
    }

    // Seed one raw export: a steady cable with two slack readings
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir)?;
    let mut rows = String::from("sensor_id,timestamp,value\n");
    for hour in 0..48 {
        let value = match hour {
            20 => 180.0,
            35 => 205.0,
            _ => 2100.0 + (hour % 7) as f64 * 3.0,
        };
        rows.push_str(&format!(
            "SLS17,2021-03-{:02} {:02}:00:00,{}\n",
            1 + hour / 24,
            hour % 24,
            value
        ));
    }
    fs::write(data_dir.join("export.csv"), rows)?;
    println!("Seeded 48 readings for SLS17 under {}\n", root.display());

    let mut config = PipelineConfig::default();
    config.data_dir = data_dir;
    config.cache_dir = root.join("cache");
    config.model_dir = root.join("models");
    config.output_dir = root.join("output");
    config.trainer.hidden = 16;
    config.trainer.epochs = 10;
    config.trainer.seed = Some(7);
    let runner = Runner::new(config)?;

    // 1. Detection
    println!("1. Detection");
    let report = runner.detect_sensors()?;
    for outcome in &report.outcomes {
        println!(
            "   {} {}: {} ({})",
            outcome.stage, outcome.sensor_id, outcome.status, outcome.detail
        );
    }
    println!();

    // 2. Reconstruction
    println!("2. Reconstruction");
    let report = runner.reconstruct()?;
    for outcome in &report.outcomes {
        println!(
            "   {} {}: {} ({})",
            outcome.stage, outcome.sensor_id, outcome.status, outcome.detail
        );
    }
    println!();

    // 3. Completed records
    println!("3. Completed records");
    for record in runner.anomaly_store().read_completed("SLS17")? {
        match record.prediction {
            Some(prediction) => println!(
                "   {} observed {:.1}, reconstructed {:.1}",
                record.timestamp, record.value, prediction
            ),
            None => println!(
                "   {} observed {:.1}, no reconstruction",
                record.timestamp, record.value
            ),
        }
    }

    fs::remove_dir_all(&root)?;
    println!("\n=== Examples Complete ===");
    Ok(())
}
