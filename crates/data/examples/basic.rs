//! Basic example demonstrating series loading and persistence
//!
//! Run with: cargo run --example basic -p cablesense-data

use std::fs;

use data::{parse_timestamp, AnomalyRecord, AnomalyStore, SeriesLoader};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct DemoModel {
    window: usize,
    weights: Vec<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== cablesense-data Basic Examples ===\n");

    let root = std::env::temp_dir().join("cablesense_data_example");
    if root.exists() {
        fs::remove_dir_all(&root)?;
    }

    // Two raw exports, rows out of order and sensors interleaved
    let data_dir = root.join("data");
    fs::create_dir_all(data_dir.join("march"))?;
    fs::write(
        data_dir.join("march/export_a.csv"),
        "sensor_id,timestamp,value\n\
         SLS01,2021-03-01 02:00:00,2104\n\
         SLS02,2021-03-01 00:00:00,1830\n\
         SLS01,2021-03-01 00:00:00,2100\n",
    )?;
    fs::write(
        data_dir.join("march/export_b.csv"),
        "sensor_id,timestamp,value\n\
         SLS01,2021-03-01 01:00:00,2102\n\
         SLS02,2021-03-01 01:00:00,1833\n",
    )?;

    let loader = SeriesLoader::new(data_dir, root.join("cache"));

    // 1. Sensor discovery
    println!("1. Sensor discovery");
    println!("   Sensors found: {:?}\n", loader.sensor_ids()?);

    // 2. Series assembly
    println!("2. Series assembly");
    let series = loader.load("SLS01")?;
    println!("   {} readings for {}", series.len(), series.sensor_id());
    for reading in series.readings() {
        println!("   {} {:.0}", reading.timestamp, reading.value);
    }
    println!("   Cached at: {}\n", loader.cache_path("SLS01").display());

    // 3. Anomaly records
    println!("3. Anomaly records");
    let store = AnomalyStore::new(root.join("output"))?;
    store.write_info(&[AnomalyRecord {
        sensor_id: "SLS01".to_string(),
        timestamp: parse_timestamp("2021-03-01 02:00:00")?,
        value: 2104.0,
        prediction: None,
    }])?;
    let records = store.read_info()?;
    println!("   {} record(s) in {}", records.len(), store.info_path().display());
    println!("   First: {} at {}\n", records[0].sensor_id, records[0].timestamp);

    // 4. Model documents
    println!("4. Model documents");
    let models = data::ModelStore::new(root.join("models"))?;
    models.save(
        "SLS01",
        &DemoModel {
            window: 10,
            weights: vec![0.1, 0.2, 0.3],
        },
    )?;
    let restored: DemoModel = models.load("SLS01")?;
    println!("   Stored and restored a model with window {}", restored.window);
    println!("   Exists: {}", models.exists("SLS01"));

    fs::remove_dir_all(&root)?;
    println!("\n=== Examples Complete ===");
    Ok(())
}
