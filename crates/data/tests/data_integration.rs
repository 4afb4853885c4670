//! Integration tests for the data crate

use std::fs;
use std::path::Path;

use data::{
    parse_timestamp, AnomalyRecord, AnomalyStore, DataError, ModelStore, SeriesLoader,
};
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Raw exports spread over nested directories, with two sensors interleaved
/// and rows out of chronological order.
fn seed_raw_exports(data_dir: &Path) {
    write_file(
        &data_dir.join("2021/march.csv"),
        "sensor_id,timestamp,value\n\
         SLS01,2021-03-02 10:00:00,2010\n\
         SLS02,2021-03-01 10:00:00,4000\n\
         SLS01,2021-03-01 10:00:00,2000\n",
    );
    write_file(
        &data_dir.join("2021/april/extra.csv"),
        "sensor_id,timestamp,value\n\
         SLS01,2021-04-01 10:00:00,2030\n\
         SLS01,2021-03-03 10:00:00,2020\n\
         SLS02,2021-04-01 10:00:00,4010\n",
    );
}

#[test]
fn test_load_assembles_and_sorts_across_files() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    let series = loader.load("SLS01").unwrap();

    assert_eq!(series.sensor_id(), "SLS01");
    assert_eq!(series.values(), vec![2000.0, 2010.0, 2020.0, 2030.0]);
    let timestamps: Vec<_> = series.readings().iter().map(|r| r.timestamp).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
}

#[test]
fn test_load_filters_to_requested_sensor() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    let series = loader.load("SLS02").unwrap();

    assert_eq!(series.values(), vec![4000.0, 4010.0]);
}

#[test]
fn test_load_missing_data_dir_yields_empty_series() {
    let dir = TempDir::new().unwrap();
    let loader = SeriesLoader::new(dir.path().join("nowhere"), dir.path().join("cache"));
    let series = loader.load("SLS01").unwrap();
    assert!(series.is_empty());
}

#[test]
fn test_load_unknown_sensor_yields_empty_series_without_cache() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    let series = loader.load("SLS99").unwrap();

    assert!(series.is_empty());
    assert!(!loader.cache_path("SLS99").exists());
}

#[test]
fn test_cache_written_and_preferred_over_raw_files() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);

    let loader = SeriesLoader::new(data_dir.clone(), dir.path().join("cache"));
    let first = loader.load("SLS01").unwrap();
    assert!(loader.cache_path("SLS01").is_file());

    // Raw exports gone; the cached series must still load, unchanged.
    fs::remove_dir_all(&data_dir).unwrap();
    let second = loader.load("SLS01").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_load_skips_files_without_expected_columns() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);
    write_file(
        &data_dir.join("notes.csv"),
        "station,remark\nA,installed\n",
    );

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    let series = loader.load("SLS01").unwrap();
    assert_eq!(series.len(), 4);
}

#[test]
fn test_load_skips_unparseable_rows() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    write_file(
        &data_dir.join("raw.csv"),
        "sensor_id,timestamp,value\n\
         SLS01,2021-03-01 10:00:00,2000\n\
         SLS01,sometime,2010\n\
         SLS01,2021-03-02 10:00:00,not-a-number\n\
         SLS01,2021-03-03 10:00:00,2020\n",
    );

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    let series = loader.load("SLS01").unwrap();
    assert_eq!(series.values(), vec![2000.0, 2020.0]);
}

#[test]
fn test_sensor_ids_in_first_appearance_order() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    seed_raw_exports(&data_dir);

    let loader = SeriesLoader::new(data_dir, dir.path().join("cache"));
    // Files scan in sorted path order, so april/extra.csv comes first.
    assert_eq!(loader.sensor_ids().unwrap(), vec!["SLS01", "SLS02"]);
}

#[test]
fn test_anomaly_info_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = AnomalyStore::new(dir.path().join("output")).unwrap();
    let records = vec![
        AnomalyRecord {
            sensor_id: "SLS01".to_string(),
            timestamp: parse_timestamp("2021-03-01 10:00:00").unwrap(),
            value: 180.5,
            prediction: None,
        },
        AnomalyRecord {
            sensor_id: "SLS02".to_string(),
            timestamp: parse_timestamp("2021-03-02 11:30:00").unwrap(),
            value: 6200.0,
            prediction: Some(2012.25),
        },
    ];

    store.write_info(&records).unwrap();
    assert_eq!(store.read_info().unwrap(), records);
}

#[test]
fn test_completed_round_trip_keeps_unset_predictions() {
    let dir = TempDir::new().unwrap();
    let store = AnomalyStore::new(dir.path().join("output")).unwrap();
    let records = vec![AnomalyRecord {
        sensor_id: "SLS01".to_string(),
        timestamp: parse_timestamp("2021-03-01 10:00:00").unwrap(),
        value: 180.5,
        prediction: None,
    }];

    store.write_completed("SLS01", &records).unwrap();
    let restored = store.read_completed("SLS01").unwrap();
    assert_eq!(restored, records);
    assert_eq!(restored[0].prediction, None);
}

#[test]
fn test_completed_files_are_per_sensor() {
    let dir = TempDir::new().unwrap();
    let store = AnomalyStore::new(dir.path().join("output")).unwrap();
    assert_eq!(
        store.completed_path("SLS01").file_name().unwrap(),
        "SLS01_anomaly_completed.csv"
    );
    assert_eq!(store.info_path().file_name().unwrap(), "anomaly_info.csv");
}

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct FakeModel {
    weights: Vec<f64>,
    window: usize,
}

#[test]
fn test_model_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("models")).unwrap();
    let model = FakeModel {
        weights: vec![0.25, -1.5, 3.0],
        window: 10,
    };

    assert!(!store.exists("SLS01"));
    store.save("SLS01", &model).unwrap();
    assert!(store.exists("SLS01"));

    let restored: FakeModel = store.load("SLS01").unwrap();
    assert_eq!(restored, model);
}

#[test]
fn test_model_store_missing_model_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("models")).unwrap();
    let result: data::Result<FakeModel> = store.load("SLS07");
    assert!(matches!(result, Err(DataError::ModelNotFound(id)) if id == "SLS07"));
}
