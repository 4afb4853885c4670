//! # cablesense-cli
//!
//! Command-line interface for the cablesense monitoring pipeline.

use std::fs::File;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use data::{SeriesLoader, TIMESTAMP_OUTPUT_FORMAT};
use pipeline::{BatchReport, PipelineConfig, Runner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "cablesense")]
#[command(about = "Cable-force anomaly detection and reconstruction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalous readings and write the combined records file
    Detect(DetectArgs),

    /// Reconstruct values for previously detected anomalies
    Reconstruct(ReconstructArgs),

    /// Run detection followed by reconstruction
    Run(RunArgs),

    /// List the sensors present in the raw exports
    Sensors(SensorsArgs),
}

#[derive(Args)]
struct StoreArgs {
    /// Directory scanned recursively for raw CSV exports
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding cached per-sensor series
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Directory holding trained model documents
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Directory receiving anomaly record files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

impl StoreArgs {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.data_dir = self.data_dir;
        config.cache_dir = self.cache_dir;
        config.model_dir = self.model_dir;
        config.output_dir = self.output_dir;
        config
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Readings per input window
    #[arg(long, default_value = "10")]
    window: usize,

    /// Hidden units in the model
    #[arg(long, default_value = "50")]
    hidden: usize,

    /// Passes over the training pairs
    #[arg(long, default_value = "1")]
    epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Leading fraction of pairs used for training
    #[arg(long, default_value = "0.7")]
    train_split: f64,

    /// Seed for reproducible weight initialization
    #[arg(long)]
    seed: Option<u64>,
}

impl TrainArgs {
    fn apply(self, config: &mut PipelineConfig) {
        config.trainer.window = self.window;
        config.trainer.hidden = self.hidden;
        config.trainer.epochs = self.epochs;
        config.trainer.learning_rate = self.learning_rate;
        config.trainer.train_split = self.train_split;
        config.trainer.seed = self.seed;
    }
}

#[derive(Args)]
struct DetectArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Sensors to process, comma separated (default: every sensor found)
    #[arg(short, long, value_delimiter = ',')]
    sensors: Vec<String>,

    /// Smallest accepted clustering threshold
    #[arg(long, default_value = "100.0")]
    epsilon_floor: f64,

    /// Write the batch report as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct ReconstructArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    train: TrainArgs,

    /// Write the batch report as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Sensors to process, comma separated (default: every sensor found)
    #[arg(short, long, value_delimiter = ',')]
    sensors: Vec<String>,

    /// Smallest accepted clustering threshold
    #[arg(long, default_value = "100.0")]
    epsilon_floor: f64,

    #[command(flatten)]
    train: TrainArgs,

    /// Write the batch report as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct SensorsArgs {
    /// Directory scanned recursively for raw CSV exports
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding cached per-sensor series
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,
}

/// Print the per-sensor outcomes and a one-line tally
fn print_report(title: &str, report: &BatchReport) {
    println!("\n=== {} Results ===", title);
    for outcome in &report.outcomes {
        println!(
            "  [{}] {} {}: {}",
            outcome.status, outcome.stage, outcome.sensor_id, outcome.detail
        );
    }
    println!(
        "\n{} completed, {} skipped, {} failed",
        report.completed(),
        report.skipped(),
        report.failed()
    );
}

/// Write the batch report as JSON
fn write_report(report: &BatchReport, output: Option<&PathBuf>) -> CliResult<()> {
    if let Some(path) = output {
        let file = File::create(path).map_err(|e| format!("Failed to create output: {}", e))?;
        serde_json::to_writer_pretty(file, report)
            .map_err(|e| format!("Failed to write JSON: {}", e))?;
        println!("Report written to {:?}", path);
    }
    Ok(())
}

/// Run anomaly detection command
fn run_detect(args: DetectArgs) -> CliResult<()> {
    let mut config = args.store.into_config();
    config.sensors = args.sensors;
    config.detector.epsilon_floor = args.epsilon_floor;
    println!("Scanning raw exports under {:?}", config.data_dir);

    let runner = Runner::new(config).map_err(|e| e.to_string())?;
    let report = runner.detect_sensors().map_err(|e| e.to_string())?;
    println!(
        "Combined records written to {:?}",
        runner.anomaly_store().info_path()
    );

    print_report("Detection", &report);
    write_report(&report, args.report.as_ref())
}

/// Run reconstruction command
fn run_reconstruct(args: ReconstructArgs) -> CliResult<()> {
    let mut config = args.store.into_config();
    args.train.apply(&mut config);

    let runner = Runner::new(config).map_err(|e| e.to_string())?;
    let report = runner.reconstruct().map_err(|e| e.to_string())?;

    print_report("Reconstruction", &report);
    write_report(&report, args.report.as_ref())
}

/// Run both stages back to back
fn run_batch(args: RunArgs) -> CliResult<()> {
    let mut config = args.store.into_config();
    config.sensors = args.sensors;
    config.detector.epsilon_floor = args.epsilon_floor;
    args.train.apply(&mut config);
    println!("Scanning raw exports under {:?}", config.data_dir);

    let runner = Runner::new(config).map_err(|e| e.to_string())?;
    let report = runner.run().map_err(|e| e.to_string())?;

    print_report("Batch", &report);
    write_report(&report, args.report.as_ref())
}

/// List sensors found in the raw exports
fn run_sensors(args: SensorsArgs) -> CliResult<()> {
    let loader = SeriesLoader::new(args.data_dir, args.cache_dir);
    let sensors = loader.sensor_ids().map_err(|e| e.to_string())?;
    if sensors.is_empty() {
        println!("No sensors found");
        return Ok(());
    }

    println!("Found {} sensors:", sensors.len());
    for sensor_id in &sensors {
        let series = loader.load(sensor_id).map_err(|e| e.to_string())?;
        match (series.readings().first(), series.readings().last()) {
            (Some(first), Some(last)) => println!(
                "  {}: {} readings from {} to {}",
                sensor_id,
                series.len(),
                first.timestamp.format(TIMESTAMP_OUTPUT_FORMAT),
                last.timestamp.format(TIMESTAMP_OUTPUT_FORMAT)
            ),
            _ => println!("  {}: no readings", sensor_id),
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cablesense=info,pipeline=info,data=info,anomaly=info,recurrent=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Reconstruct(args) => run_reconstruct(args),
        Commands::Run(args) => run_batch(args),
        Commands::Sensors(args) => run_sensors(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_detect_with_sensors() {
        let cli = Cli::try_parse_from([
            "cablesense",
            "detect",
            "--sensors",
            "SLS01,SLS02",
            "--epsilon-floor",
            "250",
        ])
        .unwrap();
        match cli.command {
            Commands::Detect(args) => {
                assert_eq!(args.sensors, vec!["SLS01", "SLS02"]);
                assert_eq!(args.epsilon_floor, 250.0);
                assert_eq!(args.store.data_dir, PathBuf::from("data"));
            }
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["cablesense", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.train.window, 10);
                assert_eq!(args.train.hidden, 50);
                assert_eq!(args.train.seed, None);
                assert!(args.sensors.is_empty());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_reconstruct_tunables() {
        let cli = Cli::try_parse_from([
            "cablesense",
            "reconstruct",
            "--window",
            "12",
            "--epochs",
            "5",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Reconstruct(args) => {
                assert_eq!(args.train.window, 12);
                assert_eq!(args.train.epochs, 5);
                assert_eq!(args.train.seed, Some(7));
            }
            _ => panic!("expected reconstruct"),
        }
    }
}
