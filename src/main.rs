use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use stratasplit::app::{handle_fatal_error, init_logging, AppConfig};
use stratasplit::split::{run_split, SplitRequest, SplitSummary, TrainingPercent};
use stratasplit::store::{CsvStore, DEFAULT_KEY_COLUMN};

/// Divide data into training and validation data by stratified random sampling
#[derive(Parser)]
#[command(name = "stratasplit", version)]
#[command(about = "Divides data into training and validation data", long_about = None)]
struct Cli {
    /// Input dataset (CSV file with a header row)
    #[arg(short, long)]
    input: PathBuf,

    /// Name of column with class information
    #[arg(short, long)]
    column: String,

    /// Output dataset receiving the training records
    #[arg(long)]
    training: PathBuf,

    /// Output dataset receiving the validation records
    #[arg(long)]
    validation: PathBuf,

    /// Percent of each class which should be selected as training data
    #[arg(short = 'p', long, default_value_t = 30, allow_negative_numbers = true)]
    training_percent: i64,

    /// Column holding the record identifiers
    #[arg(short, long, default_value = DEFAULT_KEY_COLUMN)]
    key_column: String,

    /// Replace existing output datasets
    #[arg(long)]
    overwrite: bool,

    /// Maximum number of class lookups in flight
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Print a JSON summary of the split on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv adds thread ids)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let config = match AppConfig::new(verbose) {
        Ok(config) => config.with_json_output(cli.json),
        Err(e) => handle_fatal_error(e, verbose),
    };
    init_logging(&config);

    if let Err(e) = run(cli, &config).await {
        handle_fatal_error(e, verbose);
    }
}

async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    // Checked before the store is touched
    let percent = TrainingPercent::new(cli.training_percent)?;

    let dataset_name = |path: &PathBuf| config.resolve(path).to_string_lossy().into_owned();
    let request = SplitRequest::new(
        dataset_name(&cli.input),
        cli.column,
        dataset_name(&cli.training),
        dataset_name(&cli.validation),
    )
    .with_percent(percent)
    .with_concurrency(cli.concurrency);

    let store = CsvStore::new()
        .with_key_column(cli.key_column)
        .with_overwrite(cli.overwrite);
    debug!("Records are identified by column '{}'", store.key_column());

    let mut rng = rand::rng();
    let summary = run_split(&store, &request, &mut rng)
        .await
        .with_context(|| format!("Failed to split {}", cli.input.display()))?;

    print_summary(&summary, config)
}

fn print_summary(summary: &SplitSummary, config: &AppConfig) -> anyhow::Result<()> {
    if config.json_output {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!(
            "Divided data in <{}> ({} records) and <{}> ({} records)",
            summary.outputs.training,
            summary.training_records,
            summary.outputs.validation,
            summary.validation_records
        );
    }
    Ok(())
}
