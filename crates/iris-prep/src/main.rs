//! CLI entry point for the data preparation stage.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use iris_prep::config::{
    DEFAULT_INPUT_PATH, DEFAULT_LABEL_COLUMN, DEFAULT_OUTLIER_COLUMN, DEFAULT_OUTPUT_DIR,
};
use iris_prep::{Pipeline, PipelineConfig, PipelineResult};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Prepare a CSV dataset for model training",
    long_about = "Loads a CSV dataset, replaces IQR outliers in one numeric column with the \
                  column median, splits features and labels into train/test sets with a \
                  seeded shuffle and writes X_train, X_test, y_train, y_test as Parquet.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: artifacts/raw/data.csv -> artifacts/processed/\n  \
                  iris-prep\n\n  \
                  # Custom input, 25% test rows, different seed\n  \
                  iris-prep -i data/iris.csv --test-size 0.25 --seed 7\n\n  \
                  # Machine-readable summary\n  \
                  iris-prep -i data/iris.csv --json | jq .rows_test"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input: String,

    /// Output directory for the train/test artifacts
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: String,

    /// Numeric column whose outliers are replaced with the median
    #[arg(long, default_value = DEFAULT_OUTLIER_COLUMN)]
    column: String,

    /// Label column
    #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
    label: String,

    /// Feature columns (comma separated). Defaults to the four Iris measurements.
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Fraction of rows held out for testing (exclusive 0.0 - 1.0)
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON to stdout instead of human-readable text
    ///
    /// Disables all logs so stdout only contains JSON.
    #[arg(long)]
    json: bool,

    /// Write split_report.json into the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output)
        .outlier_column(&args.column)
        .label_column(&args.label)
        .test_fraction(args.test_size)
        .seed(args.seed)
        .write_report(args.emit_report);

    if let Some(features) = &args.features {
        builder = builder.feature_columns(features.iter().map(|f| f.trim().to_string()));
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables (e.g. RUST_LOG) from .env before logging starts
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;

    info!("{}", "=".repeat(60));
    info!("Starting data preparation pipeline...");
    info!("{}", "=".repeat(60));

    let result = pipeline.run().map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_human_readable_summary(&result);
    }

    Ok(())
}

/// Print the run summary to stdout.
///
/// Unlike logging, this output is always visible (except with `--json`).
fn print_human_readable_summary(result: &PipelineResult) {
    println!();
    println!("Data preparation complete");
    println!("{}", "-".repeat(40));

    let outliers = &result.outliers;
    match &outliers.bounds {
        Some(bounds) => {
            println!(
                "Outliers in {}: {} replaced with median {:.4}",
                outliers.column, outliers.values_replaced, bounds.median
            );
            println!(
                "  Q1={:.4}  Q3={:.4}  IQR={:.4}  bounds=[{:.4}, {:.4}]",
                bounds.q1, bounds.q3, bounds.iqr, bounds.lower, bounds.upper
            );
        }
        None => println!("Outliers in {}: no usable values", outliers.column),
    }
    if outliers.missing_values > 0 {
        println!("  {} missing values left untouched", outliers.missing_values);
    }

    println!(
        "Split {} rows (test fraction {}, seed {}): {} train / {} test",
        result.rows_total, result.test_fraction, result.seed, result.rows_train, result.rows_test
    );

    println!("Artifacts:");
    for path in result.artifacts.iter() {
        println!("  {}", path.display());
    }
    if let Some(report) = &result.report_path {
        println!("Report: {}", report.display());
    }
    println!("Finished in {}ms", result.duration_ms);
}
