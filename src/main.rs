mod calculator;
mod config;
mod error;
mod models;
mod pricing;
mod providers;
mod report;
mod service;
mod storage;
mod units;

use calculator::compute_cost;
use clap::{Parser, Subcommand};
use config::{ensure_initialized, load_config, AppConfig};
use error::AppError;
use models::{FunctionConfig, FunctionCostRecord, ReportFormat, UsageMetrics};
use providers::aws::AwsSource;
use providers::inventory::InventorySource;
use providers::FunctionSource;
use service::ReportService;
use std::path::PathBuf;
use storage::FsReportSink;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lambda-cost-report")]
#[command(about = "Monthly AWS Lambda cost reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Init,
    /// Write one ranked cost report per month (MM.YYYY).
    Report {
        months: Vec<String>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Read functions and usage from a JSON inventory instead of AWS.
        #[arg(long)]
        inventory: Option<PathBuf>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        format: Option<String>,
    },
    /// Price a single function without calling AWS.
    Estimate {
        #[arg(long, default_value = "estimate")]
        name: String,
        #[arg(long)]
        memory_mb: i64,
        #[arg(long, default_value_t = 512)]
        ephemeral_storage_mb: i64,
        #[arg(long, default_value_t = 0.0)]
        invocations: f64,
        #[arg(long, default_value_t = 0.0)]
        duration_ms: f64,
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("LAMBDA_COST_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_months(requested: Vec<String>, cfg: &AppConfig) -> Result<Vec<String>, AppError> {
    let months = if requested.is_empty() {
        cfg.default_months.clone()
    } else {
        requested
    };
    if months.is_empty() {
        return Err(AppError::Config(
            "No months requested. Pass MM.YYYY arguments or set default_months.".into(),
        ));
    }
    Ok(months)
}

fn resolve_format(flag: Option<&str>, cfg: &AppConfig) -> Result<ReportFormat, AppError> {
    match flag {
        Some(raw) => raw.parse(),
        None => Ok(cfg.format),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            ensure_initialized()?;
            println!("Initialized lambda-cost-report config directory.");
        }
        Commands::Report {
            months,
            output_dir,
            inventory,
            region,
            format,
        } => {
            ensure_initialized()?;
            let cfg = load_config()?;
            let months = resolve_months(months, &cfg)?;
            let format = resolve_format(format.as_deref(), &cfg)?;

            let source: Box<dyn FunctionSource> = match inventory {
                Some(path) => Box::new(InventorySource::load(&path)?),
                None => Box::new(AwsSource::connect(region.or(cfg.region.clone())).await),
            };
            let sink = FsReportSink::new(output_dir.unwrap_or_else(|| cfg.output_dir.clone()));

            let svc = ReportService::new(source, Box::new(sink), cfg.pricing, format);
            for outcome in svc.run(&months).await {
                match outcome.result {
                    Ok(summary) => {
                        println!(
                            "{}: {} functions written to {} ({} skipped)",
                            outcome.label,
                            summary.records,
                            summary.location,
                            summary.failures.len()
                        );
                        for failure in &summary.failures {
                            println!("  skipped {}: {}", failure.function_name, failure.error);
                        }
                    }
                    Err(e) => println!("{}: no report ({e})", outcome.label),
                }
            }
        }
        Commands::Estimate {
            name,
            memory_mb,
            ephemeral_storage_mb,
            invocations,
            duration_ms,
            format,
        } => {
            let format: ReportFormat = format.parse()?;
            let config = FunctionConfig {
                memory_allocated_mb: memory_mb,
                ephemeral_storage_mb,
            };
            let usage = UsageMetrics {
                invocations,
                duration_millis: duration_ms,
            };
            let cost = compute_cost(&config, &usage, &load_config()?.pricing)?;
            let record = FunctionCostRecord {
                function_name: name,
                config,
                usage,
                cost,
            };
            match format {
                ReportFormat::Csv => println!("{}", report::render_csv(&[record])),
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
            }
        }
    }

    Ok(())
}
