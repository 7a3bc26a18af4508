use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::fs;
use std::time::Duration;
use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use sales_analytics::catalog::{CatalogConfig, HttpCatalogClient, DEFAULT_BASE_URL};
use sales_analytics::filter::FilterCriteria;
use sales_analytics::models::MatchMode;
use sales_analytics::{run_pipeline, PipelineOptions};

#[derive(Parser, Debug)]
#[command(about = "A sales transaction analytics pipeline")]
struct Args {
    /// Input pipe-delimited file with sales transactions
    #[arg(name = "FILE")]
    input_file: PathBuf,

    /// Keep only transactions from this region (case-insensitive)
    #[arg(long)]
    region: Option<String>,

    /// Keep only transactions with amount >= this value
    #[arg(long)]
    min_amount: Option<f64>,

    /// Keep only transactions with amount <= this value
    #[arg(long)]
    max_amount: Option<f64>,

    /// Number of top-selling products to report
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Quantity threshold below which a product counts as low-performing
    #[arg(long, default_value_t = 10)]
    low_threshold: i64,

    /// How transactions are matched against the product catalog
    #[arg(long, value_enum, default_value = "id")]
    match_mode: MatchModeArg,

    /// Product catalog endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    catalog_url: String,

    /// Number of catalog products to fetch
    #[arg(long, default_value_t = 100)]
    page_size: u32,

    /// Catalog request attempts before giving up
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Delay between catalog request attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Where to write the enriched transactions
    #[arg(long, default_value = "data/enriched_sales_data.txt")]
    enriched_out: PathBuf,

    /// Where to write the text report
    #[arg(long, default_value = "output/sales_report.txt")]
    report_out: PathBuf,

    /// Log directory (defaults to logs/)
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchModeArg {
    /// Join on the numeric suffix of ProductID
    Id,
    /// Join on normalized product names
    Name,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Id => MatchMode::ById,
            MatchModeArg::Name => MatchMode::ByName,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Create logs directory if it doesn't exist
    if !args.log_dir.exists() {
        fs::create_dir_all(&args.log_dir)?;
    }

    // Generate log filename with current datetime
    let datetime = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = args.log_dir.join(format!("sales_analytics_{}.log", datetime));

    // Initialize logging to a file
    let file_appender = tracing_appender::rolling::never(&args.log_dir, log_file.file_name().unwrap_or_default());
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let catalog = HttpCatalogClient::new(CatalogConfig {
        base_url: args.catalog_url.clone(),
        max_retries: args.retries,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        ..CatalogConfig::default()
    })?;

    let options = PipelineOptions {
        criteria: FilterCriteria {
            region: args.region.clone(),
            min_amount: args.min_amount,
            max_amount: args.max_amount,
        },
        top_n: args.top,
        low_threshold: args.low_threshold,
        match_mode: args.match_mode.into(),
        page_size: args.page_size,
        enriched_path: args.enriched_out.clone(),
        report_path: args.report_out.clone(),
    };

    println!("\n{}", "=".repeat(40));
    println!("SALES ANALYTICS SYSTEM");
    println!("{}\n", "=".repeat(40));

    // Run the batch and print where everything landed
    let outcome = run_pipeline(&args.input_file, &catalog, &options).await?;

    println!("\n{}", "=".repeat(40));
    println!("PROCESS COMPLETE");
    println!("{}", "=".repeat(40));
    match &outcome.enriched_file {
        Some(path) => println!("  Enriched data -> {}", path.display()),
        None => println!("  Enriched data -> not generated"),
    }
    match &outcome.report_file {
        Some(path) => println!("  Sales report  -> {}", path.display()),
        None => println!("  Sales report  -> not generated"),
    }

    Ok(())
}
