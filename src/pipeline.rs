use crate::analytics;
use crate::catalog::CatalogClient;
use crate::enrich::{enrich_transactions, EnrichmentStats};
use crate::error::SalesAnalyticsError;
use crate::filter::{data_overview, validate_and_filter, FilterCriteria, FilterSummary};
use crate::models::MatchMode;
use crate::output::write_enriched_file;
use crate::reader::{parse_transactions, read_sales_lines};
use crate::report::{format_amount, render_report, write_report};
use crate::validate::clean_records;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// Console progress steps for a full batch run
const TOTAL_STEPS: usize = 8;

/// Knobs for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub criteria: FilterCriteria,
    /// How many top-selling products to report
    pub top_n: usize,
    /// Quantity threshold for the low-performer list
    pub low_threshold: i64,
    pub match_mode: MatchMode,
    /// How many catalog products to fetch for the join
    pub page_size: u32,
    pub enriched_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            top_n: 5,
            low_threshold: 10,
            match_mode: MatchMode::ById,
            page_size: 100,
            enriched_path: PathBuf::from("data/enriched_sales_data.txt"),
            report_path: PathBuf::from("output/sales_report.txt"),
        }
    }
}

/// What a pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub lines_read: usize,
    pub parsed: usize,
    /// Raw lines dropped by the parser
    pub dropped_lines: usize,
    /// Records rejected by the structural cleaning pass
    pub structurally_invalid: usize,
    pub summary: FilterSummary,
    pub total_revenue: f64,
    /// Present only when catalog data was available
    pub enrichment: Option<EnrichmentStats>,
    pub enriched_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
}

fn step(number: usize, message: &str) {
    println!("[{}/{}] {}", number, TOTAL_STEPS, message);
}

// Valid is the count left after filtering; the filter removals get their
// own lines
fn validation_line(summary: &FilterSummary) -> String {
    format!(
        "      Valid: {} | Invalid: {}",
        summary.final_count, summary.invalid
    )
}

/// Run the whole batch: read, parse, clean, validate and filter, aggregate,
/// fetch the catalog, enrich, and write the enriched file and report.
///
/// Only an unreadable input file is fatal. A catalog failure degrades the
/// run to analytics without enrichment, and output failures are logged
/// without aborting, so the console summary always arrives.
pub async fn run_pipeline(
    input: &Path,
    catalog: &dyn CatalogClient,
    options: &PipelineOptions,
) -> Result<PipelineOutcome, SalesAnalyticsError> {
    let mut outcome = PipelineOutcome::default();

    step(1, "Reading sales data...");
    let raw_lines = read_sales_lines(input).await?;
    outcome.lines_read = raw_lines.len();
    println!("      Read {} data lines", raw_lines.len());

    step(2, "Parsing and cleaning records...");
    let parsed = parse_transactions(&raw_lines);
    outcome.parsed = parsed.len();
    outcome.dropped_lines = raw_lines.len() - parsed.len();
    let (cleaned, rejected) = clean_records(&parsed);
    outcome.structurally_invalid = rejected.len();
    println!(
        "      Parsed {} records ({} lines dropped, {} rejected by cleaning)",
        parsed.len(),
        outcome.dropped_lines,
        rejected.len()
    );

    step(3, "Data overview");
    let overview = data_overview(&cleaned);
    println!("      Regions: {}", overview.regions.join(", "));
    if let Some(range) = &overview.amount_range {
        println!(
            "      Amounts: ₹{} to ₹{} (avg ₹{})",
            format_amount(range.min),
            format_amount(range.max),
            format_amount(range.avg)
        );
    }

    step(4, "Validating and filtering transactions...");
    let (valid, summary) = validate_and_filter(&cleaned, &options.criteria);
    println!("{}", validation_line(&summary));
    if summary.filtered_by_region > 0 {
        println!("      Removed by region filter: {}", summary.filtered_by_region);
    }
    if summary.filtered_by_amount > 0 {
        println!("      Removed by amount filter: {}", summary.filtered_by_amount);
    }
    outcome.summary = summary;

    if valid.is_empty() {
        warn!("No valid transactions after filtering, nothing to analyze");
        println!("      No transactions left after filtering. Adjust the filters and retry.");
        return Ok(outcome);
    }

    step(5, "Analyzing sales data...");
    outcome.total_revenue = analytics::total_revenue(&valid);
    let regions = analytics::region_wise_sales(&valid);
    let top = analytics::top_selling_products(&valid, options.top_n);
    println!(
        "      Total revenue: ₹{}",
        format_amount(outcome.total_revenue)
    );
    if let Some(region) = regions.first() {
        println!(
            "      Top region: {} ({:.2}% of revenue)",
            region.region, region.percentage
        );
    }
    if let Some(product) = top.first() {
        println!(
            "      Top product: {} ({} units)",
            product.product_name, product.total_quantity
        );
    }

    step(6, "Fetching product data from the catalog...");
    let products = match catalog.fetch_batch(options.page_size).await {
        Ok(products) if !products.is_empty() => {
            println!("      Fetched {} products", products.len());
            Some(products)
        }
        Ok(_) => {
            warn!("Catalog returned no products, enrichment skipped");
            println!("      Catalog returned no products. Continuing without API data.");
            None
        }
        Err(e) => {
            warn!("Catalog fetch failed: {}, enrichment skipped", e);
            println!("      Catalog unavailable. Continuing without API data.");
            None
        }
    };

    step(7, "Enriching sales data...");
    let enriched = match &products {
        Some(products) => {
            let (enriched, stats) = enrich_transactions(&valid, products, options.match_mode);
            println!(
                "      Matched {}/{} transactions ({:.1}%)",
                stats.matched,
                stats.total,
                stats.matched_percentage()
            );
            outcome.enrichment = Some(stats);
            enriched
        }
        None => {
            println!("      No API data available. Skipping enrichment.");
            Vec::new()
        }
    };

    if !enriched.is_empty() {
        match write_enriched_file(&options.enriched_path, &enriched) {
            Ok(rows) => {
                println!(
                    "      Saved {} rows to {}",
                    rows,
                    options.enriched_path.display()
                );
                outcome.enriched_file = Some(options.enriched_path.clone());
            }
            Err(e) => {
                warn!("Failed to save enriched data: {}", e);
                println!("      Could not save enriched data: {}", e);
            }
        }
    }

    step(8, "Generating report...");
    let report = render_report(&valid, &enriched, options.top_n, options.low_threshold);
    match write_report(&options.report_path, &report) {
        Ok(()) => {
            println!("      Report saved to {}", options.report_path.display());
            outcome.report_file = Some(options.report_path.clone());
        }
        Err(e) => {
            warn!("Failed to write report: {}", e);
            println!("      Could not write the report: {}", e);
        }
    }

    info!(
        "Pipeline finished: {} valid, {} invalid, revenue {:.2}",
        outcome.summary.final_count, outcome.summary.invalid, outcome.total_revenue
    );
    Ok(outcome)
}
