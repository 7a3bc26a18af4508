use crate::analytics::{
    customer_analysis, daily_sales_trend, find_peak_sales_day, low_performing_products,
    region_wise_sales, top_selling_products, total_revenue,
};
use crate::enrich::EnrichmentStats;
use crate::error::SalesAnalyticsError;
use crate::models::{EnrichedTransaction, Transaction};
use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::info;

const RULE: &str = "========================================";
const SECTION_RULE: &str = "----------------------------------------";

/// Format a monetary amount with thousands separators and two decimals
pub(crate) fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fraction
    )
}

/// Render the full text report for a batch. The analytic views are computed
/// here from the valid records; the enriched batch only feeds the match
/// statistics section and may be empty when enrichment was skipped.
pub fn render_report(
    valid: &[Transaction],
    enriched: &[EnrichedTransaction],
    top_n: usize,
    low_threshold: i64,
) -> String {
    let revenue = total_revenue(valid);
    let regions = region_wise_sales(valid);
    let top_products = top_selling_products(valid, top_n);
    let customers = customer_analysis(valid);
    let trend = daily_sales_trend(valid);
    let peak = find_peak_sales_day(valid);
    let low_products = low_performing_products(valid, low_threshold);

    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("        SALES ANALYTICS REPORT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str("SUMMARY\n");
    out.push_str(SECTION_RULE);
    out.push('\n');
    out.push_str(&format!("Valid transactions : {}\n", valid.len()));
    out.push_str(&format!("Total revenue      : ₹{}\n", format_amount(revenue)));
    if peak.date == "No data" {
        out.push_str("Peak sales day     : No data\n");
    } else {
        out.push_str(&format!(
            "Peak sales day     : {} (₹{} across {} transactions)\n",
            peak.date,
            format_amount(peak.revenue),
            peak.transaction_count
        ));
    }
    out.push('\n');

    out.push_str("REGION-WISE SALES\n");
    out.push_str(SECTION_RULE);
    out.push('\n');
    if regions.is_empty() {
        out.push_str("No regional data.\n");
    }
    for region in &regions {
        out.push_str(&format!(
            "{:<12} ₹{:>14}   {:>3} txns   {:>6.2}%\n",
            region.region,
            format_amount(region.total_sales),
            region.transaction_count,
            region.percentage
        ));
    }
    out.push('\n');

    out.push_str(&format!("TOP {} PRODUCTS BY QUANTITY\n", top_n));
    out.push_str(SECTION_RULE);
    out.push('\n');
    if top_products.is_empty() {
        out.push_str("No product data.\n");
    }
    for (rank, product) in top_products.iter().enumerate() {
        out.push_str(&format!(
            "{}. {:<20} {:>5} units   ₹{}\n",
            rank + 1,
            product.product_name,
            product.total_quantity,
            format_amount(product.total_revenue)
        ));
    }
    out.push('\n');

    out.push_str("CUSTOMER ANALYSIS\n");
    out.push_str(SECTION_RULE);
    out.push('\n');
    for customer in &customers {
        out.push_str(&format!(
            "{:<8} ₹{:>14} spent   {:>3} orders   avg ₹{}\n",
            customer.customer_id,
            format_amount(customer.total_spent),
            customer.purchase_count,
            format_amount(customer.avg_order_value)
        ));
        out.push_str(&format!(
            "         products: {}\n",
            customer.products_bought.join(", ")
        ));
    }
    out.push('\n');

    out.push_str("DAILY SALES TREND\n");
    out.push_str(SECTION_RULE);
    out.push('\n');
    for day in &trend {
        let marker = if day.date == peak.date { "  << peak" } else { "" };
        out.push_str(&format!(
            "{:<12} ₹{:>14}   {:>3} txns   {:>3} customers{}\n",
            day.date,
            format_amount(day.revenue),
            day.transaction_count,
            day.unique_customers,
            marker
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "LOW PERFORMING PRODUCTS (quantity < {})\n",
        low_threshold
    ));
    out.push_str(SECTION_RULE);
    out.push('\n');
    if low_products.is_empty() {
        out.push_str("None below the threshold.\n");
    }
    for product in &low_products {
        out.push_str(&format!(
            "{:<20} {:>5} units   ₹{}\n",
            product.product_name,
            product.total_quantity,
            format_amount(product.total_revenue)
        ));
    }
    out.push('\n');

    out.push_str("ENRICHMENT\n");
    out.push_str(SECTION_RULE);
    out.push('\n');
    if enriched.is_empty() {
        out.push_str("No API data available; enrichment was skipped.\n");
    } else {
        let stats = EnrichmentStats::from_batch(enriched);
        out.push_str(&format!(
            "Matched {} of {} transactions ({:.1}%)\n",
            stats.matched,
            stats.total,
            stats.matched_percentage()
        ));
        out.push_str(&format!("Unmatched          : {}\n", stats.unmatched()));
    }
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    out
}

/// Write a rendered report to disk, creating parent directories as needed
pub fn write_report(path: &Path, contents: &str) -> Result<(), SalesAnalyticsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SalesAnalyticsError::OutputFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(path, contents).map_err(|source| SalesAnalyticsError::OutputFile {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Report written to {:?}", path);
    Ok(())
}
