use crate::error::SalesAnalyticsError;
use crate::models::EnrichedTransaction;
use std::fs;
use std::path::Path;
use tracing::info;

// Column order of the enriched output file
const COLUMNS: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

/// Escape literal pipes so the delimiter stays unambiguous
fn escape(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Render a float the shortest way that round-trips, so whole numbers keep
/// a trailing ".0" (45000 prints as "45000.0")
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn format_row(record: &EnrichedTransaction) -> String {
    let tx = &record.transaction;
    let values = [
        tx.transaction_id.clone(),
        tx.date.clone(),
        tx.product_id.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        format_float(tx.unit_price),
        tx.customer_id.clone(),
        tx.region.clone(),
        record.api_category.clone().unwrap_or_default(),
        record.api_brand.clone().unwrap_or_default(),
        record.api_rating.map(format_float).unwrap_or_default(),
        if record.api_match { "True" } else { "False" }.to_string(),
    ];

    values
        .iter()
        .map(|value| escape(value))
        .collect::<Vec<_>>()
        .join("|")
}

/// Write the enriched batch as a pipe-delimited file, header first, one row
/// per record in batch order. Parent directories are created as needed.
/// Returns the number of data rows written.
pub fn write_enriched_file(
    path: &Path,
    records: &[EnrichedTransaction],
) -> Result<usize, SalesAnalyticsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SalesAnalyticsError::OutputFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let mut contents = String::with_capacity(records.len() * 80);
    contents.push_str(&COLUMNS.join("|"));
    contents.push('\n');
    for record in records {
        contents.push_str(&format_row(record));
        contents.push('\n');
    }

    fs::write(path, contents).map_err(|source| SalesAnalyticsError::OutputFile {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Saved {} enriched transactions to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use std::fs::read_to_string;
    use tempfile::tempdir;

    fn enriched_match() -> EnrichedTransaction {
        EnrichedTransaction {
            transaction: Transaction {
                transaction_id: "T001".to_string(),
                date: "2024-12-01".to_string(),
                product_id: "P101".to_string(),
                product_name: "Laptop".to_string(),
                quantity: 2,
                unit_price: 45000.0,
                customer_id: "C001".to_string(),
                region: "North".to_string(),
            },
            api_category: Some("laptops".to_string()),
            api_brand: Some("Dell".to_string()),
            api_rating: Some(4.2),
            api_match: true,
        }
    }

    #[test]
    fn test_format_row_matched() {
        let row = format_row(&enriched_match());
        assert_eq!(
            row,
            "T001|2024-12-01|P101|Laptop|2|45000.0|C001|North|laptops|Dell|4.2|True"
        );
    }

    #[test]
    fn test_format_row_unmatched_has_empty_catalog_columns() {
        let mut record = enriched_match();
        record.api_category = None;
        record.api_brand = None;
        record.api_rating = None;
        record.api_match = false;

        let row = format_row(&record);
        assert!(row.ends_with("|C001|North||||False"));
    }

    #[test]
    fn test_format_row_escapes_pipes() {
        let mut record = enriched_match();
        record.transaction.product_name = "Mouse|Pad".to_string();

        let row = format_row(&record);
        assert!(row.contains("Mouse\\|Pad"));
        // Still exactly 12 unescaped delimiters' worth of columns
        assert_eq!(row.matches('|').count() - row.matches("\\|").count(), 11);
    }

    #[test]
    fn test_float_rendering_keeps_trailing_zero() {
        assert_eq!(format_float(45000.0), "45000.0");
        assert_eq!(format_float(4.2), "4.2");
        assert_eq!(format_float(0.0), "0.0");
    }

    #[test]
    fn test_write_enriched_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("reports").join("enriched_sales_data.txt");

        let records = vec![enriched_match()];
        let written = write_enriched_file(&file_path, &records).unwrap();
        assert_eq!(written, 1);

        let contents = read_to_string(&file_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region|API_Category|API_Brand|API_Rating|API_Match"
        );
        assert!(lines[1].starts_with("T001|"));
        assert!(lines[1].ends_with("|True"));
    }

    #[test]
    fn test_write_enriched_file_empty_batch_writes_header_only() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.txt");

        let written = write_enriched_file(&file_path, &[]).unwrap();
        assert_eq!(written, 0);

        let contents = read_to_string(&file_path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }
}
