use crate::error::SalesAnalyticsError;
use crate::models::Transaction;
use anyhow::Result;
use futures::stream::StreamExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::{info, warn};

// Number of pipe-delimited fields in a well-formed sales line
const FIELD_COUNT: usize = 8;

/// Read the data lines of a sales file: the header row is discarded, blank
/// lines are dropped and the rest are trimmed.
///
/// Input is expected to be UTF-8. A file that fails UTF-8 decoding is
/// re-read as Latin-1 so legacy exports still load. A missing or unreadable
/// file is fatal.
pub async fn read_sales_lines(path: &Path) -> Result<Vec<String>, SalesAnalyticsError> {
    // Open the file
    let file = File::open(path)
        .await
        .map_err(|source| SalesAnalyticsError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;
    let reader = BufReader::new(file);

    // Create a stream of text lines, skipping the header
    let mut lines = create_line_stream(reader).skip(1);

    let mut raw_lines = Vec::new();
    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    raw_lines.push(trimmed.to_string());
                }
            }
            // Non-UTF-8 byte sequence: re-read the whole file as Latin-1
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                info!("Input is not valid UTF-8, falling back to Latin-1 decoding");
                return read_latin1_lines(path).await;
            }
            Err(source) => {
                return Err(SalesAnalyticsError::InputFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    info!("Read {} data lines from {:?}", raw_lines.len(), path);
    Ok(raw_lines)
}

/// Create a stream of text lines from a reader
fn create_line_stream<R: AsyncRead + Unpin + 'static>(
    reader: BufReader<R>,
) -> impl futures::Stream<Item = Result<String, std::io::Error>> {
    LinesStream::new(tokio::io::AsyncBufReadExt::lines(reader))
}

/// Whole-file fallback for inputs that are not valid UTF-8. Latin-1 maps
/// every byte to the code point of the same value, so this cannot fail.
async fn read_latin1_lines(path: &Path) -> Result<Vec<String>, SalesAnalyticsError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SalesAnalyticsError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;

    let text: String = bytes.iter().map(|&b| b as char).collect();
    let raw_lines: Vec<String> = text
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    info!("Read {} data lines from {:?} as Latin-1", raw_lines.len(), path);
    Ok(raw_lines)
}

/// Parse raw pipe-delimited lines into typed transactions. Parsing is
/// best-effort: malformed lines are logged and skipped, never raised.
pub fn parse_transactions(raw_lines: &[String]) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(raw_lines.len());

    for (line_count, line) in raw_lines.iter().enumerate() {
        match parse_sales_line(line) {
            Ok(transaction) => transactions.push(transaction),
            Err(e) => {
                warn!("Skipping line {}: {}", line_count + 1, e);
            }
        }
    }

    info!(
        "Parsed {} of {} data lines",
        transactions.len(),
        raw_lines.len()
    );
    transactions
}

/// Parse a pipe-delimited line into a Transaction
fn parse_sales_line(line: &str) -> Result<Transaction> {
    // Split the line by pipes
    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() != FIELD_COUNT {
        anyhow::bail!("expected {} fields, got {}", FIELD_COUNT, parts.len());
    }

    // Empty numeric fields default to zero; the validation stage rejects
    // them later as non-positive
    let quantity_field = parts[4].trim().replace(',', "");
    let quantity: i64 = if quantity_field.is_empty() {
        0
    } else {
        quantity_field.parse()?
    };

    let unit_price_field = parts[5].trim().replace(',', "");
    let unit_price: f64 = if unit_price_field.is_empty() {
        0.0
    } else {
        unit_price_field.parse()?
    };

    Ok(Transaction {
        transaction_id: parts[0].trim().to_string(),
        date: parts[1].trim().to_string(),
        product_id: parts[2].trim().to_string(),
        // Stray commas inside product names are stripped, not quoted
        product_name: parts[3].trim().replace(',', ""),
        quantity,
        unit_price,
        customer_id: parts[6].trim().to_string(),
        region: parts[7].trim().to_string(),
    })
}
