use crate::models::Transaction;
use crate::validate::check_record;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Optional refinements applied after rule validation
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Keep only this region (case-insensitive exact match)
    pub region: Option<String>,
    /// Keep only transactions with amount >= this bound
    pub min_amount: Option<f64>,
    /// Keep only transactions with amount <= this bound
    pub max_amount: Option<f64>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }
}

/// Counts produced while validating and filtering a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

/// Inclusive amount range of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Distinct regions and the amount spread of a batch, shown before filter
/// criteria are chosen
#[derive(Debug, Clone, PartialEq)]
pub struct DataOverview {
    pub regions: Vec<String>,
    pub amount_range: Option<AmountRange>,
}

/// Summarize the distinct regions (sorted) and the amount range of a batch.
/// An empty batch has no amount range.
pub fn data_overview(records: &[Transaction]) -> DataOverview {
    let regions: Vec<String> = records
        .iter()
        .map(|record| record.region.trim())
        .filter(|region| !region.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let amounts: Vec<f64> = records.iter().map(Transaction::amount).collect();
    let amount_range = if amounts.is_empty() {
        None
    } else {
        let min = amounts.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = amounts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let avg = amounts.iter().sum::<f64>() / amounts.len() as f64;
        Some(AmountRange { min, max, avg })
    };

    DataOverview {
        regions,
        amount_range,
    }
}

/// Keep only transactions whose region matches, ignoring case
pub fn filter_by_region(records: &[Transaction], region: &str) -> Vec<Transaction> {
    let wanted = region.to_lowercase();
    records
        .iter()
        .filter(|record| record.region.to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Keep only transactions whose amount lies within the inclusive bounds.
/// A missing bound leaves that side open.
pub fn filter_by_amount(
    records: &[Transaction],
    min_amount: Option<f64>,
    max_amount: Option<f64>,
) -> Vec<Transaction> {
    records
        .iter()
        .filter(|record| {
            let amount = record.amount();
            if let Some(min) = min_amount {
                if amount < min {
                    return false;
                }
            }
            if let Some(max) = max_amount {
                if amount > max {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Validate a batch, then apply the optional region and amount refinements.
///
/// Returns the surviving records in their original order, together with
/// counts of everything removed along the way. Filters only ever see records
/// that passed validation.
pub fn validate_and_filter(
    records: &[Transaction],
    criteria: &FilterCriteria,
) -> (Vec<Transaction>, FilterSummary) {
    let mut summary = FilterSummary {
        total_input: records.len(),
        ..Default::default()
    };

    let mut valid: Vec<Transaction> = Vec::with_capacity(records.len());
    for record in records {
        match check_record(record) {
            Ok(()) => valid.push(record.clone()),
            Err(violation) => {
                summary.invalid += 1;
                debug!(
                    "Invalid record {}: {}",
                    record.transaction_id, violation
                );
            }
        }
    }
    info!(
        "Validation kept {} of {} records",
        valid.len(),
        summary.total_input
    );

    if let Some(region) = &criteria.region {
        let before = valid.len();
        valid = filter_by_region(&valid, region);
        summary.filtered_by_region = before - valid.len();
        info!("Region filter '{}' kept {} records", region, valid.len());
    }

    if criteria.min_amount.is_some() || criteria.max_amount.is_some() {
        let before = valid.len();
        valid = filter_by_amount(&valid, criteria.min_amount, criteria.max_amount);
        summary.filtered_by_amount = before - valid.len();
        info!("Amount filter kept {} records", valid.len());
    }

    summary.final_count = valid.len();
    (valid, summary)
}
