use crate::models::Transaction;
use std::fmt;
use tracing::debug;

/// First business rule a record violates, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    MissingField(&'static str),
    BadTransactionPrefix,
    BadProductPrefix,
    BadCustomerPrefix,
    NonPositiveQuantity,
    NonPositivePrice,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::MissingField(name) => write!(f, "missing field {}", name),
            RuleViolation::BadTransactionPrefix => {
                write!(f, "TransactionID must start with 'T'")
            }
            RuleViolation::BadProductPrefix => write!(f, "ProductID must start with 'P'"),
            RuleViolation::BadCustomerPrefix => write!(f, "CustomerID must start with 'C'"),
            RuleViolation::NonPositiveQuantity => write!(f, "Quantity must be positive"),
            RuleViolation::NonPositivePrice => write!(f, "UnitPrice must be positive"),
        }
    }
}

/// Check every business rule against a record. Rules short-circuit: field
/// presence first, then the ID prefixes, then numeric positivity, and only
/// the first violation is reported.
pub fn check_record(transaction: &Transaction) -> Result<(), RuleViolation> {
    // Quantity and UnitPrice are typed and therefore always present
    let presence = [
        ("TransactionID", &transaction.transaction_id),
        ("Date", &transaction.date),
        ("ProductID", &transaction.product_id),
        ("ProductName", &transaction.product_name),
        ("CustomerID", &transaction.customer_id),
        ("Region", &transaction.region),
    ];
    for (name, value) in presence {
        if value.trim().is_empty() {
            return Err(RuleViolation::MissingField(name));
        }
    }

    if !transaction.transaction_id.starts_with('T') {
        return Err(RuleViolation::BadTransactionPrefix);
    }
    if !transaction.product_id.starts_with('P') {
        return Err(RuleViolation::BadProductPrefix);
    }
    if !transaction.customer_id.starts_with('C') {
        return Err(RuleViolation::BadCustomerPrefix);
    }
    if transaction.quantity <= 0 {
        return Err(RuleViolation::NonPositiveQuantity);
    }
    if transaction.unit_price <= 0.0 {
        return Err(RuleViolation::NonPositivePrice);
    }

    Ok(())
}

/// Check whether a record passes every rule in [`check_record`]
pub fn is_valid_record(transaction: &Transaction) -> bool {
    check_record(transaction).is_ok()
}

/// Structural cleaning pass, run before rule validation. Partitions records
/// into kept and rejected sets; fully blank rows are discarded without
/// counting toward either. Kept records come back with stray commas removed
/// from the product name, and the input records are never mutated.
///
/// This stage deliberately checks fewer rules than [`check_record`]: it
/// rejects on the TransactionID prefix, missing customer or region, and
/// non-positive numerics, leaving the remaining prefix rules to validation.
pub fn clean_records(records: &[Transaction]) -> (Vec<Transaction>, Vec<Transaction>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for record in records {
        if record.is_blank() {
            debug!("Dropping blank record");
            continue;
        }

        if !record.transaction_id.starts_with('T') {
            invalid.push(record.clone());
            continue;
        }
        if record.customer_id.trim().is_empty() || record.region.trim().is_empty() {
            invalid.push(record.clone());
            continue;
        }
        if record.quantity <= 0 {
            invalid.push(record.clone());
            continue;
        }
        if record.unit_price <= 0.0 {
            invalid.push(record.clone());
            continue;
        }

        let mut cleaned = record.clone();
        cleaned.product_name = cleaned.product_name.replace(',', "");
        valid.push(cleaned);
    }

    debug!(
        "Cleaned {} records: {} kept, {} rejected",
        records.len(),
        valid.len(),
        invalid.len()
    );
    (valid, invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_transaction() -> Transaction {
        Transaction {
            transaction_id: "T001".to_string(),
            date: "2024-12-01".to_string(),
            product_id: "P101".to_string(),
            product_name: "Laptop".to_string(),
            quantity: 2,
            unit_price: 45000.0,
            customer_id: "C001".to_string(),
            region: "North".to_string(),
        }
    }

    fn blank_transaction() -> Transaction {
        Transaction {
            transaction_id: String::new(),
            date: String::new(),
            product_id: String::new(),
            product_name: String::new(),
            quantity: 0,
            unit_price: 0.0,
            customer_id: String::new(),
            region: String::new(),
        }
    }

    // Tests for check_record
    #[test]
    fn test_check_record_valid() {
        assert_eq!(check_record(&valid_transaction()), Ok(()));
        assert!(is_valid_record(&valid_transaction()));
    }

    #[test]
    fn test_check_record_missing_fields() {
        let mut tx = valid_transaction();
        tx.date = String::new();
        assert_eq!(check_record(&tx), Err(RuleViolation::MissingField("Date")));

        let mut tx = valid_transaction();
        tx.region = "   ".to_string();
        assert_eq!(check_record(&tx), Err(RuleViolation::MissingField("Region")));
    }

    #[test]
    fn test_check_record_bad_prefixes() {
        let mut tx = valid_transaction();
        tx.transaction_id = "X001".to_string();
        assert_eq!(check_record(&tx), Err(RuleViolation::BadTransactionPrefix));

        let mut tx = valid_transaction();
        tx.product_id = "Q101".to_string();
        assert_eq!(check_record(&tx), Err(RuleViolation::BadProductPrefix));

        let mut tx = valid_transaction();
        tx.customer_id = "K001".to_string();
        assert_eq!(check_record(&tx), Err(RuleViolation::BadCustomerPrefix));
    }

    #[test]
    fn test_check_record_non_positive_numerics() {
        let mut tx = valid_transaction();
        tx.quantity = 0;
        assert_eq!(check_record(&tx), Err(RuleViolation::NonPositiveQuantity));

        let mut tx = valid_transaction();
        tx.quantity = -3;
        assert_eq!(check_record(&tx), Err(RuleViolation::NonPositiveQuantity));

        let mut tx = valid_transaction();
        tx.unit_price = 0.0;
        assert_eq!(check_record(&tx), Err(RuleViolation::NonPositivePrice));

        let mut tx = valid_transaction();
        tx.unit_price = -1.5;
        assert_eq!(check_record(&tx), Err(RuleViolation::NonPositivePrice));
    }

    #[test]
    fn test_check_record_reports_first_violation_only() {
        // Missing date beats the bad prefix because presence runs first
        let mut tx = valid_transaction();
        tx.transaction_id = "X001".to_string();
        tx.date = String::new();
        assert_eq!(check_record(&tx), Err(RuleViolation::MissingField("Date")));

        // Bad prefix beats the non-positive quantity
        let mut tx = valid_transaction();
        tx.transaction_id = "X001".to_string();
        tx.quantity = 0;
        assert_eq!(check_record(&tx), Err(RuleViolation::BadTransactionPrefix));
    }

    // Tests for clean_records
    #[test]
    fn test_clean_records_partitions() {
        let mut bad_prefix = valid_transaction();
        bad_prefix.transaction_id = "X002".to_string();

        let mut no_customer = valid_transaction();
        no_customer.transaction_id = "T003".to_string();
        no_customer.customer_id = String::new();

        let mut zero_price = valid_transaction();
        zero_price.transaction_id = "T004".to_string();
        zero_price.unit_price = 0.0;

        let records = vec![
            valid_transaction(),
            bad_prefix,
            no_customer,
            zero_price,
        ];
        let (valid, invalid) = clean_records(&records);

        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].transaction_id, "T001");
        assert_eq!(invalid.len(), 3);
    }

    #[test]
    fn test_clean_records_drops_blank_rows_silently() {
        let records = vec![blank_transaction(), valid_transaction(), blank_transaction()];
        let (valid, invalid) = clean_records(&records);

        // Blank rows count as neither kept nor rejected
        assert_eq!(valid.len(), 1);
        assert_eq!(invalid.len(), 0);
    }

    #[test]
    fn test_clean_records_strips_commas_from_product_name() {
        let mut tx = valid_transaction();
        tx.product_name = "Wireless, Mouse".to_string();

        let records = vec![tx];
        let (valid, _) = clean_records(&records);

        assert_eq!(valid[0].product_name, "Wireless Mouse");
        // The input record is untouched
        assert_eq!(records[0].product_name, "Wireless, Mouse");
    }

    #[test]
    fn test_clean_records_keeps_product_prefix_rule_out_of_scope() {
        // A bad ProductID prefix survives cleaning; validation catches it
        let mut tx = valid_transaction();
        tx.product_id = "Q101".to_string();

        let (valid, invalid) = clean_records(&[tx.clone()]);

        assert_eq!(valid.len(), 1);
        assert_eq!(invalid.len(), 0);
        assert!(!is_valid_record(&tx));
    }

    #[test]
    fn test_clean_records_missing_region() {
        let mut tx = valid_transaction();
        tx.region = "  ".to_string();

        let (valid, invalid) = clean_records(&[tx]);

        assert_eq!(valid.len(), 0);
        assert_eq!(invalid.len(), 1);
    }
}
