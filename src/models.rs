/// A single sales transaction parsed from the pipe-delimited input
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: String,
    pub region: String,
}

impl Transaction {
    /// Monetary value of the transaction
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Check whether every field is empty, i.e. the row carried no data at all
    pub fn is_blank(&self) -> bool {
        self.transaction_id.is_empty()
            && self.date.is_empty()
            && self.product_id.is_empty()
            && self.product_name.is_empty()
            && self.quantity == 0
            && self.unit_price == 0.0
            && self.customer_id.is_empty()
            && self.region.is_empty()
    }
}

/// A transaction annotated with catalog fields. The source record is kept
/// whole and never mutated by enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub api_category: Option<String>,
    pub api_brand: Option<String>,
    pub api_rating: Option<f64>,
    pub api_match: bool,
}

impl EnrichedTransaction {
    /// Annotation for a record the catalog had nothing for
    pub fn unmatched(transaction: Transaction) -> Self {
        Self {
            transaction,
            api_category: None,
            api_brand: None,
            api_rating: None,
            api_match: false,
        }
    }
}

/// Join strategy used to match transactions against catalog products
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Match the numeric suffix of ProductID against catalog ids
    ById,
    /// Match normalized product names against catalog titles and categories
    ByName,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Transaction {
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

    #[test]
    fn test_transaction_amount() {
        let transaction = sample_transaction();
        assert_eq!(transaction.amount(), 90000.0);

        let zero_quantity = Transaction {
            quantity: 0,
            ..sample_transaction()
        };
        assert_eq!(zero_quantity.amount(), 0.0);
    }

    #[test]
    fn test_transaction_is_blank() {
        let blank = Transaction {
            transaction_id: String::new(),
            date: String::new(),
            product_id: String::new(),
            product_name: String::new(),
            quantity: 0,
            unit_price: 0.0,
            customer_id: String::new(),
            region: String::new(),
        };
        assert!(blank.is_blank());

        // A single populated field makes the row non-blank
        let almost_blank = Transaction {
            region: "North".to_string(),
            ..blank.clone()
        };
        assert!(!almost_blank.is_blank());

        assert!(!sample_transaction().is_blank());
    }

    #[test]
    fn test_enriched_unmatched() {
        let transaction = sample_transaction();
        let enriched = EnrichedTransaction::unmatched(transaction.clone());

        assert_eq!(enriched.transaction, transaction);
        assert_eq!(enriched.api_category, None);
        assert_eq!(enriched.api_brand, None);
        assert_eq!(enriched.api_rating, None);
        assert!(!enriched.api_match);
    }
}
