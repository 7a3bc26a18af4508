use crate::catalog::{build_product_index, CatalogProduct, ProductNameIndex};
use crate::models::{EnrichedTransaction, MatchMode, Transaction};
use std::collections::HashMap;
use tracing::info;

/// Aggregate outcome of an enrichment batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub matched: usize,
}

impl EnrichmentStats {
    pub fn from_batch(batch: &[EnrichedTransaction]) -> Self {
        Self {
            total: batch.len(),
            matched: batch.iter().filter(|record| record.api_match).count(),
        }
    }

    pub fn unmatched(&self) -> usize {
        self.total - self.matched
    }

    /// Share of records that matched, as a percentage. Zero for an empty batch.
    pub fn matched_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 / self.total as f64 * 100.0
        }
    }
}

/// Extract the numeric suffix of a ProductID code: "P101" becomes 101.
/// Any other shape yields None rather than an error.
pub fn extract_numeric_id(product_id: &str) -> Option<u32> {
    product_id.strip_prefix('P')?.parse().ok()
}

/// Catalog fields copied onto a matched record
fn annotate(transaction: &Transaction, product: &CatalogProduct) -> EnrichedTransaction {
    EnrichedTransaction {
        transaction: transaction.clone(),
        api_category: Some(product.category.clone()),
        api_brand: Some(product.brand.clone()),
        api_rating: Some(product.rating),
        api_match: true,
    }
}

/// Id-keyed join: the numeric suffix of each ProductID is looked up in the
/// catalog index. Misses keep the record with no catalog fields at all.
pub fn enrich_by_id(
    transactions: &[Transaction],
    index: &HashMap<u32, CatalogProduct>,
) -> Vec<EnrichedTransaction> {
    let mut enriched = Vec::with_capacity(transactions.len());

    for transaction in transactions {
        let product =
            extract_numeric_id(&transaction.product_id).and_then(|id| index.get(&id));

        enriched.push(match product {
            Some(product) => annotate(transaction, product),
            None => EnrichedTransaction::unmatched(transaction.clone()),
        });
    }

    enriched
}

/// Name-keyed join: product names are resolved against the title/category
/// index. Misses keep the record with the legacy "Unknown"/zero defaults.
pub fn enrich_by_name(
    transactions: &[Transaction],
    index: &ProductNameIndex,
) -> Vec<EnrichedTransaction> {
    let mut enriched = Vec::with_capacity(transactions.len());

    for transaction in transactions {
        enriched.push(match index.lookup(&transaction.product_name) {
            Some(product) => annotate(transaction, product),
            None => EnrichedTransaction {
                transaction: transaction.clone(),
                api_category: Some("Unknown".to_string()),
                api_brand: Some("Unknown".to_string()),
                api_rating: Some(0.0),
                api_match: false,
            },
        });
    }

    enriched
}

/// Run the selected join strategy over a batch and report match statistics.
/// Output order always mirrors input order, one annotated record per input.
pub fn enrich_transactions(
    transactions: &[Transaction],
    products: &[CatalogProduct],
    mode: MatchMode,
) -> (Vec<EnrichedTransaction>, EnrichmentStats) {
    let enriched = match mode {
        MatchMode::ById => {
            let index = build_product_index(products);
            enrich_by_id(transactions, &index)
        }
        MatchMode::ByName => {
            let index = ProductNameIndex::build(products);
            enrich_by_name(transactions, &index)
        }
    };

    let stats = EnrichmentStats::from_batch(&enriched);
    info!(
        "Enriched {}/{} transactions ({:.1}%)",
        stats.matched,
        stats.total,
        stats.matched_percentage()
    );
    (enriched, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(id: &str, product_id: &str, product_name: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            date: "2024-12-01".to_string(),
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            quantity: 1,
            unit_price: 1000.0,
            customer_id: "C001".to_string(),
            region: "North".to_string(),
        }
    }

    fn laptop() -> CatalogProduct {
        CatalogProduct {
            id: 101,
            title: "Laptop".to_string(),
            category: "laptops".to_string(),
            brand: "Dell".to_string(),
            price: 45000.0,
            rating: 4.2,
        }
    }

    #[test]
    fn test_extract_numeric_id() {
        assert_eq!(extract_numeric_id("P101"), Some(101));
        assert_eq!(extract_numeric_id("P001"), Some(1));
        assert_eq!(extract_numeric_id("101"), None);
        assert_eq!(extract_numeric_id("Q101"), None);
        assert_eq!(extract_numeric_id("Pabc"), None);
        assert_eq!(extract_numeric_id("P"), None);
        assert_eq!(extract_numeric_id(""), None);
    }

    #[test]
    fn test_enrich_by_id_match() {
        let transactions = vec![transaction("T001", "P101", "Laptop")];
        let index = build_product_index(&[laptop()]);

        let enriched = enrich_by_id(&transactions, &index);

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].transaction, transactions[0]);
        assert_eq!(enriched[0].api_category.as_deref(), Some("laptops"));
        assert_eq!(enriched[0].api_brand.as_deref(), Some("Dell"));
        assert_eq!(enriched[0].api_rating, Some(4.2));
        assert!(enriched[0].api_match);
    }

    #[test]
    fn test_enrich_by_id_miss_keeps_record_bare() {
        let transactions = vec![transaction("T002", "P999", "Projector")];
        let index = build_product_index(&[laptop()]);

        let enriched = enrich_by_id(&transactions, &index);

        assert_eq!(enriched[0].api_category, None);
        assert_eq!(enriched[0].api_brand, None);
        assert_eq!(enriched[0].api_rating, None);
        assert!(!enriched[0].api_match);
    }

    #[test]
    fn test_enrich_by_id_empty_index_matches_nothing() {
        let transactions = vec![
            transaction("T001", "P101", "Laptop"),
            transaction("T002", "P102", "Mouse"),
        ];
        let enriched = enrich_by_id(&transactions, &HashMap::new());

        assert_eq!(enriched.len(), 2);
        assert!(enriched.iter().all(|record| !record.api_match));
    }

    #[test]
    fn test_enrich_by_name_match() {
        let transactions = vec![transaction("T001", "P101", "LAPTOP")];
        let index = ProductNameIndex::build(&[laptop()]);

        let enriched = enrich_by_name(&transactions, &index);

        assert!(enriched[0].api_match);
        assert_eq!(enriched[0].api_brand.as_deref(), Some("Dell"));
    }

    #[test]
    fn test_enrich_by_name_miss_uses_unknown_defaults() {
        let transactions = vec![transaction("T002", "P999", "Projector")];
        let index = ProductNameIndex::build(&[laptop()]);

        let enriched = enrich_by_name(&transactions, &index);

        assert!(!enriched[0].api_match);
        assert_eq!(enriched[0].api_category.as_deref(), Some("Unknown"));
        assert_eq!(enriched[0].api_brand.as_deref(), Some("Unknown"));
        assert_eq!(enriched[0].api_rating, Some(0.0));
    }

    #[test]
    fn test_enrich_preserves_order_and_length() {
        let transactions = vec![
            transaction("T001", "P101", "Laptop"),
            transaction("T002", "P999", "Projector"),
            transaction("T003", "P101", "Laptop"),
        ];
        let (enriched, stats) =
            enrich_transactions(&transactions, &[laptop()], MatchMode::ById);

        assert_eq!(enriched.len(), 3);
        let ids: Vec<&str> = enriched
            .iter()
            .map(|record| record.transaction.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["T001", "T002", "T003"]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched(), 1);
    }

    #[test]
    fn test_enrichment_stats_percentage() {
        let stats = EnrichmentStats {
            total: 4,
            matched: 2,
        };
        assert_eq!(stats.matched_percentage(), 50.0);

        let empty = EnrichmentStats::default();
        assert_eq!(empty.matched_percentage(), 0.0);
    }

    #[test]
    fn test_enrich_transactions_by_name_mode() {
        let transactions = vec![
            transaction("T001", "P101", "Gaming Laptop Pro"),
            transaction("T002", "P102", "Teapot"),
        ];
        let (enriched, stats) =
            enrich_transactions(&transactions, &[laptop()], MatchMode::ByName);

        // Substring fallback matches the first record only
        assert!(enriched[0].api_match);
        assert!(!enriched[1].api_match);
        assert_eq!(stats.matched, 1);
    }
}
