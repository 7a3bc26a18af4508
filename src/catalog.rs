use crate::error::SalesAnalyticsError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Default DummyJSON-compatible product endpoint
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com/products";

/// One catalog product as the pipeline sees it. Fields missing on the wire
/// have already been replaced with the "Unknown"/zero defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub rating: f64,
}

/// Wire-format product record. Every field is optional because the API
/// omits some of them (brand in particular) for certain products.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl From<RawProduct> for CatalogProduct {
    fn from(raw: RawProduct) -> Self {
        CatalogProduct {
            id: raw.id.unwrap_or(0),
            title: raw.title.unwrap_or_else(|| "Unknown".to_string()),
            category: raw.category.unwrap_or_else(|| "Unknown".to_string()),
            brand: raw.brand.unwrap_or_else(|| "Unknown".to_string()),
            price: raw.price.unwrap_or(0.0),
            rating: raw.rating.unwrap_or(0.0),
        }
    }
}

/// List payload shape: `{"products": [...], "total": ..., ...}`
#[derive(Debug, Deserialize)]
struct ProductsPage {
    products: Vec<RawProduct>,
}

/// The catalog capability the pipeline depends on. Implementations own their
/// retry behavior; callers only see the final result.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of products
    async fn fetch_batch(&self, limit: u32) -> Result<Vec<CatalogProduct>, SalesAnalyticsError>;

    /// Fetch a single product by its numeric id
    async fn fetch_by_id(&self, id: u32) -> Result<CatalogProduct, SalesAnalyticsError>;

    /// Full-text search over the catalog
    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>, SalesAnalyticsError>;
}

/// Endpoint and retry settings for [`HttpCatalogClient`]
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Total request attempts before giving up
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP implementation of [`CatalogClient`] with bounded retries and a
/// fixed delay between attempts
pub struct HttpCatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, SalesAnalyticsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// GET a URL and decode the JSON body. Request and HTTP-status failures
    /// are retried up to the configured attempt count; a body that fails to
    /// decode is a payload error and is not retried.
    async fn get_json<T>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SalesAnalyticsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut last_error: Option<SalesAnalyticsError> = None;

        for attempt in 1..=self.config.max_retries {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match response {
                Ok(response) => match response.text().await {
                    Ok(body) => {
                        return serde_json::from_str(&body)
                            .map_err(|e| SalesAnalyticsError::CatalogPayload(e.to_string()));
                    }
                    Err(e) => {
                        warn!("Attempt {} failed reading body from {}: {}", attempt, url, e);
                        last_error = Some(e.into());
                    }
                },
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt, url, e);
                    last_error = Some(e.into());
                }
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SalesAnalyticsError::CatalogPayload("no request attempts were made".to_string())
        }))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_batch(&self, limit: u32) -> Result<Vec<CatalogProduct>, SalesAnalyticsError> {
        info!("Fetching up to {} products from the catalog", limit);
        let page: ProductsPage = self
            .get_json(&self.config.base_url, &[("limit", limit.to_string())])
            .await?;

        let products: Vec<CatalogProduct> =
            page.products.into_iter().map(CatalogProduct::from).collect();
        info!("Fetched {} catalog products", products.len());
        Ok(products)
    }

    async fn fetch_by_id(&self, id: u32) -> Result<CatalogProduct, SalesAnalyticsError> {
        let url = format!("{}/{}", self.config.base_url, id);
        let raw: RawProduct = self.get_json(&url, &[]).await?;

        if raw.id.is_none() {
            return Err(SalesAnalyticsError::CatalogPayload(format!(
                "product {} response carries no id",
                id
            )));
        }
        Ok(CatalogProduct::from(raw))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>, SalesAnalyticsError> {
        let url = format!("{}/search", self.config.base_url);
        let page: ProductsPage = self.get_json(&url, &[("q", query.to_string())]).await?;

        Ok(page.products.into_iter().map(CatalogProduct::from).collect())
    }
}

/// Build the id-to-product mapping used by the id-keyed join. Products whose
/// id is the 0 sentinel (missing on the wire) are left out; a duplicate id
/// keeps the last occurrence.
pub fn build_product_index(products: &[CatalogProduct]) -> HashMap<u32, CatalogProduct> {
    let mut index = HashMap::with_capacity(products.len());
    for product in products {
        if product.id == 0 {
            continue;
        }
        index.insert(product.id, product.clone());
    }
    index
}

/// Insertion-ordered lookup table keyed by lowercased product titles and
/// category names, used by the name-keyed join. Keys keep the order they
/// were first inserted, which makes the substring fallback deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProductNameIndex {
    keys: Vec<String>,
    entries: HashMap<String, CatalogProduct>,
}

impl ProductNameIndex {
    /// Index a product list: each title maps to its product (later products
    /// overwrite the value but the key keeps its position), and each
    /// category maps to the first product seen in it.
    pub fn build(products: &[CatalogProduct]) -> Self {
        let mut index = ProductNameIndex::default();
        for product in products {
            let title = product.title.trim().to_lowercase();
            if !title.is_empty() {
                index.insert(title, product);
            }
            let category = product.category.trim().to_lowercase();
            if !category.is_empty() && !index.entries.contains_key(&category) {
                index.insert(category, product);
            }
        }
        index
    }

    /// Insert or replace; a replaced key keeps its original position
    fn insert(&mut self, key: String, product: &CatalogProduct) {
        if !self.entries.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.entries.insert(key, product.clone());
    }

    /// Resolve a transaction product name: exact lowercased match first, then
    /// the first key in insertion order that contains the name or is
    /// contained by it
    pub fn lookup(&self, product_name: &str) -> Option<&CatalogProduct> {
        let name = product_name.trim().to_lowercase();
        if let Some(product) = self.entries.get(&name) {
            return Some(product);
        }

        self.keys
            .iter()
            .find(|key| key.contains(name.as_str()) || name.contains(key.as_str()))
            .and_then(|key| self.entries.get(key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
