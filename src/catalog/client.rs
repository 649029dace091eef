//! JAN code lookup against the Yahoo Japan Shopping API.
//!
//! With no app id configured the client answers from a deterministic mock
//! catalog so development builds work offline. Successful lookups are cached
//! with a bounded TTL; failures degrade to `found: false`.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use utoipa::ToSchema;

const YAHOO_API_URL: &str = "https://shopping.yahooapis.jp/ShoppingWebService/V3/itemSearch";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_TTL: Duration = Duration::from_secs(10 * 60);
const CACHE_CAPACITY: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductLookup {
    pub found: bool,
    pub barcode: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductLookup {
    fn not_found(barcode: &str) -> Self {
        Self {
            found: false,
            barcode: barcode.to_string(),
            name: None,
            price: None,
            image_url: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub app_id: String,
}

impl CatalogConfig {
    pub fn from_env() -> Option<Self> {
        let app_id = env::var("YAHOO_API_KEY").ok().filter(|v| !v.is_empty())?;
        Some(Self { app_id })
    }
}

pub struct CatalogClient {
    config: Option<CatalogConfig>,
    http: reqwest::Client,
    cache: Cache<String, ProductLookup>,
}

impl CatalogClient {
    pub fn new(config: Option<CatalogConfig>, http: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .time_to_live(CACHE_TTL)
            .max_capacity(CACHE_CAPACITY)
            .build();
        Self {
            config,
            http,
            cache,
        }
    }

    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(CatalogConfig::from_env(), http)
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn lookup(&self, jan_code: &str) -> ProductLookup {
        // JAN codes are digits only; anything else short-circuits without a
        // provider call.
        if jan_code.is_empty() || !jan_code.chars().all(|c| c.is_ascii_digit()) {
            return ProductLookup::not_found(jan_code);
        }

        if let Some(hit) = self.cache.get(jan_code).await {
            return hit;
        }

        let result = match &self.config {
            None => mock_product(jan_code),
            Some(config) => match self.query_yahoo(config, jan_code).await {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Yahoo Shopping lookup failed for {jan_code}: {e}");
                    ProductLookup::not_found(jan_code)
                }
            },
        };

        if result.found {
            self.cache.insert(jan_code.to_string(), result.clone()).await;
        }
        result
    }

    async fn query_yahoo(
        &self,
        config: &CatalogConfig,
        jan_code: &str,
    ) -> Result<ProductLookup, reqwest::Error> {
        let response = self
            .http
            .get(YAHOO_API_URL)
            .query(&[
                ("appid", config.app_id.as_str()),
                ("jan_code", jan_code),
                ("results", "1"),
                ("sort", "-score"),
            ])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ProductLookup::not_found(jan_code));
        }

        let data: serde_json::Value = response.json().await?;

        let total = data
            .get("totalResultsAvailable")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        if total == 0 {
            return Ok(ProductLookup::not_found(jan_code));
        }
        let Some(item) = data.pointer("/hits/0") else {
            return Ok(ProductLookup::not_found(jan_code));
        };

        Ok(ProductLookup {
            found: true,
            barcode: jan_code.to_string(),
            name: item.get("name").and_then(|v| v.as_str()).map(String::from),
            price: item.get("price").and_then(value_as_i64),
            image_url: extract_image_url(item),
            category: extract_category(item),
        })
    }
}

fn value_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Prefer the medium image, fall back to small.
fn extract_image_url(item: &serde_json::Value) -> Option<String> {
    for size in ["medium", "small"] {
        if let Some(url) = item.pointer(&format!("/image/{size}")).and_then(|v| v.as_str()) {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }
    }
    None
}

fn extract_category(item: &serde_json::Value) -> Option<String> {
    let depth = item
        .pointer("/genreCategory/depth")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    if depth > 0 {
        item.pointer("/genreCategory/name")
            .and_then(|v| v.as_str())
            .map(String::from)
    } else {
        None
    }
}

/// Deterministic development catalog: a few well-known JAN codes, and a
/// generic product for everything else so the scan flow stays demoable.
fn mock_product(jan_code: &str) -> ProductLookup {
    let known: &[(&str, &str, i64, &str, &str)] = &[
        (
            "4901201103742",
            "アサヒ スーパードライ 350ml",
            220,
            "https://via.placeholder.com/150?text=Asahi",
            "ビール・発泡酒",
        ),
        (
            "4901777254923",
            "サントリー 烏龍茶 500ml",
            130,
            "https://via.placeholder.com/150?text=Oolong",
            "お茶飲料",
        ),
        (
            "4902102112154",
            "コカ・コーラ 500ml",
            150,
            "https://via.placeholder.com/150?text=Coke",
            "炭酸飲料",
        ),
        (
            "4901681740413",
            "サントリー角瓶 700ml",
            1200,
            "https://via.placeholder.com/150?text=Kakubin",
            "ウイスキー",
        ),
    ];

    if let Some((barcode, name, price, image, category)) =
        known.iter().find(|(code, ..)| *code == jan_code)
    {
        return ProductLookup {
            found: true,
            barcode: barcode.to_string(),
            name: Some(name.to_string()),
            price: Some(*price),
            image_url: Some(image.to_string()),
            category: Some(category.to_string()),
        };
    }

    let tail = &jan_code[jan_code.len().saturating_sub(4)..];
    ProductLookup {
        found: true,
        barcode: jan_code.to_string(),
        name: Some(format!("テスト商品 ({tail})")),
        price: Some(500),
        image_url: Some("https://via.placeholder.com/150?text=Product".to_string()),
        category: Some("その他".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_digit_barcodes_short_circuit() {
        let client = CatalogClient::new(None, reqwest::Client::new());
        let result = client.lookup("ABC123").await;
        assert!(!result.found);
        assert_eq!(result.barcode, "ABC123");
    }

    #[tokio::test]
    async fn unconfigured_lookup_answers_from_the_mock_catalog() {
        let client = CatalogClient::new(None, reqwest::Client::new());

        let known = client.lookup("4901201103742").await;
        assert!(known.found);
        assert_eq!(known.name.as_deref(), Some("アサヒ スーパードライ 350ml"));
        assert_eq!(known.price, Some(220));

        let generic = client.lookup("4900000001111").await;
        assert!(generic.found);
        assert_eq!(generic.name.as_deref(), Some("テスト商品 (1111)"));
    }

    #[tokio::test]
    async fn repeated_lookups_are_served_from_cache() {
        let client = CatalogClient::new(None, reqwest::Client::new());
        let first = client.lookup("4902102112154").await;
        let second = client.lookup("4902102112154").await;
        assert_eq!(first.name, second.name);
        assert!(client.cache.get("4902102112154").await.is_some());
    }
}
