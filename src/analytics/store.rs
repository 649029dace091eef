//! Row access for analytics queries via the Supabase REST surface.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use postgrest::Postgrest;
use serde::Deserialize;
use std::env;
use thiserror::Error;

use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("analytics store credentials are not configured")]
    NotConfigured,
    #[error("analytics store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("analytics store returned status {0}")]
    Store(reqwest::StatusCode),
    #[error("analytics store returned malformed rows: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ResponseError for AnalyticsError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AnalyticsError::NotConfigured => HttpResponse::ServiceUnavailable().json(
                ErrorResponse::service_unavailable("分析サービスが設定されていません"),
            ),
            other => {
                log::error!("analytics query failed: {other}");
                HttpResponse::BadGateway()
                    .json(ErrorResponse::bad_gateway("分析データの取得に失敗しました"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub supabase_url: String,
    pub service_key: String,
}

impl AnalyticsConfig {
    pub fn from_env() -> Option<Self> {
        let supabase_url = env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| v.trim_end_matches('/').to_string())?;
        let service_key = env::var("SUPABASE_SERVICE_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| env::var("SUPABASE_ANON_KEY").ok().filter(|v| !v.is_empty()))?;
        Some(Self {
            supabase_url,
            service_key,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRow {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

pub struct AnalyticsStore {
    config: Option<AnalyticsConfig>,
}

impl AnalyticsStore {
    pub fn new(config: Option<AnalyticsConfig>) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(AnalyticsConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Fresh REST builder per query; the builder is cheap and carries no
    /// connection state of its own.
    fn client(&self) -> Result<Postgrest, AnalyticsError> {
        let config = self.config.as_ref().ok_or(AnalyticsError::NotConfigured)?;
        Ok(Postgrest::new(format!("{}/rest/v1", config.supabase_url))
            .insert_header("apikey", config.service_key.as_str())
            .insert_header("Authorization", format!("Bearer {}", config.service_key)))
    }

    pub async fn fetch_orders(
        &self,
        select: &str,
        order: Option<&str>,
    ) -> Result<Vec<OrderRow>, AnalyticsError> {
        let mut builder = self.client()?.from("orders").select(select);
        if let Some(order) = order {
            builder = builder.order(order);
        }
        let response = builder.execute().await?;
        if !response.status().is_success() {
            return Err(AnalyticsError::Store(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_order_items(&self, select: &str) -> Result<Vec<OrderItemRow>, AnalyticsError> {
        let response = self.client()?.from("order_items").select(select).execute().await?;
        if !response.status().is_success() {
            return Err(AnalyticsError::Store(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
