//! GPT-4o vision client for reading Japanese invoices.
//!
//! The provider is treated as an opaque function with a best-effort JSON
//! contract: the answer is expected to be a JSON array, possibly wrapped in a
//! markdown code fence, and malformed entries are skipped item by item.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use utoipa::ToSchema;

use crate::ErrorResponse;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

const SYSTEM_PROMPT: &str = "あなたは日本の請求書や納品書を読み取るAIアシスタントです。

画像から以下の情報を抽出してください：
1. 商品名（日本語）
2. 価格（数字のみ、円記号なし）
3. 商品コード（あれば）

注意事項:
- 価格は税込みで記載してください
- 読み取れない項目はスキップしてください
- 数量や単価ではなく、商品ごとの合計金額を抽出してください

必ず以下のJSON形式で返答してください：
[
  {\"name\": \"商品名\", \"price\": 1000, \"product_code\": \"ABC123\"},
  {\"name\": \"別の商品\", \"price\": 500, \"product_code\": null}
]

JSON以外のテキストは含めないでください。";

#[derive(Debug, Error)]
pub enum VisionError {
    /// The vision provider is mandatory for this call; absence is fatal.
    #[error("vision provider credentials are not configured")]
    MissingCredentials,
    #[error("vision provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("vision provider returned an unparseable answer: {0}")]
    MalformedResponse(String),
}

impl ResponseError for VisionError {
    fn status_code(&self) -> StatusCode {
        match self {
            VisionError::MissingCredentials => StatusCode::SERVICE_UNAVAILABLE,
            VisionError::Request(_) | VisionError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            VisionError::MissingCredentials => HttpResponse::ServiceUnavailable()
                .json(ErrorResponse::service_unavailable("AI解析サービスが設定されていません")),
            other => {
                log::error!("invoice parsing failed: {other}");
                HttpResponse::BadGateway()
                    .json(ErrorResponse::bad_gateway("請求書の解析に失敗しました"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
}

impl VisionConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty())?;
        let model = env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self { api_key, model })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParsedInvoiceItem {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub product_code: Option<String>,
}

pub struct VisionClient {
    config: Option<VisionConfig>,
    http: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: Option<VisionConfig>, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(VisionConfig::from_env(), http)
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn parse_invoice(
        &self,
        base64_image: &str,
    ) -> Result<Vec<ParsedInvoiceItem>, VisionError> {
        let config = self.config.as_ref().ok_or(VisionError::MissingCredentials)?;

        let data_url = if base64_image.starts_with("data:") {
            base64_image.to_string()
        } else {
            format!("data:image/jpeg;base64,{base64_image}")
        };

        let payload = serde_json::json!({
            "model": config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": [
                    { "type": "image_url", "image_url": { "url": data_url, "detail": "high" } },
                    { "type": "text", "text": "この請求書から商品名と価格を抽出してJSON形式で返してください。" }
                ]}
            ],
            "max_tokens": 2000,
            "temperature": 0.1,
        });

        let body: serde_json::Value = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VisionError::MalformedResponse("missing message content".to_string()))?;

        parse_items(content)
    }
}

/// Parse the model's answer: strip markdown fences, then read entries
/// tolerantly — anything without a usable shape is skipped, not fatal.
pub(crate) fn parse_items(content: &str) -> Result<Vec<ParsedInvoiceItem>, VisionError> {
    let stripped = strip_code_fences(content.trim());
    let values: Vec<serde_json::Value> = serde_json::from_str(stripped)
        .map_err(|e| VisionError::MalformedResponse(e.to_string()))?;

    Ok(values
        .into_iter()
        .filter_map(|entry| {
            let object = entry.as_object()?;
            let name = object
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("不明")
                .to_string();
            let price = match object.get("price") {
                Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0),
                Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
                _ => 0,
            };
            let product_code = object
                .get("product_code")
                .and_then(|v| v.as_str())
                .map(String::from);
            Some(ParsedInvoiceItem {
                name,
                price,
                product_code,
            })
        })
        .collect())
}

fn strip_code_fences(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_json_array() {
        let items = parse_items(
            r#"[{"name": "キャベツ", "price": 150, "product_code": "A1"},
                {"name": "たまねぎ", "price": 100, "product_code": null}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "キャベツ");
        assert_eq!(items[0].price, 150);
        assert_eq!(items[0].product_code.as_deref(), Some("A1"));
        assert_eq!(items[1].product_code, None);
    }

    #[test]
    fn strips_markdown_fences() {
        let items =
            parse_items("```json\n[{\"name\": \"コーヒー\", \"price\": 300}]\n```").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 300);
    }

    #[test]
    fn tolerates_string_prices_and_missing_names() {
        let items = parse_items(r#"[{"name": "紅茶", "price": "450"}, {"price": 100}, 42]"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, 450);
        assert_eq!(items[1].name, "不明");
    }

    #[test]
    fn non_json_answer_is_a_typed_failure() {
        assert!(matches!(
            parse_items("すみません、読み取れませんでした。"),
            Err(VisionError::MalformedResponse(_))
        ));
    }
}
