//! ClickSend fax transport.
//!
//! Two-step dispatch: upload the PDF (converted for fax), then queue the fax
//! against the returned file URL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::env;

use super::{confirmation_id, TransportError};

const CLICKSEND_API_URL: &str = "https://rest.clicksend.com/v3";
const FAX_SOURCE: &str = "ReplenMobile";

#[derive(Debug, Clone)]
pub struct ClickSendConfig {
    pub username: String,
    pub api_key: String,
    pub api_url: String,
}

impl ClickSendConfig {
    pub fn from_env() -> Option<Self> {
        let username = env::var("CLICKSEND_USERNAME")
            .ok()
            .filter(|v| !v.is_empty())?;
        let api_key = env::var("CLICKSEND_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            username,
            api_key,
            api_url: CLICKSEND_API_URL.to_string(),
        })
    }
}

#[derive(Debug)]
pub enum FaxOutcome {
    Sent { message_id: Option<String> },
    Simulated { confirmation_id: String },
}

pub struct FaxTransport {
    config: Option<ClickSendConfig>,
    http: reqwest::Client,
}

impl FaxTransport {
    pub fn new(config: Option<ClickSendConfig>, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(ClickSendConfig::from_env(), http)
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn send(&self, pdf: &[u8], fax_number: &str) -> Result<FaxOutcome, TransportError> {
        let Some(config) = &self.config else {
            return Ok(FaxOutcome::Simulated {
                confirmation_id: confirmation_id("DEV"),
            });
        };

        let upload: serde_json::Value = self
            .http
            .post(format!("{}/uploads", config.api_url))
            .basic_auth(&config.username, Some(&config.api_key))
            .json(&serde_json::json!({
                "content": BASE64.encode(pdf),
                "convert": "fax",
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let file_url = upload
            .pointer("/data/_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                TransportError::Rejected("upload response did not contain a file URL".to_string())
            })?;

        let response = self
            .http
            .post(format!("{}/fax/send", config.api_url))
            .basic_auth(&config.username, Some(&config.api_key))
            .json(&serde_json::json!({
                "file_url": file_url,
                "messages": [{
                    "to": fax_number,
                    "source": FAX_SOURCE,
                    "schedule": 0,
                    "custom_string": format!("Order-{}", chrono::Local::now().format("%Y%m%d%H%M%S")),
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("ClickSend fax send failed ({status}): {body}");
            return Err(TransportError::Rejected(format!(
                "fax provider returned {status}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let message_id = body
            .pointer("/data/messages/0/message_id")
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        Ok(FaxOutcome::Sent { message_id })
    }
}
