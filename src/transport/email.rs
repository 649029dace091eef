//! Email transport.
//!
//! Provider preference: Resend REST API when a key is configured, otherwise
//! direct SMTP, otherwise simulation. Both live providers accept the same
//! inputs: destination, subject, HTML body, plain-text body, optional PDF
//! attachment.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::env;
use std::time::Duration;

use super::{confirmation_id, TransportError};

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl SmtpConfig {
    pub fn from_env() -> Option<Self> {
        let username = env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty())?;
        let password = env::var("SMTP_PASSWORD").ok().filter(|v| !v.is_empty())?;
        let host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(587);
        let from_email = env::var("SMTP_FROM_EMAIL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| username.clone());
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "ReplenMobile".to_string());

        Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from_email: String,
}

impl ResendConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("RESEND_API_KEY").ok().filter(|v| !v.is_empty())?;
        let from_email =
            env::var("RESEND_FROM_EMAIL").unwrap_or_else(|_| "orders@yourdomain.com".to_string());
        Some(Self {
            api_key,
            from_email,
        })
    }
}

pub struct EmailAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum EmailOutcome {
    Sent { message_id: Option<String> },
    Simulated { confirmation_id: String },
}

pub struct EmailTransport {
    resend: Option<ResendConfig>,
    smtp: Option<SmtpConfig>,
    http: reqwest::Client,
}

impl EmailTransport {
    pub fn new(
        resend: Option<ResendConfig>,
        smtp: Option<SmtpConfig>,
        http: reqwest::Client,
    ) -> Self {
        Self { resend, smtp, http }
    }

    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(ResendConfig::from_env(), SmtpConfig::from_env(), http)
    }

    pub fn has_resend(&self) -> bool {
        self.resend.is_some()
    }

    pub fn has_smtp(&self) -> bool {
        self.smtp.is_some()
    }

    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
        attachment: Option<EmailAttachment>,
    ) -> Result<EmailOutcome, TransportError> {
        if let Some(resend) = &self.resend {
            return self
                .send_resend(resend, to, subject, html, text, attachment)
                .await;
        }
        if let Some(smtp) = &self.smtp {
            return send_smtp(smtp, to, subject, html, text, attachment).await;
        }
        Ok(EmailOutcome::Simulated {
            confirmation_id: confirmation_id("DEV-EMAIL"),
        })
    }

    async fn send_resend(
        &self,
        config: &ResendConfig,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
        attachment: Option<EmailAttachment>,
    ) -> Result<EmailOutcome, TransportError> {
        let mut payload = serde_json::json!({
            "from": config.from_email,
            "to": [to],
            "subject": subject,
            "html": html,
            "text": text,
        });
        if let Some(att) = attachment {
            payload["attachments"] = serde_json::json!([{
                "filename": att.filename,
                "content": BASE64.encode(&att.bytes),
            }]);
        }

        let response = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Resend send failed ({status}): {body}");
            return Err(TransportError::Rejected(format!(
                "email provider returned {status}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(EmailOutcome::Sent {
            message_id: body.get("id").and_then(|v| v.as_str()).map(String::from),
        })
    }
}

async fn send_smtp(
    config: &SmtpConfig,
    to: &str,
    subject: &str,
    html: &str,
    text: &str,
    attachment: Option<EmailAttachment>,
) -> Result<EmailOutcome, TransportError> {
    let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
        .parse()
        .map_err(|e: lettre::address::AddressError| TransportError::Smtp(e.to_string()))?;
    let to_mailbox: Mailbox = to
        .parse()
        .map_err(|e: lettre::address::AddressError| {
            TransportError::InvalidRecipient(e.to_string())
        })?;

    let alternative = MultiPart::alternative_plain_html(text.to_string(), html.to_string());
    let builder = Message::builder().from(from).to(to_mailbox).subject(subject);
    let message = match attachment {
        Some(att) => {
            let content_type = ContentType::parse("application/pdf")
                .map_err(|e| TransportError::Smtp(e.to_string()))?;
            let part = Attachment::new(att.filename).body(att.bytes, content_type);
            builder.multipart(MultiPart::mixed().multipart(alternative).singlepart(part))
        }
        None => builder.multipart(alternative),
    }
    .map_err(|e| TransportError::Smtp(e.to_string()))?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        .map_err(|e| TransportError::Smtp(e.to_string()))?
        .port(config.port)
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    mailer.send(message).await.map_err(|e| {
        log::error!("SMTP send failed: {e}");
        TransportError::Smtp(e.to_string())
    })?;

    // SMTP has no provider message id; issue a local receipt.
    Ok(EmailOutcome::Sent {
        message_id: Some(confirmation_id("EMAIL")),
    })
}
