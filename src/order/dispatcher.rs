//! Delivery channel router.
//!
//! One stateless pass per call: validate the channel's required fields,
//! render the order document, optionally stamp the seal, invoke exactly one
//! transport, and fold whatever happened into a single `DeliveryResult`.
//! The temp document never outlives the call.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::OrderError;
use super::format::{order_html, order_subject, order_text};
use super::models::{ContactMethod, DeliveryResult, SendOrderRequest};
use crate::pdf::{OrderPdfRenderer, OrderSheetData, RenderError, RenderedDocument, SealStamper};
use crate::transport::{EmailAttachment, EmailOutcome, EmailTransport, FaxOutcome, FaxTransport};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

const MESSAGING_NOTICE: &str =
    "メッセージ送信はアプリから直接行われます。このAPIは使用されません。";

pub struct OrderDispatcher {
    renderer: OrderPdfRenderer,
    stamper: SealStamper,
    fax: FaxTransport,
    email: EmailTransport,
}

impl OrderDispatcher {
    pub fn new(
        renderer: OrderPdfRenderer,
        stamper: SealStamper,
        fax: FaxTransport,
        email: EmailTransport,
    ) -> Self {
        Self {
            renderer,
            stamper,
            fax,
            email,
        }
    }

    /// Route one order to its chosen channel.
    pub async fn dispatch(&self, request: &SendOrderRequest) -> Result<DeliveryResult, OrderError> {
        self.validate(request)?;

        match request.contact_method {
            ContactMethod::Fax => self.dispatch_fax(request).await,
            ContactMethod::Email => self.dispatch_email(request).await,
            // Deep-linked messaging apps are driven by the mobile client;
            // nothing is dispatched here and the result says so.
            ContactMethod::Messaging => Ok(DeliveryResult {
                success: false,
                message: MESSAGING_NOTICE.to_string(),
                confirmation_id: None,
                channel_used: ContactMethod::Messaging,
            }),
        }
    }

    /// Render-only path; returns the suggested filename and the PDF bytes.
    /// The temp artifact is deleted before this returns.
    pub async fn preview(&self, request: &SendOrderRequest) -> Result<(String, Vec<u8>), OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::Validation("注文項目がありません".to_string()));
        }
        let document = self.render_document(request).await?;
        let filename = document.filename().to_string();
        Ok((filename, document.into_bytes()))
    }

    /// Channel-specific required-field checks; run before any render or
    /// provider work.
    fn validate(&self, request: &SendOrderRequest) -> Result<(), OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::Validation("注文項目がありません".to_string()));
        }
        if request.items.iter().any(|item| item.unit_price < 0) {
            return Err(OrderError::Validation("単価が不正です".to_string()));
        }
        if request.items.iter().any(|item| item.quantity == 0) {
            return Err(OrderError::Validation(
                "数量は1以上で指定してください".to_string(),
            ));
        }

        match request.contact_method {
            ContactMethod::Fax => {
                let number = request
                    .fax_number
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| OrderError::Validation("FAX番号が必要です".to_string()))?;
                if !number.chars().any(|c| c.is_ascii_digit()) {
                    return Err(OrderError::Validation("FAX番号が不正です".to_string()));
                }
            }
            ContactMethod::Email => {
                let address = request
                    .email
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        OrderError::Validation("メールアドレスが必要です".to_string())
                    })?;
                if !EMAIL_RE.is_match(address) {
                    return Err(OrderError::Validation(
                        "メールアドレスの形式が不正です".to_string(),
                    ));
                }
            }
            ContactMethod::Messaging => {}
        }
        Ok(())
    }

    async fn render_document(
        &self,
        request: &SendOrderRequest,
    ) -> Result<RenderedDocument, RenderError> {
        let mut document = self.renderer.render(&OrderSheetData {
            items: &request.items,
            supplier_name: request.supplier_name.as_deref(),
            sender_name: request.sender_name.as_deref(),
            sender_phone: request.sender_phone.as_deref(),
            note: request.note.as_deref(),
        })?;

        if let Some(url) = request.hanko_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                self.stamper.stamp_first_page(&mut document, url).await;
            }
        }

        Ok(document)
    }

    async fn dispatch_fax(&self, request: &SendOrderRequest) -> Result<DeliveryResult, OrderError> {
        let fax_number = request.fax_number.as_deref().unwrap_or_default().trim();

        // The PDF is the payload here; a render failure aborts the send.
        let document = self.render_document(request).await?;

        let result = match self.fax.send(document.bytes(), fax_number).await {
            Ok(FaxOutcome::Sent { message_id }) => DeliveryResult {
                success: true,
                message: "FAXを送信しました".to_string(),
                confirmation_id: message_id,
                channel_used: ContactMethod::Fax,
            },
            Ok(FaxOutcome::Simulated { confirmation_id }) => DeliveryResult {
                success: true,
                message: "[DEV MODE] FAX送信をシミュレートしました".to_string(),
                confirmation_id: Some(confirmation_id),
                channel_used: ContactMethod::Fax,
            },
            Err(e) => {
                log::error!("fax dispatch failed: {e}");
                DeliveryResult {
                    success: false,
                    message: "FAXの送信に失敗しました。時間をおいて再度お試しください".to_string(),
                    confirmation_id: None,
                    channel_used: ContactMethod::Fax,
                }
            }
        };

        Ok(result)
    }

    async fn dispatch_email(
        &self,
        request: &SendOrderRequest,
    ) -> Result<DeliveryResult, OrderError> {
        let address = request.email.as_deref().unwrap_or_default().trim();

        // The PDF is a courtesy attachment; the email body carries the full
        // order, so a render failure downgrades to "no attachment".
        let document = match self.render_document(request).await {
            Ok(document) => Some(document),
            Err(e) => {
                log::warn!("order PDF unavailable, sending email without attachment: {e}");
                None
            }
        };

        let subject = order_subject(request.supplier_name.as_deref());
        let html = order_html(
            &request.items,
            request.supplier_name.as_deref(),
            request.note.as_deref(),
        );
        let text = order_text(
            &request.items,
            request.supplier_name.as_deref(),
            request.note.as_deref(),
        );
        let attachment = document.as_ref().map(|doc| EmailAttachment {
            filename: attachment_filename(request.supplier_name.as_deref()),
            bytes: doc.bytes().to_vec(),
        });

        let result = match self
            .email
            .send(address, &subject, &html, &text, attachment)
            .await
        {
            Ok(EmailOutcome::Sent { message_id }) => DeliveryResult {
                success: true,
                message: "メールを送信しました".to_string(),
                confirmation_id: message_id,
                channel_used: ContactMethod::Email,
            },
            Ok(EmailOutcome::Simulated { confirmation_id }) => DeliveryResult {
                success: true,
                message: "[DEV MODE] メール送信をシミュレートしました".to_string(),
                confirmation_id: Some(confirmation_id),
                channel_used: ContactMethod::Email,
            },
            Err(e) => {
                log::error!("email dispatch failed: {e}");
                DeliveryResult {
                    success: false,
                    message: "メールの送信に失敗しました。時間をおいて再度お試しください"
                        .to_string(),
                    confirmation_id: None,
                    channel_used: ContactMethod::Email,
                }
            }
        };

        Ok(result)
    }
}

fn attachment_filename(supplier_name: Option<&str>) -> String {
    let base = supplier_name
        .map(sanitize_filename::sanitize)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "order".to_string());
    format!("order_{base}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_accepts_ordinary_addresses() {
        assert!(EMAIL_RE.is_match("orders@example.co.jp"));
        assert!(EMAIL_RE.is_match("a.b+c@example.com"));
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        assert!(!EMAIL_RE.is_match("not-an-address"));
        assert!(!EMAIL_RE.is_match("a b@example.com"));
        assert!(!EMAIL_RE.is_match("a@b"));
    }

    #[test]
    fn attachment_filename_is_sanitized() {
        assert_eq!(attachment_filename(None), "order_order.pdf");
        let name = attachment_filename(Some("../etc/passwd"));
        assert!(!name.contains(".."));
        assert!(!name.contains('/'));
    }
}
