//! Delivery transports.
//!
//! Each transport exposes a tagged outcome type and converts its provider's
//! response shape at the call boundary; nothing provider-specific leaks to
//! the order router. A transport with no credentials configured runs in
//! simulation mode: synthetic success, `DEV-`-prefixed confirmation id, no
//! network call.

pub mod email;
pub mod fax;

pub use email::{EmailAttachment, EmailOutcome, EmailTransport, ResendConfig, SmtpConfig};
pub use fax::{ClickSendConfig, FaxOutcome, FaxTransport};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider rejected the send: {0}")]
    Rejected(String),
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),
    #[error("mail delivery failed: {0}")]
    Smtp(String),
}

/// Synthetic confirmation id used by simulation mode and as the local SMTP
/// receipt, e.g. `DEV-1A2B3C4D`.
pub(crate) fn confirmation_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &id[..8])
}
