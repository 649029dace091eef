//! Order request/response models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_UNIT_LABEL: &str = "個";

fn default_quantity() -> u32 {
    1
}

fn default_unit_label() -> String {
    DEFAULT_UNIT_LABEL.to_string()
}

/// A single order line. The v1 mobile client sends `price`; it is accepted as
/// an alias of `unit_price`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Counting unit shown next to the quantity (個, 箱, 本, kg, 袋...).
    #[serde(default = "default_unit_label")]
    pub unit_label: String,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// Sum of line subtotals; computed, never stored.
pub fn order_total(items: &[OrderItem]) -> i64 {
    items.iter().map(OrderItem::subtotal).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Fax,
    Email,
    /// LINE and similar apps; handled entirely by the mobile client via deep
    /// link, never dispatched server-side.
    #[serde(alias = "line")]
    Messaging,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMethod::Fax => "fax",
            ContactMethod::Email => "email",
            ContactMethod::Messaging => "messaging",
        }
    }
}

/// Multi-channel send request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendOrderRequest {
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub contact_method: ContactMethod,
    #[serde(default)]
    pub fax_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "line_id")]
    pub messaging_id: Option<String>,
    #[serde(default)]
    pub hanko_url: Option<String>,
    /// Caller-side reference id; passed through untouched.
    #[serde(default)]
    pub order_id: Option<String>,
    /// User memo (備考).
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_phone: Option<String>,
}

/// Legacy v1 request: fax only.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LegacyOrderRequest {
    pub items: Vec<OrderItem>,
    pub supplier_fax: String,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub hanko_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<LegacyOrderRequest> for SendOrderRequest {
    fn from(legacy: LegacyOrderRequest) -> Self {
        SendOrderRequest {
            items: legacy.items,
            supplier_name: legacy.supplier_name,
            contact_method: ContactMethod::Fax,
            fax_number: Some(legacy.supplier_fax),
            email: None,
            messaging_id: None,
            hanko_url: legacy.hanko_url,
            order_id: None,
            note: legacy.note,
            sender_name: None,
            sender_phone: None,
        }
    }
}

/// The single response shape across all delivery channels.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeliveryResult {
    pub success: bool,
    pub message: String,
    pub confirmation_id: Option<String>,
    pub channel_used: ContactMethod,
}
