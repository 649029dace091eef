//! HTTP handler for invoice parsing.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::client::{ParsedInvoiceItem, VisionError};
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceParseRequest {
    pub base64_image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceParseResponse {
    pub items: Vec<ParsedInvoiceItem>,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Invoice",
    post,
    path = "/parse-invoice",
    request_body = InvoiceParseRequest,
    responses(
        (status = 200, description = "Extracted line items", body = InvoiceParseResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse),
        (status = 503, description = "Vision provider not configured", body = ErrorResponse)
    )
)]
pub async fn parse_invoice(
    req: web::Json<InvoiceParseRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, VisionError> {
    let items = state.vision.parse_invoice(&req.base64_image).await?;
    Ok(HttpResponse::Ok().json(InvoiceParseResponse { items }))
}
