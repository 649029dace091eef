//! HTTP handlers for the order surface.

use actix_web::{web, HttpResponse};

use super::error::OrderError;
use super::models::{DeliveryResult, LegacyOrderRequest, SendOrderRequest};
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Orders",
    post,
    path = "/send-order-multi",
    request_body = SendOrderRequest,
    responses(
        (status = 200, description = "Delivery attempted; see `success`", body = DeliveryResult),
        (status = 400, description = "Channel validation failed", body = ErrorResponse),
        (status = 500, description = "Document generation failed", body = ErrorResponse)
    )
)]
pub async fn send_order_multi(
    req: web::Json<SendOrderRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, OrderError> {
    let result = state.dispatcher.dispatch(&req).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Legacy v1 endpoint kept for older mobile builds; fax only.
#[utoipa::path(
    context_path = "/api",
    tag = "Orders",
    post,
    path = "/send-order",
    request_body = LegacyOrderRequest,
    responses(
        (status = 200, description = "Delivery attempted; see `success`", body = DeliveryResult),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Document generation failed", body = ErrorResponse)
    )
)]
pub async fn send_order(
    req: web::Json<LegacyOrderRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, OrderError> {
    let request: SendOrderRequest = req.into_inner().into();
    let result = state.dispatcher.dispatch(&request).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Orders",
    post,
    path = "/order-preview",
    request_body = SendOrderRequest,
    responses(
        (status = 200, description = "Rendered order PDF", content_type = "application/pdf"),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Document generation failed", body = ErrorResponse)
    )
)]
pub async fn preview_order(
    req: web::Json<SendOrderRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, OrderError> {
    let (filename, bytes) = state.dispatcher.preview(&req).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("inline; filename=\"{filename}\""),
        ))
        .body(bytes))
}
