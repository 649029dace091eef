//! HTTP handler for barcode lookup.

use actix_web::{web, HttpResponse, Responder};

use super::client::ProductLookup;
use crate::AppState;

#[utoipa::path(
    context_path = "/api",
    tag = "Catalog",
    get,
    path = "/lookup/{barcode}",
    responses(
        (status = 200, description = "Lookup result; `found` signals a hit", body = ProductLookup)
    ),
    params(
        ("barcode" = String, Path, description = "JAN code (EAN/UPC compatible)")
    )
)]
pub async fn lookup_barcode(
    barcode: web::Path<String>,
    state: web::Data<AppState>,
) -> impl Responder {
    let result = state.catalog.lookup(&barcode).await;
    HttpResponse::Ok().json(result)
}
