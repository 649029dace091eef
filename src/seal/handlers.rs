//! Hanko endpoint: generate a seal image for the authenticated user.

use actix_web::{web, HttpRequest, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::image::create_seal_png;
use super::SealError;
use crate::auth::validate_request_token;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct HankoRequest {
    /// 1-4 characters; longer input is truncated.
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HankoResponse {
    /// Public storage URL, or a data URI when storage is unconfigured.
    pub url: String,
    /// True when the image was persisted to object storage.
    pub stored: bool,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Hanko",
    post,
    path = "/hanko",
    request_body = HankoRequest,
    responses(
        (status = 200, description = "Seal image created", body = HankoResponse),
        (status = 400, description = "Empty seal text", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Seal generation failed", body = ErrorResponse)
    )
)]
pub async fn create_hanko(
    req: HttpRequest,
    body: web::Json<HankoRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let claims = validate_request_token(&req)?;

    let png = match create_seal_png(&state.fonts, &body.text) {
        Ok(png) => png,
        Err(SealError::EmptyText) => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("印鑑の文字を入力してください")));
        }
        Err(e) => {
            log::error!("seal generation failed: {e}");
            return Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("印鑑画像の作成に失敗しました")));
        }
    };

    match &state.storage {
        Some(storage) => {
            let key = format!("hanko/{}/{}.png", claims.sub, Uuid::new_v4().simple());
            match storage.upload_file(&key, &png, "image/png").await {
                Ok(url) => Ok(HttpResponse::Ok().json(HankoResponse { url, stored: true })),
                Err(e) => {
                    log::error!("seal upload failed: {e}");
                    Ok(HttpResponse::InternalServerError()
                        .json(ErrorResponse::internal_error("印鑑画像の保存に失敗しました")))
                }
            }
        }
        // No storage configured: hand the image back inline, nothing is
        // written to shared state.
        None => Ok(HttpResponse::Ok().json(HankoResponse {
            url: format!("data:image/png;base64,{}", BASE64.encode(&png)),
            stored: false,
        })),
    }
}
