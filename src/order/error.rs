//! Error-to-response normalization for the order surface.
//!
//! Validation problems carry their localized message straight to the caller;
//! everything internal is collapsed to a generic localized message, with the
//! full detail kept in the server log only.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::pdf::RenderError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Caller input failed a channel's required-field contract or a business
    /// bound. Detected before any render or provider call.
    #[error("{0}")]
    Validation(String),
    /// Document composition failed on a path where the PDF is mandatory.
    #[error("document generation failed: {0}")]
    Rendering(#[from] RenderError),
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::Rendering(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            OrderError::Validation(message) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(message))
            }
            OrderError::Rendering(source) => {
                log::error!("order document rendering failed: {source}");
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal_error("注文書の作成に失敗しました"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests_with_their_message() {
        let err = OrderError::Validation("FAX番号が必要です".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "FAX番号が必要です");
    }

    #[test]
    fn rendering_errors_never_leak_internal_detail() {
        let err = OrderError::Rendering(RenderError::Serialize("secret internals".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
