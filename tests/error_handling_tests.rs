//! Error-contract tests: stable response bodies, no internal leakage.

use actix_web::ResponseError;
use replen_server::order::OrderError;
use replen_server::pdf::RenderError;
use replen_server::ErrorResponse;

#[test]
fn error_response_carries_type_message_and_timestamp() {
    let body = ErrorResponse::bad_request("FAX番号が必要です");
    assert_eq!(body.error, "BadRequest");
    assert_eq!(body.message, "FAX番号が必要です");
    assert!(!body.timestamp.is_empty());
}

#[test]
fn error_response_helpers_map_to_their_types() {
    assert_eq!(ErrorResponse::not_found("x").error, "NotFound");
    assert_eq!(
        ErrorResponse::internal_error("x").error,
        "InternalServerError"
    );
    assert_eq!(
        ErrorResponse::service_unavailable("x").error,
        "ServiceUnavailable"
    );
    assert_eq!(ErrorResponse::bad_gateway("x").error, "BadGateway");
}

#[test]
fn validation_failures_keep_their_localized_message() {
    let err = OrderError::Validation("メールアドレスが必要です".to_string());
    let response = err.error_response();
    assert_eq!(response.status().as_u16(), 400);
}

#[test]
fn rendering_failures_are_opaque_to_the_caller() {
    let err = OrderError::Rendering(RenderError::Serialize(
        "lopdf stream offset 0x7f deadbeef".to_string(),
    ));
    let response = err.error_response();
    assert_eq!(response.status().as_u16(), 500);
    // The localized message replaces the internal detail; the detail only
    // reaches the server log.
    let body = format!("{:?}", response.body());
    assert!(!body.contains("deadbeef"));
}

#[test]
fn error_response_serializes_to_json() {
    let body = ErrorResponse::bad_request("テスト");
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["error"], "BadRequest");
    assert_eq!(json["message"], "テスト");
}
