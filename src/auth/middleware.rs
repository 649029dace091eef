use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{Error, HttpRequest};

use super::jwt::{validate_token, AuthError};
use super::model::Claims;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
                .map(str::to_string)
        })
}

/// Validate the bearer token on `req` and return its claims.
pub fn validate_request_token(req: &HttpRequest) -> Result<Claims, Error> {
    let token = extract_token(req).ok_or_else(|| ErrorUnauthorized("認証が必要です"))?;

    validate_token(&token).map_err(|e| match e {
        AuthError::MissingSecret => {
            log::error!("SUPABASE_JWT_SECRET is not configured");
            ErrorInternalServerError("サーバー認証設定エラー")
        }
        other => {
            log::warn!("Token validation failed: {other}");
            ErrorUnauthorized("無効または期限切れのトークンです")
        }
    })
}
