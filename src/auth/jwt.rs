use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::env;
use thiserror::Error;

use super::model::Claims;

const JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("SUPABASE_JWT_SECRET is not configured")]
    MissingSecret,
    #[error("token verification failed: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token carries no subject claim")]
    MissingSubject,
}

fn get_jwt_secret() -> Result<String, AuthError> {
    env::var(JWT_SECRET_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingSecret)
}

/// Validate and decode a Supabase access token, returning its claims.
pub fn validate_token(token: &str) -> Result<Claims, AuthError> {
    let secret = get_jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    // Supabase tokens do not always carry an audience.
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.sub.is_empty() {
        return Err(AuthError::MissingSubject);
    }

    Ok(token_data.claims)
}
