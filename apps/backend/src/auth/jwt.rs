use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Claims carried by identity tokens. `sub` is the stable username.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint an HS256 token for `sub` valid for `ttl_secs`.
///
/// The service only verifies tokens; minting exists for tooling and tests.
pub fn mint_access_token(
    sub: &str,
    now: SystemTime,
    ttl_secs: i64,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;

    let claims = Claims {
        sub: sub.to_string(),
        iat,
        exp: iat + ttl_secs,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a token and return its claims.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = security.leeway_secs;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::unauthorized("token_expired"),
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("invalid_signature")
        }
        _ => AppError::unauthorized("invalid_token"),
    })?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::unauthorized("empty_subject"));
    }
    Ok(claims)
}
