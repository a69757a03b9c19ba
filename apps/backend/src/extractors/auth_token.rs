use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};

use crate::AppError;

/// Bearer token from the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
}

impl AuthToken {
    pub fn from_header(value: Option<&header::HeaderValue>) -> Result<Self, AppError> {
        let value = value.ok_or_else(|| AppError::unauthorized("missing_bearer"))?;
        let value = value
            .to_str()
            .map_err(|_| AppError::unauthorized("malformed_authorization"))?;

        // Parse "Bearer <token>" format
        match value.split_once(' ') {
            Some((scheme, token)) if scheme == "Bearer" && !token.trim().is_empty() => Ok(Self {
                token: token.trim().to_string(),
            }),
            _ => Err(AppError::unauthorized("missing_bearer")),
        }
    }
}

impl FromRequest for AuthToken {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        std::future::ready(Self::from_header(req.headers().get(header::AUTHORIZATION)))
    }
}
