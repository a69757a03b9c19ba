use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest};

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::extractors::auth_token::AuthToken;
use crate::state::app_state::AppState;

/// The verified caller. `username` is the token subject and the player identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        std::future::ready((|| {
            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available"))?;
            let token = AuthToken::from_header(req.headers().get(header::AUTHORIZATION))?;
            let claims = verify_access_token(&token.token, &app_state.security)?;
            Ok(CurrentUser {
                username: claims.sub,
            })
        })())
    }
}
