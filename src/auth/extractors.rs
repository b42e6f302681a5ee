use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::AuthenticatedUser;
use crate::error::AppError;

/// Extracts the authenticated caller from request extensions.
///
/// `AuthMiddleware` validates the bearer token and inserts the resolved
/// identity before the handler runs; handlers declare an
/// `AuthenticatedUser` parameter to receive it. If the identity is missing
/// (middleware not applied, or a protected route registered outside the
/// gate), extraction fails with 401.
impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "authenticated identity not found in request".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
