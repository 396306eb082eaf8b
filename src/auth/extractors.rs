use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Identity established by `AuthMiddleware` for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Token subject: the authenticated user's email.
    pub email: String,
}

/// Extracts the authenticated identity from request extensions.
///
/// This extractor is intended to be used on routes protected by `AuthMiddleware`,
/// which validates the JWT and attaches an [`AuthContext`] to the request. Taking it as
/// a handler argument is how handlers learn who is calling.
///
/// If no context is present (the middleware did not run for this route), extraction
/// fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthContext);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(context) => ready(Ok(AuthenticatedUser(context))),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
