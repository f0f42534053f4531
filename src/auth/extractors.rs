use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The identity resolved by `AuthMiddleware` for the current request.
///
/// Only the middleware can build one, so every handler that takes an `AuthenticatedUser`
/// argument is guaranteed to run behind a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(Uuid);

impl AuthenticatedUser {
    pub(crate) fn new(user_id: Uuid) -> Self {
        Self(user_id)
    }

    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                // The route is not behind AuthMiddleware.
                let err = AppError::Unauthorized("Not authorized".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
