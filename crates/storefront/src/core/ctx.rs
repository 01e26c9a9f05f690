use crate::core::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated, active user behind a request.
#[derive(Clone, Debug)]
pub struct Ctx {
    user_id: String,
    email: String,
    full_name: String,
}

impl Ctx {
    pub fn new(user_id: String, email: String, full_name: String) -> Self {
        Self {
            user_id,
            email,
            full_name,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::AuthFailCtxNotInRequestExt)
    }
}
