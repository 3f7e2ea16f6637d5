//! Principal extractor
//!
//! Handlers take [`CurrentUser`] as an argument; the value set by
//! [`require_auth`](super::require_auth) is reused when present.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::user::{CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::utils::AppError;

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let user = from_parts(parts)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

fn from_parts(parts: &Parts) -> Result<CurrentUser, AppError> {
    let header = |name: &str| parts.headers.get(name).and_then(|h| h.to_str().ok());
    CurrentUser::from_headers(header(USER_ID_HEADER), header(USER_ROLE_HEADER))
}
