//! Caller identity
//!
//! Identity is established upstream (API gateway / identity provider) and
//! forwarded in trusted headers:
//! - [`CurrentUser`] - the principal passed to every cart and order call
//! - [`require_auth`] - middleware resolving the principal for `/api/` routes
//! - [`require_admin`] - middleware restricting a router to admins

pub mod extractor;
pub mod middleware;
pub mod user;

pub use middleware::{require_admin, require_auth};
pub use user::{CurrentUser, ROLE_ADMIN, ROLE_CUSTOMER, USER_ID_HEADER, USER_ROLE_HEADER};
