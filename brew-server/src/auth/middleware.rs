//! Auth middleware

use axum::{extract::Request, middleware::Next, response::Response};

use super::user::{CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::security_log;
use crate::utils::AppError;

/// Resolve the principal for every `/api/` route
///
/// Inserts [`CurrentUser`] into the request extensions.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == axum::http::Method::OPTIONS || !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // the header borrow must end before the await below
    let resolved = {
        let header = |name: &str| req.headers().get(name).and_then(|h| h.to_str().ok());
        CurrentUser::from_headers(header(USER_ID_HEADER), header(USER_ROLE_HEADER))
    };
    let user = match resolved {
        Ok(user) => user,
        Err(e) => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(e);
        }
    };
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Admin-only routes
///
/// Runs after [`require_auth`]; non-admin callers get `AdminRequired` (403).
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            user_role = user.role.clone()
        );
        return Err(AppError::admin_required());
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router, middleware};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/api/whoami", get(|Extension(user): Extension<CurrentUser>| async move { user.id }))
            .route(
                "/api/admin",
                get(|| async { "ok" }).layer(middleware::from_fn(require_admin)),
            )
            .route("/health", get(|| async { "up" }))
            .layer(middleware::from_fn(require_auth))
    }

    fn request(uri: &str, id: Option<&str>, role: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(id) = id {
            builder = builder.header(USER_ID_HEADER, id);
        }
        if let Some(role) = role {
            builder = builder.header(USER_ROLE_HEADER, role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_identity_reaches_handler() {
        let response = app()
            .oneshot(request("/api/whoami", Some("alice"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_identity_rejected_outside_api_allowed() {
        let response = app().oneshot(request("/api/whoami", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app().oneshot(request("/health", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_guard() {
        let customer = app()
            .oneshot(request("/api/admin", Some("bob"), Some("customer")))
            .await
            .unwrap();
        assert_eq!(customer.status(), StatusCode::FORBIDDEN);

        let admin = app()
            .oneshot(request("/api/admin", Some("ops"), Some("admin")))
            .await
            .unwrap();
        assert_eq!(admin.status(), StatusCode::OK);
    }
}
