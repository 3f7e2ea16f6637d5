//! Order API Module
//!
//! Cart editing and the order lifecycle. Every call acts on behalf of the
//! [`CurrentUser`](crate::auth::CurrentUser) built from the identity headers.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/", get(handler::list))
        // before /{id}
        .route("/cart", get(handler::get_cart))
        .route("/lines/{line_id}", put(handler::update_line).delete(handler::remove_line))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/lines", post(handler::add_line))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/cancel", post(handler::cancel));

    let manage_routes = Router::new()
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(manage_routes)
}
