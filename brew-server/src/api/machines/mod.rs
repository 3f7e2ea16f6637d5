//! Machine and preparation-procedure directory (admin only)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/machines", machine_routes())
        .nest("/api/procedures", procedure_routes())
        .layer(middleware::from_fn(require_admin))
}

fn machine_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_machines))
        .route("/{name}", get(handler::get_machine).put(handler::upsert_machine))
}

fn procedure_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_procedures))
        .route("/drift", get(handler::check_drift))
        .route(
            "/{drink_id}",
            get(handler::get_procedure).post(handler::create_procedure),
        )
        .route("/{drink_id}/drift", get(handler::drink_drift))
}
