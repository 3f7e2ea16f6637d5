//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    AddLineRequest, LineUpdate, Order, OrderLine, OrderQuery, PaginatedResponse, UpdateLineRequest,
};

/// GET /api/orders/cart - the caller's open cart, created on first access
pub async fn get_cart(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_or_create_cart(&user).await?))
}

/// POST /api/orders/:id/lines
pub async fn add_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AddLineRequest>,
) -> AppResult<Json<OrderLine>> {
    Ok(Json(state.orders.add_line(&user, id, payload).await?))
}

/// PUT /api/orders/lines/:line_id - quantity 0 removes the line
pub async fn update_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(line_id): Path<i64>,
    Json(payload): Json<UpdateLineRequest>,
) -> AppResult<Json<LineUpdate>> {
    Ok(Json(state.orders.update_line(&user, line_id, payload).await?))
}

/// DELETE /api/orders/lines/:line_id
pub async fn remove_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(line_id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.orders.remove_line(&user, line_id).await?;
    Ok(Json(true))
}

/// POST /api/orders/:id/confirm - reserve stock and dispatch instructions
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.confirm(&user, id).await?))
}

/// POST /api/orders/:id/cancel - release reserved stock
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.cancel(&user, id).await?))
}

/// POST /api/orders/:id/complete (admin)
pub async fn complete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.complete(id).await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(&user, id).await?))
}

/// GET /api/orders - oldest first; customers only see their own
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let response = state
        .orders
        .list_orders(
            &user,
            query,
            state.config.default_page_size,
            state.config.max_page_size,
        )
        .await?;
    Ok(Json(response))
}

/// DELETE /api/orders/:id (admin, soft delete)
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.orders.delete(id).await?;
    Ok(Json(true))
}
