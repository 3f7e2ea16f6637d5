//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::repo_error;
use crate::cache::keys;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{MAX_CATEGORY_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

async fn ensure_unique_name(state: &ServerState, name: &str, except: Option<i64>) -> AppResult<()> {
    if let Some(existing) = category::find_by_name(state.pool(), name).await?
        && Some(existing.id) != except
    {
        return Err(AppError::with_message(
            ErrorCode::CategoryNameExists,
            format!("Category '{name}' already exists"),
        ));
    }
    Ok(())
}

async fn invalidate(state: &ServerState, id: i64) {
    state.cache.remove(&keys::category(id)).await;
    state.cache.remove_by_prefix(keys::CATEGORIES_PREFIX).await;
    // listings embed the category name
    state.cache.remove_by_prefix(keys::DRINKS_PREFIX).await;
}

/// GET /api/categories - paginated, ordered by name
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<Category>>> {
    let page = state.page_query(params.page, params.limit);
    let key = keys::categories(page.page, page.limit);
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(Json(cached));
    }
    let (rows, total) = category::find_page(state.pool(), page).await?;
    let response = PaginatedResponse::new(rows, total, page.page, page.limit);
    state.cache.set_json(&key, &response).await;
    Ok(Json(response))
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let key = keys::category(id);
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(Json(cached));
    }
    let found = category::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.cache.set_json(&key, &found).await;
    Ok(Json(found))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    payload.name = payload.name.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_CATEGORY_NAME_LEN)?;
    ensure_unique_name(&state, &payload.name, None).await?;

    let created = category::create(state.pool(), payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::CategoryNotFound, ErrorCode::CategoryNameExists))?;
    tracing::info!(category_id = created.id, name = %created.name, "Category created");
    invalidate(&state, created.id).await;
    Ok(Json(created))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_CATEGORY_NAME_LEN)?;
        ensure_unique_name(&state, name.trim(), Some(id)).await?;
    }
    let updated = category::update(state.pool(), id, payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::CategoryNotFound, ErrorCode::CategoryNameExists))?;
    invalidate(&state, id).await;
    Ok(Json(updated))
}

/// DELETE /api/categories/:id - soft delete
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if !category::delete(state.pool(), id).await? {
        return Err(not_found(id));
    }
    tracing::info!(category_id = id, "Category deleted");
    invalidate(&state, id).await;
    Ok(Json(true))
}
