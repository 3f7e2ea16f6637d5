//! Ingredient API Handlers
//!
//! Admin edits here are the only stock changes besides confirm/cancel.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::repo_error;
use crate::cache::keys;
use crate::core::ServerState;
use crate::db::repository::ingredient;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_non_negative_price, validate_required_text, validate_stock_quantity,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Ingredient, IngredientCreate, IngredientUpdate, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
}

fn not_found(what: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::IngredientNotFound, format!("Ingredient {what} not found"))
}

async fn ensure_unique_name(state: &ServerState, name: &str, except: Option<i64>) -> AppResult<()> {
    if let Some(existing) = ingredient::find_by_name(state.pool(), name).await?
        && Some(existing.id) != except
    {
        return Err(AppError::with_message(
            ErrorCode::IngredientNameExists,
            format!("Ingredient '{name}' already exists"),
        ));
    }
    Ok(())
}

async fn invalidate(state: &ServerState, id: i64) {
    state.cache.remove(&keys::ingredient(id)).await;
    state.cache.remove_by_prefix(keys::INGREDIENTS_PREFIX).await;
    // stock decides which drinks are makeable
    state.cache.remove_by_prefix(keys::DRINKS_PREFIX).await;
    state.cache.remove_by_prefix(keys::DRINK_PREFIX).await;
}

/// GET /api/ingredients - paginated, optional name substring filter
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<Ingredient>>> {
    let page = state.page_query(params.page, params.limit);
    let name = params.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let key = keys::ingredients(page.page, page.limit, name);
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(Json(cached));
    }
    let (rows, total) = ingredient::find_page(state.pool(), name, page).await?;
    let response = PaginatedResponse::new(rows, total, page.page, page.limit);
    state.cache.set_json(&key, &response).await;
    Ok(Json(response))
}

/// GET /api/ingredients/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    let key = keys::ingredient(id);
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(Json(cached));
    }
    let found = ingredient::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.cache.set_json(&key, &found).await;
    Ok(Json(found))
}

/// GET /api/ingredients/by-name/:name - case-insensitive exact match
pub async fn get_by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<Ingredient>> {
    let found = ingredient::find_by_name(state.pool(), name.trim())
        .await?
        .ok_or_else(|| not_found(format!("'{name}'")))?;
    Ok(Json(found))
}

/// POST /api/ingredients
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<IngredientCreate>,
) -> AppResult<Json<Ingredient>> {
    payload.name = payload.name.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_stock_quantity(payload.quantity)?;
    validate_non_negative_price(payload.price, "price")?;
    ensure_unique_name(&state, &payload.name, None).await?;

    let created = ingredient::create(state.pool(), payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::IngredientNotFound, ErrorCode::IngredientNameExists))?;
    tracing::info!(ingredient_id = created.id, name = %created.name, quantity = created.quantity, "Ingredient created");
    invalidate(&state, created.id).await;
    Ok(Json(created))
}

/// PUT /api/ingredients/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<IngredientUpdate>,
) -> AppResult<Json<Ingredient>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        ensure_unique_name(&state, name, Some(id)).await?;
    }
    if let Some(quantity) = payload.quantity {
        validate_stock_quantity(quantity)?;
    }
    if let Some(price) = payload.price {
        validate_non_negative_price(price, "price")?;
    }

    let updated = ingredient::update(state.pool(), id, payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::IngredientNotFound, ErrorCode::IngredientNameExists))?;
    tracing::info!(ingredient_id = id, quantity = updated.quantity, "Ingredient updated");
    invalidate(&state, id).await;
    Ok(Json(updated))
}

/// DELETE /api/ingredients/:id - soft delete
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if !ingredient::delete(state.pool(), id).await? {
        return Err(not_found(id));
    }
    tracing::info!(ingredient_id = id, "Ingredient deleted");
    invalidate(&state, id).await;
    Ok(Json(true))
}
