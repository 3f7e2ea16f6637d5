//! Drink API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::api::repo_error;
use crate::cache::keys;
use crate::core::ServerState;
use crate::db::repository::{category, drink, recipe};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_URL_LEN, validate_drink_name, validate_drink_price, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    Drink, DrinkCreate, DrinkFilter, DrinkSummary, DrinkUpdate, PaginatedResponse, RecipeEntry,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Substring of the drink name
    pub name: Option<String>,
    /// Substring of the category name
    pub category: Option<String>,
}

impl ListParams {
    fn filter(&self) -> DrinkFilter {
        let clean = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        DrinkFilter {
            name: clean(&self.name),
            category: clean(&self.category),
        }
    }
}

/// Drink with its recipe and current makeability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkDetail {
    #[serde(flatten)]
    pub drink: Drink,
    /// Every recipe ingredient has enough stock for one unit
    pub is_makeable: bool,
    pub recipe: Vec<RecipeEntry>,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::DrinkNotFound, format!("Drink {id} not found"))
}

async fn ensure_unique_name(state: &ServerState, name: &str, except: Option<i64>) -> AppResult<()> {
    if let Some(existing) = drink::find_by_name(state.pool(), name).await?
        && Some(existing.id) != except
    {
        return Err(AppError::with_message(
            ErrorCode::DrinkNameExists,
            format!("Drink '{name}' already exists"),
        ));
    }
    Ok(())
}

async fn ensure_category(state: &ServerState, category_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = category_id
        && category::find_by_id(state.pool(), id).await?.is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        ));
    }
    Ok(())
}

async fn invalidate(state: &ServerState, id: i64) {
    state.cache.remove(&keys::drink(id)).await;
    state.cache.remove_by_prefix(keys::DRINKS_PREFIX).await;
    // carts price lines from the current drink price
    state.cache.remove_by_prefix(keys::ORDERS_PREFIX).await;
}

async fn summary_page(
    state: &ServerState,
    params: ListParams,
    available_only: bool,
) -> AppResult<PaginatedResponse<DrinkSummary>> {
    let page = state.page_query(params.page, params.limit);
    let filter = params.filter();
    let kind = if available_only { "available" } else { "all" };
    let key = keys::drinks(
        kind,
        page.page,
        page.limit,
        filter.name.as_deref(),
        filter.category.as_deref(),
    );
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(cached);
    }

    let (rows, total) = if available_only {
        drink::find_available_page(state.pool(), &filter, page).await?
    } else {
        drink::find_page(state.pool(), &filter, page).await?
    };
    let response = PaginatedResponse::new(rows, total, page.page, page.limit);
    state.cache.set_json(&key, &response).await;
    Ok(response)
}

/// GET /api/drinks - every drink, ordered by name
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<DrinkSummary>>> {
    Ok(Json(summary_page(&state, params, false).await?))
}

/// GET /api/drinks/available - drinks that can be made from current stock
pub async fn list_available(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<DrinkSummary>>> {
    Ok(Json(summary_page(&state, params, true).await?))
}

/// GET /api/drinks/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DrinkDetail>> {
    let key = keys::drink(id);
    if let Some(cached) = state.cache.get_json(&key).await {
        return Ok(Json(cached));
    }
    let found = drink::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let detail = DrinkDetail {
        is_makeable: drink::is_makeable(state.pool(), id).await?,
        recipe: recipe::find_by_drink(state.pool(), id).await?,
        drink: found,
    };
    state.cache.set_json(&key, &detail).await;
    Ok(Json(detail))
}

/// GET /api/drinks/:id/recipe
pub async fn get_recipe(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<RecipeEntry>>> {
    if drink::find_by_id(state.pool(), id).await?.is_none() {
        return Err(not_found(id));
    }
    Ok(Json(recipe::find_by_drink(state.pool(), id).await?))
}

/// POST /api/drinks
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<DrinkCreate>,
) -> AppResult<Json<Drink>> {
    payload.name = payload.name.trim().to_string();
    validate_drink_name(&payload.name)?;
    validate_drink_price(payload.price)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    ensure_category(&state, payload.category_id).await?;
    ensure_unique_name(&state, &payload.name, None).await?;

    let created = drink::create(state.pool(), payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::DrinkNotFound, ErrorCode::DrinkNameExists))?;
    tracing::info!(drink_id = created.id, name = %created.name, price = created.price, "Drink created");
    invalidate(&state, created.id).await;
    Ok(Json(created))
}

/// PUT /api/drinks/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<DrinkUpdate>,
) -> AppResult<Json<Drink>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_drink_name(name)?;
        ensure_unique_name(&state, name, Some(id)).await?;
    }
    if let Some(price) = payload.price {
        validate_drink_price(price)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    ensure_category(&state, payload.category_id).await?;

    let updated = drink::update(state.pool(), id, payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::DrinkNotFound, ErrorCode::DrinkNameExists))?;
    invalidate(&state, id).await;
    Ok(Json(updated))
}

/// DELETE /api/drinks/:id - soft delete
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if !drink::delete(state.pool(), id).await? {
        return Err(not_found(id));
    }
    tracing::info!(drink_id = id, "Drink deleted");
    invalidate(&state, id).await;
    Ok(Json(true))
}
