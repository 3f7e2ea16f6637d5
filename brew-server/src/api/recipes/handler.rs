//! Recipe API Handlers
//!
//! Recipe rows feed both stock math and the makeability of drinks, so every
//! write clears the whole cache and re-checks the drink's procedure.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db::repository::{drink, ingredient, recipe};
use crate::instructions::reconcile_procedure;
use crate::utils::validation::validate_recipe_quantity;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Recipe, RecipeCreate, RecipeUpdate};

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RecipeNotFound, format!("Recipe {id} not found"))
}

async fn after_write(state: &ServerState, drink_id: i64) {
    state.cache.clear_all().await;
    if let Err(e) = reconcile_procedure(state.pool(), state.directory.as_ref(), drink_id).await {
        tracing::warn!(drink_id, error = %e, "Procedure drift check failed");
    }
}

/// GET /api/recipes/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recipe>> {
    let found = recipe::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// POST /api/recipes
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RecipeCreate>,
) -> AppResult<Json<Recipe>> {
    validate_recipe_quantity(payload.quantity)?;
    if drink::find_by_id(state.pool(), payload.drink_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::DrinkNotFound,
            format!("Drink {} not found", payload.drink_id),
        ));
    }
    if ingredient::find_by_id(state.pool(), payload.ingredient_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::IngredientNotFound,
            format!("Ingredient {} not found", payload.ingredient_id),
        ));
    }

    let created = recipe::create(state.pool(), payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::RecipeNotFound, ErrorCode::RecipeDuplicate))?;
    tracing::info!(
        recipe_id = created.id,
        drink_id = created.drink_id,
        ingredient_id = created.ingredient_id,
        quantity = created.quantity,
        "Recipe row created"
    );
    after_write(&state, created.drink_id).await;
    Ok(Json(created))
}

/// PUT /api/recipes/:id - only the quantity is editable
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecipeUpdate>,
) -> AppResult<Json<Recipe>> {
    validate_recipe_quantity(payload.quantity)?;
    let updated = recipe::update_quantity(state.pool(), id, payload.quantity)
        .await
        .map_err(|e| repo_error(e, ErrorCode::RecipeNotFound, ErrorCode::RecipeDuplicate))?;
    after_write(&state, updated.drink_id).await;
    Ok(Json(updated))
}

/// DELETE /api/recipes/:id
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    let existing = recipe::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    recipe::delete(state.pool(), id).await?;
    tracing::info!(recipe_id = id, drink_id = existing.drink_id, "Recipe row deleted");
    after_write(&state, existing.drink_id).await;
    Ok(Json(true))
}
