//! Ingredient Repository
//!
//! Catalog CRUD for ingredients. The stock mutations performed by order
//! confirmation and cancellation live in `orders::ledger`.

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{Ingredient, IngredientCreate, IngredientUpdate, PageQuery};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, quantity, price, created_at, updated_at, deleted_at";

pub async fn find_page(
    pool: &SqlitePool,
    name: Option<&str>,
    page: PageQuery,
) -> RepoResult<(Vec<Ingredient>, u64)> {
    let pattern = name.map(like_pattern);
    let rows = sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredient \
         WHERE deleted_at IS NULL AND (?1 IS NULL OR name LIKE ?1 ESCAPE '\\') \
         ORDER BY name COLLATE NOCASE LIMIT ?2 OFFSET ?3"
    ))
    .bind(pattern.as_deref())
    .bind(page.limit as i64)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ingredient WHERE deleted_at IS NULL AND (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;
    Ok((rows, total as u64))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredient WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(ingredient)
}

/// Case-insensitive lookup
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredient WHERE name = ? COLLATE NOCASE AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(ingredient)
}

pub async fn create(pool: &SqlitePool, data: IngredientCreate) -> RepoResult<Ingredient> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO ingredient (id, name, quantity, price, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.quantity)
    .bind(data.price)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create ingredient".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: IngredientUpdate) -> RepoResult<Ingredient> {
    let rows = sqlx::query(
        "UPDATE ingredient SET name = COALESCE(?1, name), quantity = COALESCE(?2, quantity), \
         price = COALESCE(?3, price), updated_at = ?4 WHERE id = ?5 AND deleted_at IS NULL",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.quantity)
    .bind(data.price)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Ingredient {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ingredient {id} not found")))
}

/// Soft delete. Recipes that still reference the ingredient make their
/// drinks unconfirmable (the ledger reports the ingredient as missing).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE ingredient SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
