//! Drink Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{Drink, DrinkCreate, DrinkFilter, DrinkSummary, DrinkUpdate, PageQuery};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, price, is_available, category_id, description, image_url, created_at, updated_at, deleted_at";

const SUMMARY_SELECT: &str = "SELECT d.id, d.name, d.price, d.is_available, d.category_id, \
     c.name AS category_name, d.description, d.image_url \
     FROM drink d LEFT JOIN category c ON c.id = d.category_id AND c.deleted_at IS NULL";

const FILTER: &str = "d.deleted_at IS NULL \
     AND (?1 IS NULL OR d.name LIKE ?1 ESCAPE '\\') \
     AND (?2 IS NULL OR c.name LIKE ?2 ESCAPE '\\')";

/// Makeable right now: flagged available, has a recipe, and every recipe
/// ingredient exists with enough stock for one unit.
const MAKEABLE: &str = "d.is_available = 1 \
     AND EXISTS (SELECT 1 FROM recipe r WHERE r.drink_id = d.id) \
     AND NOT EXISTS ( \
         SELECT 1 FROM recipe r \
         LEFT JOIN ingredient i ON i.id = r.ingredient_id AND i.deleted_at IS NULL \
         WHERE r.drink_id = d.id AND (i.id IS NULL OR i.quantity < r.quantity))";

async fn summary_page(
    pool: &SqlitePool,
    filter: &DrinkFilter,
    page: PageQuery,
    makeable_only: bool,
) -> RepoResult<(Vec<DrinkSummary>, u64)> {
    let name = filter.name.as_deref().map(like_pattern);
    let category = filter.category.as_deref().map(like_pattern);
    let extra = if makeable_only {
        format!(" AND {MAKEABLE}")
    } else {
        String::new()
    };

    let rows = sqlx::query_as::<_, DrinkSummary>(&format!(
        "{SUMMARY_SELECT} WHERE {FILTER}{extra} ORDER BY d.name COLLATE NOCASE LIMIT ?3 OFFSET ?4"
    ))
    .bind(name.as_deref())
    .bind(category.as_deref())
    .bind(page.limit as i64)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM drink d LEFT JOIN category c ON c.id = d.category_id AND c.deleted_at IS NULL \
         WHERE {FILTER}{extra}"
    ))
    .bind(name.as_deref())
    .bind(category.as_deref())
    .fetch_one(pool)
    .await?;

    Ok((rows, total as u64))
}

/// Every (non-deleted) drink, ordered by name
pub async fn find_page(
    pool: &SqlitePool,
    filter: &DrinkFilter,
    page: PageQuery,
) -> RepoResult<(Vec<DrinkSummary>, u64)> {
    summary_page(pool, filter, page, false).await
}

/// Drinks that can be made from the current stock, ordered by name
pub async fn find_available_page(
    pool: &SqlitePool,
    filter: &DrinkFilter,
    page: PageQuery,
) -> RepoResult<(Vec<DrinkSummary>, u64)> {
    summary_page(pool, filter, page, true).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Drink>> {
    let drink = sqlx::query_as::<_, Drink>(&format!(
        "SELECT {COLUMNS} FROM drink WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(drink)
}

/// Lookup inside a caller's transaction (cart edits)
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Drink>> {
    let drink = sqlx::query_as::<_, Drink>(&format!(
        "SELECT {COLUMNS} FROM drink WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(drink)
}

/// Case-insensitive lookup
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Drink>> {
    let drink = sqlx::query_as::<_, Drink>(&format!(
        "SELECT {COLUMNS} FROM drink WHERE name = ? COLLATE NOCASE AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(drink)
}

/// Whether the drink is makeable from the current stock
pub async fn is_makeable(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(&format!(
        "SELECT d.id FROM drink d WHERE d.id = ? AND d.deleted_at IS NULL AND {MAKEABLE}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, data: DrinkCreate) -> RepoResult<Drink> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO drink (id, name, price, is_available, category_id, description, image_url, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.price)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.category_id)
    .bind(data.description)
    .bind(data.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create drink".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DrinkUpdate) -> RepoResult<Drink> {
    let rows = sqlx::query(
        "UPDATE drink SET name = COALESCE(?1, name), price = COALESCE(?2, price), \
         is_available = COALESCE(?3, is_available), category_id = COALESCE(?4, category_id), \
         description = COALESCE(?5, description), image_url = COALESCE(?6, image_url), updated_at = ?7 \
         WHERE id = ?8 AND deleted_at IS NULL",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.price)
    .bind(data.is_available)
    .bind(data.category_id)
    .bind(data.description)
    .bind(data.image_url)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Drink {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Drink {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE drink SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
