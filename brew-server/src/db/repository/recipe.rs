//! Recipe Repository (relational recipe rows)

use super::{RepoError, RepoResult};
use shared::models::{Recipe, RecipeCreate, RecipeEntry};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, drink_id, ingredient_id, quantity, created_at, updated_at";

const ENTRY_SELECT: &str = "SELECT r.id, r.drink_id, r.ingredient_id, i.name AS ingredient_name, r.quantity \
     FROM recipe r JOIN ingredient i ON i.id = r.ingredient_id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!("SELECT {COLUMNS} FROM recipe WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(recipe)
}

/// Recipe rows of a drink with ingredient names, ordered by ingredient name
pub async fn find_by_drink(pool: &SqlitePool, drink_id: i64) -> RepoResult<Vec<RecipeEntry>> {
    let rows = sqlx::query_as::<_, RecipeEntry>(&format!(
        "{ENTRY_SELECT} WHERE r.drink_id = ? ORDER BY i.name COLLATE NOCASE"
    ))
    .bind(drink_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Raw `(drink_id, ingredient_id, quantity)` rows for a set of drinks
///
/// Runs on the caller's transaction. Soft-deleted ingredients are kept so
/// the ledger can report them as missing.
pub async fn find_requirements(
    conn: &mut SqliteConnection,
    drink_ids: &[i64],
) -> RepoResult<Vec<(i64, i64, i64)>> {
    if drink_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT drink_id, ingredient_id, quantity FROM recipe WHERE drink_id IN (");
    let mut separated = qb.separated(", ");
    for id in drink_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY drink_id, ingredient_id");
    let rows = qb
        .build_query_as::<(i64, i64, i64)>()
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: RecipeCreate) -> RepoResult<Recipe> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO recipe (id, drink_id, ingredient_id, quantity, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.drink_id)
    .bind(data.ingredient_id)
    .bind(data.quantity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create recipe".into()))
}

pub async fn update_quantity(pool: &SqlitePool, id: i64, quantity: i64) -> RepoResult<Recipe> {
    let rows = sqlx::query("UPDATE recipe SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Recipe {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Recipe {id} not found")))
}

/// Hard delete; recipe rows carry no history
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM recipe WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
