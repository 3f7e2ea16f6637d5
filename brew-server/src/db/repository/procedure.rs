//! Drink procedure documents

use super::RepoResult;
use shared::models::{DrinkProcedure, RecipeStep, procedure_id};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, drink_id, drink_name, steps, updated_at";

pub async fn find_by_drink(pool: &SqlitePool, drink_id: i64) -> RepoResult<Option<DrinkProcedure>> {
    let procedure = sqlx::query_as::<_, DrinkProcedure>(&format!(
        "SELECT {COLUMNS} FROM drink_procedure WHERE drink_id = ?"
    ))
    .bind(drink_id)
    .fetch_optional(pool)
    .await?;
    Ok(procedure)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DrinkProcedure>> {
    let procedures = sqlx::query_as::<_, DrinkProcedure>(&format!(
        "SELECT {COLUMNS} FROM drink_procedure ORDER BY drink_name COLLATE NOCASE"
    ))
    .fetch_all(pool)
    .await?;
    Ok(procedures)
}

/// Insert or replace the procedure of a drink
pub async fn upsert(
    pool: &SqlitePool,
    drink_id: i64,
    drink_name: &str,
    steps: &[RecipeStep],
) -> RepoResult<DrinkProcedure> {
    let now = now_millis();
    let steps_json = serde_json::to_string(steps)?;
    sqlx::query(
        "INSERT INTO drink_procedure (drink_id, id, drink_name, steps, updated_at) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT (drink_id) DO UPDATE SET drink_name = ?3, steps = ?4, updated_at = ?5",
    )
    .bind(drink_id)
    .bind(procedure_id(drink_id))
    .bind(drink_name)
    .bind(&steps_json)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(DrinkProcedure {
        id: procedure_id(drink_id),
        drink_id,
        drink_name: drink_name.to_string(),
        steps: steps.to_vec(),
        updated_at: now,
    })
}
