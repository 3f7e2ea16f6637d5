//! Machine documents

use super::RepoResult;
use shared::models::Machine;
use shared::util::now_millis;
use sqlx::SqlitePool;

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Machine>> {
    let machine = sqlx::query_as::<_, Machine>(
        "SELECT name, ingredient, modes FROM machine WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(machine)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Machine>> {
    let machines =
        sqlx::query_as::<_, Machine>("SELECT name, ingredient, modes FROM machine ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(machines)
}

pub async fn upsert(pool: &SqlitePool, machine: &Machine) -> RepoResult<()> {
    let modes_json = serde_json::to_string(&machine.modes)?;
    sqlx::query(
        "INSERT INTO machine (name, ingredient, modes, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (name) DO UPDATE SET ingredient = ?2, modes = ?3, updated_at = ?4",
    )
    .bind(&machine.name)
    .bind(&machine.ingredient)
    .bind(&modes_json)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
