//! Stock ledger
//!
//! Ingredient on-hand quantities, mutated only through [`reserve`] (confirm)
//! and [`release`] (cancel). A confirm records what it took in
//! `order_reservation`, and cancel gives back that record rather than the
//! current recipe. All functions run on the caller's transaction; the caller
//! must already hold the write lock (see `repository::order::touch`).

use std::collections::{BTreeMap, HashMap};

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::error::{OrderError, OrderResult};
use shared::util::now_millis;

/// Required quantity per ingredient id
pub type Requirements = BTreeMap<i64, i64>;

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: i64,
    name: String,
    quantity: i64,
    deleted_at: Option<i64>,
}

async fn load_rows(
    conn: &mut SqliteConnection,
    ids: impl Iterator<Item = i64>,
) -> OrderResult<HashMap<i64, StockRow>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, name, quantity, deleted_at FROM ingredient WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
    let rows = qb.build_query_as::<StockRow>().fetch_all(conn).await?;
    Ok(rows.into_iter().map(|r| (r.id, r)).collect())
}

/// Validate `requirements` against current stock without mutating it
///
/// Missing (or soft-deleted) ingredients are reported before any shortfall.
pub async fn check(conn: &mut SqliteConnection, requirements: &Requirements) -> OrderResult<()> {
    if requirements.is_empty() {
        return Ok(());
    }
    let rows = load_rows(conn, requirements.keys().copied()).await?;

    for id in requirements.keys() {
        match rows.get(id) {
            Some(row) if row.deleted_at.is_none() => {}
            _ => return Err(OrderError::MissingIngredient(*id)),
        }
    }

    for (id, required) in requirements {
        let row = &rows[id];
        if row.quantity < *required {
            return Err(OrderError::InsufficientStock {
                ingredient_id: *id,
                name: row.name.clone(),
                required: *required,
                available: row.quantity,
            });
        }
    }
    Ok(())
}

/// Decrement every required ingredient for `order_id`, all or nothing
pub async fn reserve(
    conn: &mut SqliteConnection,
    order_id: i64,
    requirements: &Requirements,
) -> OrderResult<()> {
    check(&mut *conn, requirements).await?;

    let now = now_millis();
    for (id, required) in requirements {
        let rows = sqlx::query(
            "UPDATE ingredient SET quantity = quantity - ?1, updated_at = ?2 \
             WHERE id = ?3 AND deleted_at IS NULL AND quantity >= ?1",
        )
        .bind(required)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        // unreachable while the caller holds the write lock; the caller's
        // rollback undoes any earlier decrements
        if rows.rows_affected() == 0 {
            return Err(OrderError::InsufficientStock {
                ingredient_id: *id,
                name: format!("#{id}"),
                required: *required,
                available: 0,
            });
        }
    }
    record(&mut *conn, order_id, requirements).await?;
    tracing::debug!(order_id, ingredients = requirements.len(), "Stock reserved");
    Ok(())
}

async fn record(
    conn: &mut SqliteConnection,
    order_id: i64,
    requirements: &Requirements,
) -> OrderResult<()> {
    if requirements.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO order_reservation (order_id, ingredient_id, quantity) ");
    qb.push_values(requirements, |mut row, (ingredient_id, quantity)| {
        row.push_bind(order_id)
            .push_bind(*ingredient_id)
            .push_bind(*quantity);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

/// What the confirm of `order_id` took from stock
pub async fn reserved(conn: &mut SqliteConnection, order_id: i64) -> OrderResult<Requirements> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        "SELECT ingredient_id, quantity FROM order_reservation WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Return the stock reserved for `order_id` and drop its record
///
/// Soft-deleted ingredients are restocked as well so quantities stay
/// conserved across confirm/cancel.
pub async fn release(conn: &mut SqliteConnection, order_id: i64) -> OrderResult<Requirements> {
    let requirements = reserved(&mut *conn, order_id).await?;
    let now = now_millis();
    for (id, quantity) in &requirements {
        let rows = sqlx::query(
            "UPDATE ingredient SET quantity = quantity + ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if rows.rows_affected() == 0 {
            tracing::warn!(ingredient_id = id, quantity, "Released stock for unknown ingredient");
        }
    }
    sqlx::query("DELETE FROM order_reservation WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    tracing::debug!(order_id, ingredients = requirements.len(), "Stock released");
    Ok(requirements)
}
