//! Order Repository
//!
//! Header and line access for orders. Everything a state change touches
//! takes `&mut SqliteConnection` so it runs on the caller's transaction.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderLine, OrderQuery, OrderStatus, PageQuery};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

const COLUMNS: &str = "id, user_id, status, total_price, created_at, updated_at, deleted_at";

const LINE_SELECT: &str = "SELECT l.id, l.order_id, l.drink_id, d.name AS drink_name, \
     d.price AS unit_price, l.quantity, l.note, l.created_at \
     FROM order_line l JOIN drink d ON d.id = l.drink_id";

// ========== Reads ==========

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Order header plus its lines
pub async fn find_with_lines(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let Some(mut order) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    order.lines = find_lines(conn, id).await?;
    Ok(Some(order))
}

pub async fn find_open_cart(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE user_id = ? AND status = 'CART' AND deleted_at IS NULL"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn find_lines(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(&format!(
        "{LINE_SELECT} WHERE l.order_id = ? ORDER BY l.created_at, l.id"
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

pub async fn find_line(conn: &mut SqliteConnection, line_id: i64) -> RepoResult<Option<OrderLine>> {
    let line = sqlx::query_as::<_, OrderLine>(&format!("{LINE_SELECT} WHERE l.id = ?"))
        .bind(line_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

pub async fn find_line_by_drink(
    conn: &mut SqliteConnection,
    order_id: i64,
    drink_id: i64,
) -> RepoResult<Option<OrderLine>> {
    let line = sqlx::query_as::<_, OrderLine>(&format!(
        "{LINE_SELECT} WHERE l.order_id = ? AND l.drink_id = ?"
    ))
    .bind(order_id)
    .bind(drink_id)
    .fetch_optional(conn)
    .await?;
    Ok(line)
}

/// `(drink_id, quantity)` for every line of the order
pub async fn line_quantities(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<(i64, i64)>> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        "SELECT drink_id, quantity FROM order_line WHERE order_id = ? ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Paginated order listing, oldest first
///
/// The end bound only applies when there is no start bound or it is
/// strictly before the end.
pub async fn find_page(
    pool: &SqlitePool,
    query: &OrderQuery,
    page: PageQuery,
) -> RepoResult<(Vec<Order>, u64)> {
    let end = match (query.start, query.end) {
        (Some(start), Some(end)) if start >= end => None,
        (_, end) => end,
    };

    fn push_filter<'a>(
        qb: &mut QueryBuilder<'a, Sqlite>,
        query: &'a OrderQuery,
        end: Option<i64>,
    ) {
        qb.push(" WHERE deleted_at IS NULL");
        if let Some(user_id) = &query.user_id {
            qb.push(" AND user_id = ").push_bind(user_id.as_str());
        }
        if let Some(start) = query.start {
            qb.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = end {
            qb.push(" AND created_at <= ").push_bind(end);
        }
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM orders"));
    push_filter(&mut qb, query, end);
    qb.push(" ORDER BY created_at ASC, id ASC LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let mut orders = qb.build_query_as::<Order>().fetch_all(pool).await?;

    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut count_qb, query, end);
    let total: i64 = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut lines = find_lines_for_orders(pool, &ids).await?;
    for order in &mut orders {
        order.lines = lines.remove(&order.id).unwrap_or_default();
    }

    Ok((orders, total as u64))
}

async fn find_lines_for_orders(
    pool: &SqlitePool,
    order_ids: &[i64],
) -> RepoResult<HashMap<i64, Vec<OrderLine>>> {
    let mut grouped: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("{LINE_SELECT} WHERE l.order_id IN ("));
    let mut separated = qb.separated(", ");
    for id in order_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY l.created_at, l.id");
    for line in qb.build_query_as::<OrderLine>().fetch_all(pool).await? {
        grouped.entry(line.order_id).or_default().push(line);
    }
    Ok(grouped)
}

// ========== Writes (caller's transaction) ==========

/// Insert an empty cart unless the user already has one
///
/// Returns `false` when the partial unique index rejected the row.
pub async fn insert_cart(conn: &mut SqliteConnection, user_id: &str) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "INSERT INTO orders (id, user_id, status, total_price, created_at, updated_at) \
         VALUES (?, ?, 'CART', 0, ?, ?) ON CONFLICT DO NOTHING",
    )
    .bind(snowflake_id())
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Write to the order row so the transaction holds the write lock before it
/// reads anything else. Returns `false` if the order does not exist.
pub async fn touch(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE orders SET updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Conditional status change; `false` means the order was not in `from`
pub async fn transition(
    conn: &mut SqliteConnection,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ? AND deleted_at IS NULL",
    )
    .bind(to)
    .bind(now_millis())
    .bind(id)
    .bind(from)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_total(conn: &mut SqliteConnection, id: i64, total: f64) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET total_price = ? WHERE id = ?")
        .bind(total)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_line(
    conn: &mut SqliteConnection,
    order_id: i64,
    drink_id: i64,
    quantity: i64,
    note: Option<&str>,
) -> RepoResult<i64> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO order_line (id, order_id, drink_id, quantity, note, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(order_id)
    .bind(drink_id)
    .bind(quantity)
    .bind(note)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Set the quantity; a `None` note keeps the current one
pub async fn update_line(
    conn: &mut SqliteConnection,
    line_id: i64,
    quantity: i64,
    note: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE order_line SET quantity = ?, note = COALESCE(?, note), updated_at = ? WHERE id = ?",
    )
    .bind(quantity)
    .bind(note)
    .bind(now_millis())
    .bind(line_id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order line {line_id} not found")));
    }
    Ok(())
}

pub async fn delete_line(conn: &mut SqliteConnection, line_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM order_line WHERE id = ?")
        .bind(line_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Soft delete unless the order holds reserved stock
///
/// `false` means the order is missing or still CONFIRMED.
pub async fn soft_delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET deleted_at = ?1, updated_at = ?1 \
         WHERE id = ?2 AND deleted_at IS NULL AND status <> 'CONFIRMED'",
    )
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
