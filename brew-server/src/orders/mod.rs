//! Order lifecycle and stock reservation
//!
//! # Flow
//!
//! ```text
//! add/update/remove line ──▶ cart (resolver + ledger::check)
//!                                  │
//! confirm ──▶ resolver ──▶ ledger::reserve (+ order_reservation) ──▶ CART→CONFIRMED ──▶ commit
//!                                                                                          │
//!                                                                                InstructionPublisher
//! cancel  ──▶ ledger::release (order_reservation) ──▶ CONFIRMED→CANCELED
//! complete ─────────────────────────────────▶ CONFIRMED→DONE
//! ```
//!
//! Every state-changing call is one SQLite transaction whose first statement
//! writes the order row, so the transaction owns the database write lock
//! before it reads any stock. Errors drop the transaction, which rolls it
//! back. Cache invalidation and publishing happen only after commit.

pub mod cart;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod query;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use error::{OrderError, OrderResult};
pub use ledger::Requirements;

use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};

use crate::auth::CurrentUser;
use crate::cache::{CacheService, keys};
use crate::db::repository::order;
use crate::instructions::InstructionPublisher;
use shared::models::{Order, OrderStatus};

/// Cart manager and order state machine
#[derive(Debug, Clone)]
pub struct OrdersManager {
    pool: SqlitePool,
    cache: CacheService,
    publisher: Arc<InstructionPublisher>,
}

impl OrdersManager {
    pub fn new(pool: SqlitePool, cache: CacheService, publisher: Arc<InstructionPublisher>) -> Self {
        Self {
            pool,
            cache,
            publisher,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Take the write lock on `order_id` and load the header
    ///
    /// Must be the first statement of every state-changing transaction.
    async fn lock_order(conn: &mut SqliteConnection, order_id: i64) -> OrderResult<Order> {
        if !order::touch(&mut *conn, order_id).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }
        order::find_by_id(conn, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    fn ensure_access(user: &CurrentUser, order: &Order) -> OrderResult<()> {
        if user.can_access(&order.user_id) {
            Ok(())
        } else {
            Err(OrderError::NotOwner(order.id))
        }
    }

    fn ensure_status(order: &Order, expected: OrderStatus) -> OrderResult<()> {
        if order.status == expected {
            Ok(())
        } else {
            Err(OrderError::InvalidState {
                order_id: order.id,
                actual: order.status,
                expected,
            })
        }
    }

    /// Order caches after a cart or status change
    async fn invalidate_order(&self, order_id: i64) {
        self.cache.invalidate_order(order_id).await;
    }

    /// Catalog caches after stock moved
    async fn invalidate_stock(&self, requirements: &Requirements) {
        for ingredient_id in requirements.keys() {
            self.cache.remove(&keys::ingredient(*ingredient_id)).await;
        }
        self.cache.remove_by_prefix(keys::INGREDIENTS_PREFIX).await;
        self.cache.remove_by_prefix(keys::DRINKS_PREFIX).await;
        self.cache.remove_by_prefix(keys::DRINK_PREFIX).await;
    }
}
