//! Order state machine
//!
//! `CART → CONFIRMED → DONE`, `CONFIRMED → CANCELED`.

use shared::models::{Order, OrderStatus};

use super::error::{OrderError, OrderResult};
use super::{OrdersManager, ledger, resolver};
use crate::auth::CurrentUser;
use crate::db::repository::order;

impl OrdersManager {
    /// Reserve stock for the cart and confirm it
    ///
    /// Machine instructions are published after commit; publish failures are
    /// logged and never undo the confirmation.
    pub async fn confirm(&self, user: &CurrentUser, order_id: i64) -> OrderResult<Order> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_order(&mut tx, order_id).await?;
        Self::ensure_access(user, &current)?;
        Self::ensure_status(&current, OrderStatus::Cart)?;

        let lines = order::line_quantities(&mut tx, order_id).await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder(order_id));
        }

        let requirements = resolver::resolve(&mut tx, &lines).await?;
        ledger::reserve(&mut tx, order_id, &requirements).await?;
        if !order::transition(&mut tx, order_id, OrderStatus::Cart, OrderStatus::Confirmed).await? {
            return Err(OrderError::InvalidState {
                order_id,
                actual: current.status,
                expected: OrderStatus::Cart,
            });
        }
        let confirmed = order::find_with_lines(&mut tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            user_id = %confirmed.user_id,
            lines = confirmed.lines.len(),
            ingredients = requirements.len(),
            "Order confirmed"
        );
        self.invalidate_order(order_id).await;
        self.invalidate_stock(&requirements).await;

        let report = self.publisher.publish_order(&confirmed).await;
        if !report.is_complete() {
            tracing::warn!(order_id, ?report, "Machine instructions partially published");
        }
        Ok(confirmed)
    }

    /// Cancel a confirmed order and return its stock
    ///
    /// Returns exactly what confirm reserved, whatever the recipes say now.
    pub async fn cancel(&self, user: &CurrentUser, order_id: i64) -> OrderResult<Order> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_order(&mut tx, order_id).await?;
        Self::ensure_access(user, &current)?;
        Self::ensure_status(&current, OrderStatus::Confirmed)?;

        let requirements = ledger::release(&mut tx, order_id).await?;
        order::transition(&mut tx, order_id, OrderStatus::Confirmed, OrderStatus::Canceled).await?;
        let canceled = order::find_with_lines(&mut tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(order_id, canceled_by = %user.id, "Order canceled");
        self.invalidate_order(order_id).await;
        self.invalidate_stock(&requirements).await;
        Ok(canceled)
    }

    /// Mark a confirmed order as done; no stock effect
    pub async fn complete(&self, order_id: i64) -> OrderResult<Order> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_order(&mut tx, order_id).await?;
        Self::ensure_status(&current, OrderStatus::Confirmed)?;

        order::transition(&mut tx, order_id, OrderStatus::Confirmed, OrderStatus::Done).await?;
        let done = order::find_with_lines(&mut tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(order_id, "Order completed");
        self.invalidate_order(order_id).await;
        Ok(done)
    }

    /// Soft delete (admin)
    ///
    /// A confirmed order still holds reserved stock and must be canceled or
    /// completed first.
    pub async fn delete(&self, order_id: i64) -> OrderResult<()> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_order(&mut tx, order_id).await?;
        if current.status == OrderStatus::Confirmed {
            return Err(OrderError::StockReserved(order_id));
        }
        if !order::soft_delete(&mut tx, order_id).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }
        tx.commit().await?;

        tracing::info!(order_id, status = %current.status, "Order deleted");
        self.invalidate_order(order_id).await;
        Ok(())
    }
}
