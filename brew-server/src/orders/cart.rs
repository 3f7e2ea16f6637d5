//! Cart manager
//!
//! One open cart per user. Line edits validate stock for the increment only;
//! stock is not held until the order is confirmed.

use shared::models::{AddLineRequest, LineUpdate, Order, OrderLine, OrderStatus, UpdateLineRequest};
use sqlx::SqliteConnection;

use super::error::{OrderError, OrderResult};
use super::{OrdersManager, ledger, resolver};
use crate::auth::CurrentUser;
use crate::db::repository::{drink, order};
use crate::utils::money;
use crate::utils::validation::{MAX_LINE_QUANTITY, MAX_NOTE_LEN};

fn validate_quantity(quantity: i64, allow_zero: bool) -> OrderResult<()> {
    let min = if allow_zero { 0 } else { 1 };
    if quantity < min || quantity > MAX_LINE_QUANTITY {
        return Err(OrderError::Validation(format!(
            "Quantity must be between {min} and {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

fn validate_note(note: Option<&str>) -> OrderResult<()> {
    if let Some(note) = note
        && note.chars().count() > MAX_NOTE_LEN
    {
        return Err(OrderError::Validation(format!(
            "Note is too long (max {MAX_NOTE_LEN} chars)"
        )));
    }
    Ok(())
}

/// Recompute and store Σ(quantity × current drink price)
async fn recompute_total(conn: &mut SqliteConnection, order_id: i64) -> OrderResult<f64> {
    let lines = order::find_lines(&mut *conn, order_id).await?;
    let total = money::order_total(&lines);
    order::set_total(conn, order_id, total).await?;
    Ok(total)
}

/// Stock check for `units` more of `drink_id`
async fn check_increment(conn: &mut SqliteConnection, drink_id: i64, units: i64) -> OrderResult<()> {
    let requirements = resolver::resolve(&mut *conn, &[(drink_id, units)]).await?;
    ledger::check(conn, &requirements).await
}

impl OrdersManager {
    /// The user's open cart with its lines, created on first access
    pub async fn get_or_create_cart(&self, user: &CurrentUser) -> OrderResult<Order> {
        let mut conn = self.pool.acquire().await?;
        if let Some(cart) = order::find_open_cart(&mut conn, &user.id).await? {
            return Ok(order::find_with_lines(&mut conn, cart.id)
                .await?
                .unwrap_or(cart));
        }
        drop(conn);

        let mut tx = self.pool.begin().await?;
        let created = order::insert_cart(&mut tx, &user.id).await?;
        let cart = order::find_open_cart(&mut tx, &user.id)
            .await?
            .ok_or_else(|| OrderError::Validation("Cart could not be created".into()))?;
        tx.commit().await?;

        if created {
            tracing::info!(order_id = cart.id, user_id = %user.id, "Cart created");
            self.invalidate_order(cart.id).await;
        }
        Ok(cart)
    }

    /// Add `quantity` of a drink; an existing line for the drink is merged
    pub async fn add_line(
        &self,
        user: &CurrentUser,
        cart_id: i64,
        req: AddLineRequest,
    ) -> OrderResult<OrderLine> {
        validate_quantity(req.quantity, false)?;
        validate_note(req.note.as_deref())?;

        let mut tx = self.pool.begin().await?;
        let cart = Self::lock_order(&mut tx, cart_id).await?;
        Self::ensure_access(user, &cart)?;
        Self::ensure_status(&cart, OrderStatus::Cart)?;

        let drink = drink::find_by_id_tx(&mut tx, req.drink_id)
            .await?
            .ok_or(OrderError::DrinkNotFound(req.drink_id))?;
        if !drink.is_available {
            return Err(OrderError::DrinkUnavailable(drink.id));
        }

        check_increment(&mut tx, drink.id, req.quantity).await?;

        let line_id = match order::find_line_by_drink(&mut tx, cart_id, drink.id).await? {
            Some(existing) => {
                let merged = existing.quantity + req.quantity;
                validate_quantity(merged, false)?;
                order::update_line(&mut tx, existing.id, merged, req.note.as_deref()).await?;
                existing.id
            }
            None => {
                order::insert_line(&mut tx, cart_id, drink.id, req.quantity, req.note.as_deref())
                    .await?
            }
        };
        let total = recompute_total(&mut tx, cart_id).await?;
        let line = order::find_line(&mut tx, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?;
        tx.commit().await?;

        tracing::info!(
            order_id = cart_id,
            drink_id = drink.id,
            quantity = line.quantity,
            total,
            "Cart line added"
        );
        self.invalidate_order(cart_id).await;
        Ok(line)
    }

    /// Delete a line from the caller's cart
    pub async fn remove_line(&self, user: &CurrentUser, line_id: i64) -> OrderResult<()> {
        let order_id = self.line_order_id(line_id).await?;

        let mut tx = self.pool.begin().await?;
        let cart = Self::lock_order(&mut tx, order_id).await?;
        Self::ensure_access(user, &cart)?;
        Self::ensure_status(&cart, OrderStatus::Cart)?;

        if !order::delete_line(&mut tx, line_id).await? {
            return Err(OrderError::LineNotFound(line_id));
        }
        let total = recompute_total(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(order_id, line_id, total, "Cart line removed");
        self.invalidate_order(order_id).await;
        Ok(())
    }

    /// Set a line's quantity; zero removes it
    ///
    /// Increases are validated against stock for the delta only.
    pub async fn update_line(
        &self,
        user: &CurrentUser,
        line_id: i64,
        req: UpdateLineRequest,
    ) -> OrderResult<LineUpdate> {
        validate_quantity(req.quantity, true)?;
        validate_note(req.note.as_deref())?;
        let order_id = self.line_order_id(line_id).await?;

        let mut tx = self.pool.begin().await?;
        let cart = Self::lock_order(&mut tx, order_id).await?;
        Self::ensure_access(user, &cart)?;
        Self::ensure_status(&cart, OrderStatus::Cart)?;

        let current = order::find_line(&mut tx, line_id)
            .await?
            .filter(|l| l.order_id == order_id)
            .ok_or(OrderError::LineNotFound(line_id))?;

        let result = if req.quantity == 0 {
            order::delete_line(&mut tx, line_id).await?;
            None
        } else {
            let delta = req.quantity - current.quantity;
            if delta > 0 {
                check_increment(&mut tx, current.drink_id, delta).await?;
            }
            order::update_line(&mut tx, line_id, req.quantity, req.note.as_deref()).await?;
            Some(())
        };
        let total = recompute_total(&mut tx, order_id).await?;
        let update = match result {
            None => LineUpdate::Removed,
            Some(()) => LineUpdate::Updated(
                order::find_line(&mut tx, line_id)
                    .await?
                    .ok_or(OrderError::LineNotFound(line_id))?,
            ),
        };
        tx.commit().await?;

        tracing::info!(order_id, line_id, quantity = req.quantity, total, "Cart line updated");
        self.invalidate_order(order_id).await;
        Ok(update)
    }

    /// Owning order of a line, read before the write transaction starts
    async fn line_order_id(&self, line_id: i64) -> OrderResult<i64> {
        let mut conn = self.pool.acquire().await?;
        order::find_line(&mut conn, line_id)
            .await?
            .map(|l| l.order_id)
            .ok_or(OrderError::LineNotFound(line_id))
    }
}
