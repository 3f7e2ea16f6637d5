//! Order read paths (cached)

use shared::models::{Order, OrderQuery, PageQuery, PaginatedResponse};

use super::error::{OrderError, OrderResult};
use super::OrdersManager;
use crate::auth::CurrentUser;
use crate::cache::keys;
use crate::db::repository::order;

impl OrdersManager {
    /// Order with lines; customers may only read their own
    pub async fn get_order(&self, user: &CurrentUser, order_id: i64) -> OrderResult<Order> {
        let key = keys::order(order_id);
        let found = match self.cache.get_json::<Order>(&key).await {
            Some(cached) => cached,
            None => {
                let mut conn = self.pool.acquire().await?;
                let fetched = order::find_with_lines(&mut conn, order_id)
                    .await?
                    .ok_or(OrderError::OrderNotFound(order_id))?;
                self.cache.set_json(&key, &fetched).await;
                fetched
            }
        };
        Self::ensure_access(user, &found)?;
        Ok(found)
    }

    /// Paginated orders, oldest first
    ///
    /// Customers only ever see their own orders regardless of `user_id`.
    pub async fn list_orders(
        &self,
        user: &CurrentUser,
        mut query: OrderQuery,
        default_limit: u32,
        max_limit: u32,
    ) -> OrderResult<PaginatedResponse<Order>> {
        if !user.is_admin() {
            query.user_id = Some(user.id.clone());
        }
        let page = PageQuery::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(default_limit),
        )
        .normalized(max_limit);

        let key = keys::orders(
            page.page,
            page.limit,
            query.user_id.as_deref(),
            query.start,
            query.end,
        );
        if let Some(cached) = self.cache.get_json::<PaginatedResponse<Order>>(&key).await {
            return Ok(cached);
        }

        let (orders, total) = order::find_page(&self.pool, &query, page).await?;
        let response = PaginatedResponse::new(orders, total, page.page, page.limit);
        self.cache.set_json(&key, &response).await;
        Ok(response)
    }
}
