//! Order lifecycle errors

use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

/// Errors raised by the cart manager, resolver, ledger and state machine
///
/// Every variant aborts the surrounding transaction.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Order line {0} not found")]
    LineNotFound(i64),

    #[error("Order {0} belongs to another user")]
    NotOwner(i64),

    #[error("Order {order_id} is {actual}; this operation requires {expected}")]
    InvalidState {
        order_id: i64,
        actual: OrderStatus,
        expected: OrderStatus,
    },

    #[error("Order {0} holds reserved stock; cancel or complete it first")]
    StockReserved(i64),

    #[error("Cannot confirm an empty order")]
    EmptyOrder(i64),

    #[error("No recipe found for drink: {name}")]
    RecipeMissing { drink_id: i64, name: String },

    #[error("Not enough stock for ingredient: {name}")]
    InsufficientStock {
        ingredient_id: i64,
        name: String,
        required: i64,
        available: i64,
    },

    #[error("Ingredient {0} is missing from the ledger")]
    MissingIngredient(i64),

    #[error("Drink {0} not found")]
    DrinkNotFound(i64),

    #[error("Drink {0} is not available")]
    DrinkUnavailable(i64),

    #[error("{0}")]
    Validation(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Repo(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::Repo(e) => e.into(),
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            OrderError::LineNotFound(id) => {
                AppError::with_message(ErrorCode::OrderLineNotFound, message)
                    .with_detail("line_id", id)
            }
            OrderError::NotOwner(id) => {
                AppError::with_message(ErrorCode::NotOrderOwner, message).with_detail("order_id", id)
            }
            OrderError::InvalidState {
                order_id,
                actual,
                expected,
            } => {
                let code = match actual {
                    OrderStatus::Done => ErrorCode::OrderAlreadyCompleted,
                    OrderStatus::Canceled => ErrorCode::OrderAlreadyCanceled,
                    _ => ErrorCode::OrderInvalidState,
                };
                AppError::with_message(code, message)
                    .with_detail("order_id", order_id)
                    .with_detail("status", actual.as_str())
                    .with_detail("expected", expected.as_str())
            }
            OrderError::StockReserved(id) => AppError::with_message(ErrorCode::OrderInvalidState, message)
                .with_detail("order_id", id)
                .with_detail("status", OrderStatus::Confirmed.as_str()),
            OrderError::EmptyOrder(id) => {
                AppError::with_message(ErrorCode::OrderEmpty, message).with_detail("order_id", id)
            }
            OrderError::RecipeMissing { drink_id, name } => {
                AppError::with_message(ErrorCode::RecipeMissing, message)
                    .with_detail("drink_id", drink_id)
                    .with_detail("drink", name)
            }
            OrderError::InsufficientStock {
                ingredient_id,
                name,
                required,
                available,
            } => AppError::insufficient_stock(name)
                .with_detail("ingredient_id", ingredient_id)
                .with_detail("required", required)
                .with_detail("available", available),
            OrderError::MissingIngredient(id) => {
                AppError::with_message(ErrorCode::IngredientMissing, message)
                    .with_detail("ingredient_id", id)
            }
            OrderError::DrinkNotFound(id) => {
                AppError::with_message(ErrorCode::DrinkNotFound, message).with_detail("drink_id", id)
            }
            OrderError::DrinkUnavailable(id) => {
                AppError::with_message(ErrorCode::DrinkUnavailable, message)
                    .with_detail("drink_id", id)
            }
            OrderError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_names_ingredient() {
        let err: AppError = OrderError::InsufficientStock {
            ingredient_id: 7,
            name: "Milk".into(),
            required: 8,
            available: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Not enough stock for ingredient: Milk");
        let details = err.details.unwrap();
        assert_eq!(details["ingredient"], "Milk");
        assert_eq!(details["available"], 3);
    }

    #[test]
    fn test_invalid_state_codes_follow_actual_status() {
        let state = |actual| -> AppError {
            OrderError::InvalidState {
                order_id: 1,
                actual,
                expected: OrderStatus::Confirmed,
            }
            .into()
        };
        assert_eq!(state(OrderStatus::Cart).code, ErrorCode::OrderInvalidState);
        assert_eq!(state(OrderStatus::Done).code, ErrorCode::OrderAlreadyCompleted);
        assert_eq!(state(OrderStatus::Canceled).code, ErrorCode::OrderAlreadyCanceled);
        assert!(state(OrderStatus::Cart).message.contains("requires CONFIRMED"));
    }

    #[test]
    fn test_stock_reserved_is_a_state_conflict() {
        let err: AppError = OrderError::StockReserved(9).into();
        assert_eq!(err.code, ErrorCode::OrderInvalidState);
        assert_eq!(err.http_status(), axum::http::StatusCode::CONFLICT);
        assert_eq!(err.details.unwrap()["status"], "CONFIRMED");
    }

    #[test]
    fn test_repo_errors_pass_through() {
        let err: AppError = OrderError::Repo(RepoError::Database("database is locked".into())).into();
        assert_eq!(err.code, ErrorCode::SystemBusy);
    }
}
