//! Error type and the JSON error envelope

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error: a code, a message and optional structured details
///
/// Stock errors carry the ingredient in `details`, state errors the
/// order id and statuses, so clients never have to parse the message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the default message of `code`
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn admin_required() -> Self {
        Self::new(ErrorCode::AdminRequired)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Insufficient stock, naming the ingredient in message and details
    pub fn insufficient_stock(ingredient: impl Into<String>) -> Self {
        let name = ingredient.into();
        Self::with_message(
            ErrorCode::InsufficientStock,
            format!("Not enough stock for ingredient: {name}"),
        )
        .with_detail("ingredient", name)
    }
}

/// Body of every error response
///
/// ```json
/// { "code": 5001, "message": "Not enough stock for ingredient: Milk",
///   "details": { "ingredient": "Milk", "required": 8, "available": 3 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_from_code() {
        let err = AppError::new(ErrorCode::OrderEmpty);
        assert_eq!(err.message, "Cannot confirm an empty order");
        assert!(err.details.is_none());
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::with_message(ErrorCode::OrderInvalidState, "Order 7 is DONE")
            .with_detail("order_id", 7)
            .with_detail("actual", "DONE");
        let details = err.details.unwrap();
        assert_eq!(details["order_id"], 7);
        assert_eq!(details["actual"], "DONE");
    }

    #[test]
    fn test_insufficient_stock_names_ingredient() {
        let err = AppError::insufficient_stock("Milk");
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.to_string(), "Not enough stock for ingredient: Milk");
        assert_eq!(err.details.unwrap()["ingredient"], "Milk");
    }

    #[test]
    fn test_auth_constructors_map_to_status() {
        assert_eq!(AppError::not_authenticated().http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::admin_required().http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_body_shape() {
        let err = AppError::with_message(ErrorCode::OrderNotFound, "Order 42 not found")
            .with_detail("order_id", 42);
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(json["code"], 4001);
        assert_eq!(json["message"], "Order 42 not found");
        assert_eq!(json["details"]["order_id"], 42);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_from_error_for_typed_body() {
        let response: ApiResponse<String> = AppError::database("disk full").into();
        assert_eq!(response.code, Some(9002));
        assert!(response.data.is_none());
    }
}
