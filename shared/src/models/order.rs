//! Order Model
//!
//! An order in `Cart` status is the user's mutable basket. Confirmation
//! reserves stock and freezes the line quantities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
///
/// Transitions: `Cart -> Confirmed -> Done` and `Confirmed -> Canceled`.
/// `Preparing` is reserved for machine-side progress and is never set by the
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Cart,
    Confirmed,
    Preparing,
    Done,
    Canceled,
}

impl OrderStatus {
    /// Stored representation (matches the sqlx/serde renaming)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "CART",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Done => "DONE",
            Self::Canceled => "CANCELED",
        }
    }

    /// Numeric status code exposed to legacy clients
    pub fn code(&self) -> u8 {
        match self {
            Self::Cart => 0,
            Self::Confirmed => 1,
            Self::Preparing => 2,
            Self::Done => 4,
            Self::Canceled => 5,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub status: OrderStatus,
    /// Derived from the lines; recomputed on every cart edit
    pub total_price: f64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

/// Order line joined with the drink it refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub drink_id: i64,
    pub drink_name: String,
    /// Current drink price (totals are recomputed from it)
    pub unit_price: f64,
    pub quantity: i64,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLineRequest {
    pub drink_id: i64,
    pub quantity: i64,
    pub note: Option<String>,
}

/// Update cart line payload (quantity 0 removes the line)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: i64,
    pub note: Option<String>,
}

/// Result of a line update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "line", rename_all = "snake_case")]
pub enum LineUpdate {
    Updated(OrderLine),
    Removed,
}

/// Order list filter
///
/// `start`/`end` are Unix milliseconds. The end bound only applies when
/// there is no start bound or `start < end`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub user_id: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Canceled).unwrap();
        assert_eq!(json, "\"CANCELED\"");
        let status: OrderStatus = serde_json::from_str("\"CART\"").unwrap();
        assert_eq!(status, OrderStatus::Cart);
        assert_eq!(OrderStatus::Confirmed.to_string(), "CONFIRMED");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::Cart.code(), 0);
        assert_eq!(OrderStatus::Done.code(), 4);
        assert_eq!(OrderStatus::Canceled.code(), 5);
        assert!(OrderStatus::Done.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
    }

    #[test]
    fn test_line_update_shape() {
        let json = serde_json::to_value(LineUpdate::Removed).unwrap();
        assert_eq!(json, serde_json::json!({"result": "removed"}));
    }
}
