//! Ingredient Model
//!
//! An ingredient row is also the stock ledger entry for that ingredient:
//! `quantity` is the authoritative on-hand amount.

use serde::{Deserialize, Serialize};

/// Ingredient entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    /// On-hand quantity, never negative
    pub quantity: i64,
    pub price: f64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Create ingredient payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

/// Update ingredient payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}
