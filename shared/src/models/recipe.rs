//! Recipe Model (relational)
//!
//! One row ties a drink to an ingredient with the quantity consumed per
//! unit of the drink. `(drink_id, ingredient_id)` is unique.

use serde::{Deserialize, Serialize};

/// Recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Recipe {
    pub id: i64,
    pub drink_id: i64,
    pub ingredient_id: i64,
    /// Quantity per drink unit, always > 0
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Recipe row joined with its ingredient name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RecipeEntry {
    pub id: i64,
    pub drink_id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub quantity: i64,
}

/// Create recipe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub drink_id: i64,
    pub ingredient_id: i64,
    pub quantity: i64,
}

/// Update recipe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub quantity: i64,
}
