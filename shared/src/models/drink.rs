//! Drink Model

use serde::{Deserialize, Serialize};

/// Drink entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Drink {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Drink with its category name, as returned by listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DrinkSummary {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Create drink payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkCreate {
    pub name: String,
    pub price: f64,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Update drink payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrinkUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Filter for the drink listings (substring match on name and category name)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrinkFilter {
    pub name: Option<String>,
    pub category: Option<String>,
}
