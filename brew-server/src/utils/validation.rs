//! Input validation helpers
//!
//! Text length limits and catalog field rules, checked in the handlers
//! before anything reaches the database.

use crate::utils::money::MAX_PRICE;
use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Drink and ingredient names
pub const MAX_NAME_LEN: usize = 100;

/// Category names
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Shortest accepted drink name
pub const MIN_DRINK_NAME_LEN: usize = 4;

/// Order line notes, drink descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Image URLs
pub const MAX_URL_LEN: usize = 2048;

/// Largest unit count on a single order line
pub const MAX_LINE_QUANTITY: i64 = 99;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Drink names: 4..=100 chars, words start with a capital letter or digit,
/// only ASCII letters and digits, single spaces between words.
pub fn validate_drink_name(name: &str) -> Result<(), AppError> {
    let len = name.chars().count();
    if !(MIN_DRINK_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(AppError::with_message(
            ErrorCode::DrinkInvalidName,
            format!("Drink name must be between {MIN_DRINK_NAME_LEN} and {MAX_NAME_LEN} characters"),
        ));
    }

    let mut word_start = true;
    for c in name.chars() {
        let ok = if c.is_whitespace() {
            // no leading or repeated whitespace
            let ok = !word_start;
            word_start = true;
            ok
        } else if word_start {
            word_start = false;
            c.is_ascii_uppercase() || c.is_ascii_digit()
        } else {
            c.is_ascii_alphanumeric()
        };
        if !ok {
            return Err(AppError::new(ErrorCode::DrinkInvalidName).with_detail("name", name));
        }
    }
    Ok(())
}

/// Drink prices must be finite and > 0
pub fn validate_drink_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price <= 0.0 || price > MAX_PRICE {
        return Err(AppError::new(ErrorCode::DrinkInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

/// Generic non-negative, finite amount (ingredient price)
pub fn validate_non_negative_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 || price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and {MAX_PRICE}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Stock quantities must be >= 0
pub fn validate_stock_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Quantity must not be negative",
        ));
    }
    Ok(())
}

/// Recipe quantities must be > 0
pub fn validate_recipe_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Recipe quantity must be greater than 0",
        ));
    }
    Ok(())
}
