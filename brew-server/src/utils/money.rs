//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as `f64`; arithmetic goes through `Decimal` and is
//! rounded back to 2 decimal places.

use rust_decimal::prelude::*;
use shared::models::OrderLine;

const DECIMAL_PLACES: u32 = 2;

/// Largest accepted price for drinks and ingredients
pub const MAX_PRICE: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// unit_price × quantity
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Σ(unit_price × quantity) over the lines
pub fn order_total(lines: &[OrderLine]) -> f64 {
    to_f64(
        lines
            .iter()
            .map(|l| line_total(l.unit_price, l.quantity))
            .sum(),
    )
}
