//! Unified error codes for the Brew backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order lifecycle errors
//! - 5xxx: Stock errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization
/// and cross-language compatibility with API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller did not present an identity
    NotAuthenticated = 1001,
    /// Identity headers are malformed
    InvalidIdentity = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Order belongs to another user
    NotOrderOwner = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Transition not allowed from the current status
    OrderInvalidState = 4002,
    /// Order has no lines
    OrderEmpty = 4003,
    /// Order line not found
    OrderLineNotFound = 4004,
    /// Order has already been completed
    OrderAlreadyCompleted = 4005,
    /// Order has already been canceled
    OrderAlreadyCanceled = 4006,

    // ==================== 5xxx: Stock ====================
    /// On-hand quantity is below the requirement
    InsufficientStock = 5001,
    /// Required ingredient row does not exist
    IngredientMissing = 5002,
    /// Drink has no recipe rows
    RecipeMissing = 5003,

    // ==================== 6xxx: Catalog ====================
    /// Drink not found
    DrinkNotFound = 6001,
    /// Drink name already exists
    DrinkNameExists = 6002,
    /// Drink name has an invalid format
    DrinkInvalidName = 6003,
    /// Drink price is invalid
    DrinkInvalidPrice = 6004,
    /// Drink is not available for ordering
    DrinkUnavailable = 6005,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6102,
    /// Ingredient not found
    IngredientNotFound = 6201,
    /// Ingredient name already exists
    IngredientNameExists = 6202,
    /// Recipe row not found
    RecipeNotFound = 6301,
    /// Recipe row for this drink/ingredient already exists
    RecipeDuplicate = 6302,
    /// Preparation procedure not found
    ProcedureNotFound = 6401,
    /// Machine not found
    MachineNotFound = 6402,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Message could not be published
    PublishFailed = 9101,
    /// System busy (database locked, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidIdentity => "User identity is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotOrderOwner => "Order belongs to another user",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidState => "Order status does not allow this operation",
            ErrorCode::OrderEmpty => "Cannot confirm an empty order",
            ErrorCode::OrderLineNotFound => "Order line not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCanceled => "Order has already been canceled",

            // Stock
            ErrorCode::InsufficientStock => "Not enough stock for ingredient",
            ErrorCode::IngredientMissing => "Required ingredient is missing from the ledger",
            ErrorCode::RecipeMissing => "No recipe found for drink",

            // Catalog
            ErrorCode::DrinkNotFound => "Drink not found",
            ErrorCode::DrinkNameExists => "Drink with the same name already exists",
            ErrorCode::DrinkInvalidName => {
                "Each word must start with a capital letter or number and must not contain special characters"
            }
            ErrorCode::DrinkInvalidPrice => "Price must be greater than 0",
            ErrorCode::DrinkUnavailable => "Drink is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category with the same name already exists",
            ErrorCode::IngredientNotFound => "Ingredient not found",
            ErrorCode::IngredientNameExists => "Ingredient with the same name already exists",
            ErrorCode::RecipeNotFound => "Recipe not found",
            ErrorCode::RecipeDuplicate => "Recipe for this drink and ingredient already exists",
            ErrorCode::ProcedureNotFound => "Preparation procedure not found",
            ErrorCode::MachineNotFound => "Machine not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PublishFailed => "Failed to publish message",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidIdentity),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::NotOrderOwner),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalidState),
            4003 => Ok(ErrorCode::OrderEmpty),
            4004 => Ok(ErrorCode::OrderLineNotFound),
            4005 => Ok(ErrorCode::OrderAlreadyCompleted),
            4006 => Ok(ErrorCode::OrderAlreadyCanceled),

            // Stock
            5001 => Ok(ErrorCode::InsufficientStock),
            5002 => Ok(ErrorCode::IngredientMissing),
            5003 => Ok(ErrorCode::RecipeMissing),

            // Catalog
            6001 => Ok(ErrorCode::DrinkNotFound),
            6002 => Ok(ErrorCode::DrinkNameExists),
            6003 => Ok(ErrorCode::DrinkInvalidName),
            6004 => Ok(ErrorCode::DrinkInvalidPrice),
            6005 => Ok(ErrorCode::DrinkUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::IngredientNotFound),
            6202 => Ok(ErrorCode::IngredientNameExists),
            6301 => Ok(ErrorCode::RecipeNotFound),
            6302 => Ok(ErrorCode::RecipeDuplicate),
            6401 => Ok(ErrorCode::ProcedureNotFound),
            6402 => Ok(ErrorCode::MachineNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::PublishFailed),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::OrderInvalidState.code(), 4002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 5001);
        assert_eq!(ErrorCode::IngredientMissing.code(), 5002);
        assert_eq!(ErrorCode::DrinkNameExists.code(), 6002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::OrderEmpty.is_success());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(3001), Err(InvalidErrorCode(3001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::RecipeMissing).unwrap();
        assert_eq!(json, "5003");
        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_every_declared_code_round_trips() {
        for value in 0..10_000u16 {
            if let Ok(code) = ErrorCode::try_from(value) {
                assert_eq!(code.code(), value);
                assert!(!code.message().is_empty());
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::InsufficientStock.to_string(), "5001");
    }
}
