//! Error codes and the JSON error body shared by server and clients
//!
//! Codes are grouped by thousands ([`ErrorCategory`]); each code knows its
//! HTTP status and default message.
//!
//! ```
//! use shared::error::{ApiResponse, AppError};
//!
//! let err = AppError::insufficient_stock("Milk").with_detail("required", 8);
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(5001));
//! assert_eq!(body.details.unwrap()["ingredient"], "Milk");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
