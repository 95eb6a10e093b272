//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`AppError`]: Error with code, message and optional details
//! - [`ErrorBody`]: The JSON body clients receive
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::NotFound);
//! assert_eq!(err.http_status(), shared::http::StatusCode::NOT_FOUND);
//!
//! let err = AppError::validation("Données invalides").with_details(vec!["codePostal"]);
//! assert!(err.details.is_some());
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
