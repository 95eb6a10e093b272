//! Unified error codes for the membership backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors (validation, lookup)
//! - 5xxx: Membership issuance errors (rendering)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so the front-end can switch on them without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 5xxx: Issuance ====================
    /// QR code or membership card generation failed
    RenderFailed = 5101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Record store error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// System errors are faults: logged with context, never detailed to clients
    #[inline]
    pub const fn is_system(&self) -> bool {
        self.code() >= 9000 || matches!(self, ErrorCode::RenderFailed)
    }

    /// Default message, in the language of the registration form
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Opération réussie",
            ErrorCode::ValidationFailed => "Données invalides",
            ErrorCode::NotFound => "Ressource non trouvée",
            ErrorCode::AlreadyExists => "La ressource existe déjà",
            ErrorCode::InvalidRequest => "Requête invalide",
            ErrorCode::RenderFailed => "Erreur interne du serveur",
            ErrorCode::InternalError => "Erreur interne du serveur",
            ErrorCode::DatabaseError => "Erreur interne du serveur",
            ErrorCode::ConfigError => "Erreur de configuration du serveur",
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
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            5101 => Ok(ErrorCode::RenderFailed),
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
