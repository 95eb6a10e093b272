//! Shared types for the membership backend
//!
//! Models exchanged with the registration form, organization branding,
//! the error system and small time helpers.

pub mod branding;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use models::{MemberRecord, MemberRegistration, MemberStatus, QrPayload};
