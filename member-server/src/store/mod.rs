//! Member record stores
//!
//! One trait, three backends selected at startup:
//! - [`MemoryStore`]: process memory (tests, ephemeral runs)
//! - [`JsonFileStore`]: a single JSON array file, rewritten on each mutation
//! - [`FirestoreStore`]: Firestore documents over the REST API

mod firestore;
mod json_file;
mod memory;

use async_trait::async_trait;
use shared::models::MemberRecord;
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this id already exists
    #[error("member already exists: {0}")]
    Duplicate(String),

    #[error("member not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Document store answered with an unexpected status or body
    #[error("document store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for member records
///
/// `create` must reject an existing id rather than overwrite it, atomically
/// with respect to concurrent callers. `list` order is stable for a given
/// sequence of creates.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn create(&self, record: &MemberRecord) -> StoreResult<()>;

    async fn get(&self, id: &str) -> StoreResult<Option<MemberRecord>>;

    async fn list(&self) -> StoreResult<Vec<MemberRecord>>;

    /// Set `emailEnvoye` to true (no-op if already set)
    async fn mark_email_delivered(&self, id: &str) -> StoreResult<()>;

    /// Keep a standalone copy of the member's QR image, if the backend does that
    async fn store_qr_image(&self, _id: &str, _png: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}
