//! In-memory record store

use async_trait::async_trait;
use shared::models::MemberRecord;
use tokio::sync::RwLock;

use super::{MemberStore, StoreError, StoreResult};

/// Records held in process memory, in creation order
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<MemberRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn create(&self, record: &MemberRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<MemberRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<MemberRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn mark_email_delivered(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.email_envoye = true;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
