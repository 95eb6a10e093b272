//! JSON file record store
//!
//! All records live in one pretty-printed JSON array. Every mutation reads
//! the whole file and rewrites it through a sibling temp file + rename, so a
//! reader never sees a torn file. A mutex serializes read-modify-write
//! cycles within the process.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use shared::models::MemberRecord;
use tokio::sync::Mutex;

use super::{MemberStore, StoreError, StoreResult};

pub struct JsonFileStore {
    path: PathBuf,
    qr_dir: Option<PathBuf>,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            qr_dir: None,
            lock: Mutex::new(()),
        }
    }

    /// Also write each member's QR image as `<qr_dir>/<id>.png`
    pub fn with_qr_dir(mut self, qr_dir: impl Into<PathBuf>) -> Self {
        self.qr_dir = Some(qr_dir.into());
        self
    }

    async fn read_all(&self) -> StoreResult<Vec<MemberRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, records: &[MemberRecord]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl MemberStore for JsonFileStore {
    async fn create(&self, record: &MemberRecord) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        records.push(record.clone());
        self.write_all(&records).await?;
        tracing::debug!(member_id = %record.id, total = records.len(), "Record appended to file");
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<MemberRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn list(&self) -> StoreResult<Vec<MemberRecord>> {
        self.read_all().await
    }

    async fn mark_email_delivered(&self, id: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.email_envoye {
            return Ok(());
        }
        record.email_envoye = true;
        self.write_all(&records).await
    }

    async fn store_qr_image(&self, id: &str, png: &[u8]) -> StoreResult<()> {
        let Some(dir) = &self.qr_dir else {
            return Ok(());
        };
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(format!("{id}.png")), png).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "json-file"
    }
}
