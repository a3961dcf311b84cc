//! File-backed keyed record store.
//!
//! Every record is an independently addressable file,
//! `<base_dir>/<collection>/<key>.json`, so operations on different keys
//! never contend. Mutating operations fsync before returning; writes go
//! through a hidden temp file so readers never observe a partial record.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::helpers;

/// Collection holding [`crate::models::User`] records, keyed by phone.
pub const USERS: &str = "users";
/// Collection holding [`crate::models::Token`] records, keyed by token id.
pub const TOKENS: &str = "tokens";
/// Collection holding [`crate::models::Check`] records, keyed by check id.
pub const CHECKS: &str = "checks";

pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{key}.json"))
    }

    /// Write and fsync the payload to a uniquely named temp file in the
    /// collection directory, creating the directory if needed.
    async fn write_temp(&self, collection: &str, key: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let dir = self.base_dir.join(collection);
        fs::create_dir_all(&dir).await?;

        let temp_path = dir.join(format!(".{key}.{}.tmp", helpers::random_id(8)));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(temp_path)
    }

    /// Persist a new record, failing with [`StoreError::AlreadyExists`] if the
    /// key is already present.
    ///
    /// The fsynced temp file is hard-linked to the final path: the link is the
    /// single atomic step, so a racing `create` on the same key loses cleanly
    /// and a racing `read` sees either nothing or the complete record.
    pub async fn create<T: Serialize>(&self, collection: &str, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        let temp_path = self.write_temp(collection, key, &bytes).await?;

        let linked = fs::hard_link(&temp_path, self.record_path(collection, key)).await;
        let _ = fs::remove_file(&temp_path).await;

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the current value of a record.
    pub async fn read<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<T, StoreError> {
        let bytes = match fs::read(self.record_path(collection, key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace a record's value in full. Fails with [`StoreError::NotFound`]
    /// if the key is absent; concurrent updates of the same key are
    /// last-writer-wins.
    pub async fn update<T: Serialize>(&self, collection: &str, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.record_path(collection, key);
        if let Err(e) = fs::metadata(&path).await {
            return Err(match e.kind() {
                ErrorKind::NotFound => StoreError::NotFound,
                _ => e.into(),
            });
        }

        let bytes = serde_json::to_vec(value)?;
        let temp_path = self.write_temp(collection, key, &bytes).await?;

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove a record.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(collection, key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot the keys currently present in a collection. A collection that
    /// has never been written to lists as empty.
    pub async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}
