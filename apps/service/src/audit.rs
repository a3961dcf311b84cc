//! Append-only audit log, one stream per check id.

use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

pub struct AuditLog {
    base_dir: PathBuf,
}

impl AuditLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Append one JSON line to the stream named `stream`. The file is created
    /// on first append and never truncated or rewritten by this subsystem.
    /// The entry is flushed and fsynced before success is reported, so a
    /// returned `Ok` means the line is on disk.
    pub async fn append<T: Serialize>(&self, stream: &str, entry: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir).await?;

        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let path = self.base_dir.join(format!("{stream}.log"));
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path).await?;
        file.write_all(&line).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}
