//! JSON Lines dataset: the append-only sink and the seed-key reader.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bioladen_core::{DedupMode, StoreRecord};
use bioladen_scraper::{identity_key, RecordSink, SinkError};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends one JSON object per line; each push is flushed before returning.
pub(crate) struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Opens `path` for appending, creating it and its parent directories.
    pub(crate) async fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn push(&self, record: &StoreRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        tracing::trace!(path = %self.path.display(), "record appended");
        Ok(())
    }
}

/// Identity keys of every record in an existing dataset.
///
/// Lines that do not parse as a record are skipped with a warning, as are
/// records without a key under `mode`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) fn read_seed_keys(path: &Path, mode: DedupMode) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read seed dataset {}: {e}", path.display()))?;
    Ok(seed_keys_from_str(&content, mode))
}

fn seed_keys_from_str(content: &str, mode: DedupMode) -> Vec<String> {
    let mut keys = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StoreRecord>(line) {
            Ok(record) => {
                let key = identity_key(&record, mode);
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            Err(e) => {
                tracing::warn!(line = number + 1, error = %e, "skipping unreadable seed line");
            }
        }
    }
    keys
}
