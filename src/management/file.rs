use std::{
    fs::{File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::{
    credentials::{Credential, CredentialRecord},
    table::{Condition, Records, Table},
};
use crate::{
    error::{Error, Result},
    types::HistoryEntry,
};

/// Table persisted as a single JSON document in the local data directory.
///
/// The file is re-read for every operation so that a CLI process and a
/// running server observe each other's writes. Every read-modify-write cycle
/// holds an exclusive lock on a sidecar `.lock` file, which makes conditional
/// updates atomic across processes sharing the table. Writes land in a fresh
/// temporary file that is renamed over the table, so readers never see half a
/// document and need no lock.
pub struct FileTable {
    path: PathBuf,
    // serialises this instance's writers before they reach the file lock
    local: Mutex<()>,
}

/// Exclusive lock on the table's sidecar file. Released on drop.
struct TableLock {
    file: File,
}

impl TableLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileTable {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            local: Mutex::new(()),
        }
    }

    /// Opens the table named `table` under the data directory.
    pub fn open(table: &str) -> Self {
        Self::new(Self::table_path(table))
    }

    async fn lock(&self) -> Result<TableLock> {
        let path = self.path.with_extension("json.lock");
        tokio::task::spawn_blocking(move || TableLock::acquire(&path))
            .await
            .map_err(|e| Error::Storage(format!("table lock task failed: {e}")))?
    }

    async fn load(&self) -> Result<Records> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Records::default()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Records::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Must be called with the table lock held.
    async fn persist(&self, records: &Records) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        async_fs::create_dir_all(&dir).await?;

        let json = serde_json::to_string_pretty(records)?;
        let tmp = NamedTempFile::new_in(&dir)?;
        async_fs::write(tmp.path(), json).await?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Runs `change` against the current records under the table lock and
    /// persists them when it returns `true`.
    async fn modify<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Records) -> bool + Send,
    {
        let _local = self.local.lock().await;
        let _lock = self.lock().await?;
        let mut records = self.load().await?;
        if !change(&mut records) {
            return Ok(false);
        }
        self.persist(&records).await?;
        Ok(true)
    }

    fn table_path(table: &str) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("sharelist/{table}.json"));
        path
    }
}

#[async_trait]
impl Table for FileTable {
    async fn get(&self, space: &str, id: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.load().await?.credential(space, id))
    }

    async fn put(&self, record: CredentialRecord) -> Result<()> {
        self.modify(move |records| {
            records.put_credential(record);
            true
        })
        .await
        .map(|_| ())
    }

    async fn update(
        &self,
        space: &str,
        id: &str,
        condition: Condition,
        credential: Credential,
    ) -> Result<bool> {
        self.modify(|records| records.update_credential(space, id, &condition, &credential))
            .await
    }

    async fn append_history(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.modify(move |records| {
            records.append_history(entries);
            true
        })
        .await
        .map(|_| ())
    }

    async fn history(&self, space: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self.load().await?.history(space))
    }
}
