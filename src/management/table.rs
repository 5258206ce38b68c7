use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::credentials::{Credential, CredentialRecord};
use crate::{error::Result, types::HistoryEntry};

/// Precondition of a conditional credential write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The stored nonce equals this value. Consumes the nonce.
    VerifyIs(String),
    /// The stored expiry still equals the one read before refreshing.
    ExpiresIs(i64),
}

/// The two record kinds sharing the flat keyed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "lowercase")]
pub enum Item {
    Credential(CredentialRecord),
    History(HistoryEntry),
}

/// In-memory image of a table, keyed by `space` + logical id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Records {
    items: BTreeMap<String, Item>,
}

impl Records {
    fn key(space: &str, id: &str) -> String {
        format!("{space}#{id}")
    }

    pub fn credential(&self, space: &str, id: &str) -> Option<CredentialRecord> {
        match self.items.get(&Self::key(space, id)) {
            Some(Item::Credential(record)) => Some(record.clone()),
            _ => None,
        }
    }

    pub fn put_credential(&mut self, record: CredentialRecord) {
        self.items
            .insert(Self::key(&record.space, &record.id), Item::Credential(record));
    }

    /// Writes `auth`/`expires` when `condition` holds for the stored record.
    /// Returns `false` without touching anything otherwise, including when no
    /// record exists.
    pub fn update_credential(
        &mut self,
        space: &str,
        id: &str,
        condition: &Condition,
        credential: &Credential,
    ) -> bool {
        let Some(Item::Credential(record)) = self.items.get_mut(&Self::key(space, id)) else {
            return false;
        };

        let holds = match condition {
            Condition::VerifyIs(verify) => record.verify.as_deref() == Some(verify.as_str()),
            Condition::ExpiresIs(expires) => record.expires == Some(*expires),
        };
        if !holds {
            return false;
        }

        record.auth = Some(credential.auth.clone());
        record.expires = Some(credential.expires);
        if let Condition::VerifyIs(_) = condition {
            record.verify = None;
        }
        true
    }

    pub fn append_history(&mut self, entries: Vec<HistoryEntry>) {
        for entry in entries {
            self.items
                .insert(Self::key(&entry.space, &entry.id), Item::History(entry));
        }
    }

    pub fn history(&self, space: &str) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .items
            .values()
            .filter_map(|item| match item {
                Item::History(entry) if entry.space == space => Some(entry.clone()),
                _ => None,
            })
            .collect();
        entries.sort_by(|a, b| a.added.cmp(&b.added).then_with(|| a.id.cmp(&b.id)));
        entries
    }
}

/// Flat keyed store holding credential records and history entries.
///
/// Every write is a single-record atomic operation; `update` is the only
/// conditional primitive.
#[async_trait]
pub trait Table: Send + Sync {
    async fn get(&self, space: &str, id: &str) -> Result<Option<CredentialRecord>>;

    async fn put(&self, record: CredentialRecord) -> Result<()>;

    async fn update(
        &self,
        space: &str,
        id: &str,
        condition: Condition,
        credential: Credential,
    ) -> Result<bool>;

    /// Writes a batch of history entries.
    async fn append_history(&self, entries: Vec<HistoryEntry>) -> Result<()>;

    async fn history(&self, space: &str) -> Result<Vec<HistoryEntry>>;
}

#[derive(Default)]
pub struct MemoryTable {
    records: Mutex<Records>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Table for MemoryTable {
    async fn get(&self, space: &str, id: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.records.lock().await.credential(space, id))
    }

    async fn put(&self, record: CredentialRecord) -> Result<()> {
        self.records.lock().await.put_credential(record);
        Ok(())
    }

    async fn update(
        &self,
        space: &str,
        id: &str,
        condition: Condition,
        credential: Credential,
    ) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .await
            .update_credential(space, id, &condition, &credential))
    }

    async fn append_history(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        self.records.lock().await.append_history(entries);
        Ok(())
    }

    async fn history(&self, space: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self.records.lock().await.history(space))
    }
}
