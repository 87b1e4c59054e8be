//! In-memory log store. Implements LogStorePort and LogWriterPort.
//!
//! Used for tests and for running without a database file.

use crate::domain::{DomainError, LogEntry, sort_history};
use crate::ports::{LogStorePort, LogWriterPort};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryData {
    entries: Vec<LogEntry>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryLogStore {
    cache: RwLock<MemoryData>,
}

impl MemoryLogStore {
    /// Store seeded with `entries`. Entries without an id are assigned one.
    pub fn with_entries(entries: Vec<LogEntry>) -> Self {
        let mut data = MemoryData::default();
        for mut entry in entries {
            data.next_id += 1;
            let id = *entry.id.get_or_insert(data.next_id);
            data.next_id = data.next_id.max(id);
            data.entries.push(entry);
        }
        Self {
            cache: RwLock::new(data),
        }
    }
}

#[async_trait::async_trait]
impl LogStorePort for MemoryLogStore {
    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError> {
        let mut entries = self.cache.read().await.entries.clone();
        sort_history(&mut entries);
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl LogWriterPort for MemoryLogStore {
    async fn add_entry(&self, entry: &LogEntry) -> Result<i64, DomainError> {
        let mut data = self.cache.write().await;
        data.next_id += 1;
        let id = data.next_id;
        let mut stored = entry.clone();
        stored.id = Some(id);
        data.entries.push(stored);
        Ok(id)
    }

    async fn add_entries(&self, entries: &[LogEntry]) -> Result<Vec<i64>, DomainError> {
        let mut data = self.cache.write().await;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            data.next_id += 1;
            let id = data.next_id;
            let mut stored = entry.clone();
            stored.id = Some(id);
            data.entries.push(stored);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError> {
        let mut data = self.cache.write().await;
        let before = data.entries.len();
        data.entries.retain(|e| e.id != Some(id));
        Ok(data.entries.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[tokio::test]
    async fn returns_entries_sorted_by_start() {
        let store = MemoryLogStore::with_entries(vec![
            LogEntry::new(date(3, 1)),
            LogEntry::new(date(1, 1)),
            LogEntry::new(date(2, 1)),
        ]);
        let starts: Vec<NaiveDate> = store
            .all_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.start_date)
            .collect();
        assert_eq!(starts, vec![date(1, 1), date(2, 1), date(3, 1)]);
    }

    #[tokio::test]
    async fn add_assigns_ids_and_delete_removes() {
        let store = MemoryLogStore::with_entries(vec![LogEntry::new(date(1, 1))]);
        let id = store.add_entry(&LogEntry::new(date(1, 29))).await.unwrap();
        assert_eq!(id, 2);
        assert!(store.delete_entry(id).await.unwrap());
        assert!(!store.delete_entry(id).await.unwrap());
        assert_eq!(store.all_entries().await.unwrap().len(), 1);
    }
}
