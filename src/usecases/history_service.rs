//! Period log management: record, delete, CSV import and export.

use crate::adapters::persistence::{entries_from_csv, entries_to_csv};
use crate::domain::{DomainError, LogEntry};
use crate::ports::{LogStorePort, LogWriterPort};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub struct HistoryService {
    store: Arc<dyn LogStorePort>,
    writer: Arc<dyn LogWriterPort>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn LogStorePort>, writer: Arc<dyn LogWriterPort>) -> Self {
        Self { store, writer }
    }

    pub async fn entries(&self) -> Result<Vec<LogEntry>, DomainError> {
        self.store.all_entries().await
    }

    /// Validate and persist one entry. Returns the new id.
    pub async fn log_period(&self, entry: LogEntry) -> Result<i64, DomainError> {
        if let Some(end) = entry.end_date {
            if end < entry.start_date {
                return Err(DomainError::Input(format!(
                    "end date {} is before start date {}",
                    end, entry.start_date
                )));
            }
        }
        self.writer.add_entry(&entry).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let removed = self.writer.delete_entry(id).await?;
        if removed {
            info!(id, "period log deleted");
        }
        Ok(removed)
    }

    /// Import every row of a CSV file in one batch. Nothing is written if any row is invalid
    /// or the store rejects the batch.
    pub async fn import_csv(&self, path: &Path) -> Result<usize, DomainError> {
        let data = fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Input(format!("read {}: {}", path.display(), e)))?;
        let entries = entries_from_csv(&data)?;
        for entry in &entries {
            if entry.end_date.is_some_and(|end| end < entry.start_date) {
                return Err(DomainError::Input(format!(
                    "entry starting {} ends before it starts",
                    entry.start_date
                )));
            }
        }
        self.writer.add_entries(&entries).await?;
        info!(path = %path.display(), count = entries.len(), "imported period logs");
        Ok(entries.len())
    }

    /// Write the full history to `path`. Returns the row count.
    pub async fn export_csv(&self, path: &Path) -> Result<usize, DomainError> {
        let entries = self.store.all_entries().await?;
        let csv = entries_to_csv(&entries).map_err(|e| DomainError::Report(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Report(e.to_string()))?;
        }
        fs::write(path, csv)
            .await
            .map_err(|e| DomainError::Report(format!("write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), count = entries.len(), "exported period logs");
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryLogStore;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn service() -> (Arc<MemoryLogStore>, HistoryService) {
        let store = Arc::new(MemoryLogStore::default());
        let svc = HistoryService::new(store.clone(), store.clone());
        (store, svc)
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let (_, svc) = service();
        let bad = LogEntry::new(date(2, 5)).with_end_date(date(2, 1));
        assert!(matches!(svc.log_period(bad).await, Err(DomainError::Input(_))));
        assert!(svc.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("history.csv");

        let (_, svc) = service();
        svc.log_period(LogEntry::new(date(1, 1)).with_symptoms(["cramps"]))
            .await
            .unwrap();
        svc.log_period(LogEntry::new(date(1, 29))).await.unwrap();
        assert_eq!(svc.export_csv(&path).await.unwrap(), 2);

        let (store, fresh) = service();
        assert_eq!(fresh.import_csv(&path).await.unwrap(), 2);
        let all = store.all_entries().await.unwrap();
        assert_eq!(all[0].start_date, date(1, 1));
        assert!(all[0].symptoms.contains("cramps"));
        assert_eq!(all[1].start_date, date(1, 29));
    }

    #[tokio::test]
    async fn invalid_import_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "start_date;end_date;flow;symptoms;notes\n2024-01-01;;;;\n2024-02-10;2024-02-01;;;\n",
        )
        .unwrap();
        let (store, svc) = service();
        assert!(svc.import_csv(&path).await.is_err());
        assert!(store.all_entries().await.unwrap().is_empty());
    }

    /// Writer whose batch insert always fails.
    struct RejectingWriter;

    #[async_trait::async_trait]
    impl LogWriterPort for RejectingWriter {
        async fn add_entry(&self, _entry: &LogEntry) -> Result<i64, DomainError> {
            Err(DomainError::Repo("disk full".into()))
        }

        async fn add_entries(&self, _entries: &[LogEntry]) -> Result<Vec<i64>, DomainError> {
            Err(DomainError::Repo("disk full".into()))
        }

        async fn delete_entry(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn import_hands_rows_to_store_as_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(
            &path,
            "start_date;end_date;flow;symptoms;notes\n2024-01-01;;;;\n2024-01-29;;;;\n",
        )
        .unwrap();

        let store = Arc::new(MemoryLogStore::default());
        let svc = HistoryService::new(store.clone(), Arc::new(RejectingWriter));
        let err = svc.import_csv(&path).await.unwrap_err();
        assert!(matches!(err, DomainError::Repo(_)));
        assert!(store.all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_by_id() {
        let (_, svc) = service();
        let id = svc.log_period(LogEntry::new(date(1, 1))).await.unwrap();
        assert!(svc.delete(id).await.unwrap());
        assert!(!svc.delete(id).await.unwrap());
    }
}
