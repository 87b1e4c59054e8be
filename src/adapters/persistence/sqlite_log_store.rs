//! SQLite-backed period log via libsql. Implements LogStorePort and LogWriterPort.
//!
//! Single `period_logs` table; symptoms are stored as a JSON array.
//! Database file: <data_dir>/cycle.db

use crate::domain::{DomainError, FlowIntensity, LogEntry};
use crate::ports::{LogStorePort, LogWriterPort};
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database, params};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PERIOD_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS period_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_date TEXT NOT NULL,
    end_date TEXT,
    flow TEXT,
    symptoms_json TEXT NOT NULL DEFAULT '[]',
    notes TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    CHECK (end_date IS NULL OR end_date >= start_date)
)"#;
const PERIOD_LOGS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_period_logs_start ON period_logs (start_date)";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteLogStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteLogStore {
    /// Connect to (or create) `<base_dir>/cycle.db` and ensure the schema exists.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Repo(e.to_string()))?;
        let db_path = base.join("cycle.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Repo(e.to_string()))?;

        // PRAGMA returns a row; consume it (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows
                .next()
                .await
                .map_err(|e| DomainError::Repo(e.to_string()))?
                .is_some()
            {}
        }

        conn.execute(PERIOD_LOGS_TABLE, ())
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        conn.execute(PERIOD_LOGS_INDEX, ())
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;

        info!(path = %db_path.display(), "SQLite connected with WAL mode");
        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|e| DomainError::Repo(format!("bad date {:?}: {}", s, e)))
    }

    async fn insert(conn: &Connection, entry: &LogEntry) -> Result<i64, DomainError> {
        let start = entry.start_date.format(DATE_FORMAT).to_string();
        let end = entry
            .end_date
            .map(|d| d.format(DATE_FORMAT).to_string());
        let flow = entry.flow_intensity.map(FlowIntensity::as_str);
        conn.execute(
            r#"
            INSERT INTO period_logs (start_date, end_date, flow, symptoms_json, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                start,
                end,
                flow,
                Self::symptoms_to_json(&entry.symptoms),
                entry.notes.as_str(),
                entry.created_at.timestamp()
            ],
        )
        .await
        .map_err(|e| DomainError::Repo(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    fn symptoms_to_json(symptoms: &BTreeSet<String>) -> String {
        serde_json::to_string(symptoms).unwrap_or_else(|_| "[]".to_string())
    }

    fn json_to_symptoms(s: Option<&str>) -> BTreeSet<String> {
        s.and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LogStorePort for SqliteLogStore {
    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, start_date, end_date, flow, symptoms_json, notes, created_at
                FROM period_logs
                ORDER BY start_date ASC, id ASC
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;

        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        {
            let id: i64 = row.get(0).map_err(|e| DomainError::Repo(e.to_string()))?;
            let start: String = row.get(1).map_err(|e| DomainError::Repo(e.to_string()))?;
            let end: Option<String> = row.get(2).ok();
            let flow: Option<String> = row.get(3).ok();
            let symptoms_json: Option<String> = row.get(4).ok();
            let notes: String = row.get::<String>(5).unwrap_or_default();
            let created_at: i64 = row.get(6).unwrap_or_default();

            entries.push(LogEntry {
                id: Some(id),
                start_date: Self::parse_date(&start)?,
                end_date: end.as_deref().map(Self::parse_date).transpose()?,
                flow_intensity: flow.as_deref().and_then(FlowIntensity::parse),
                symptoms: Self::json_to_symptoms(symptoms_json.as_deref()),
                notes,
                created_at: DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default(),
            });
        }
        debug!(count = entries.len(), "loaded period logs");
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl LogWriterPort for SqliteLogStore {
    async fn add_entry(&self, entry: &LogEntry) -> Result<i64, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let id = Self::insert(&conn, entry).await?;
        info!(id, start_date = %entry.start_date, "period log saved");
        Ok(id)
    }

    async fn add_entries(&self, entries: &[LogEntry]) -> Result<Vec<i64>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            match Self::insert(&tx, entry).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    if let Err(rb) = tx.rollback().await {
                        warn!(error = %rb, "rollback failed");
                    }
                    return Err(e);
                }
            }
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        info!(count = ids.len(), "period logs saved");
        Ok(ids)
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let affected = conn
            .execute("DELETE FROM period_logs WHERE id = ?1", params![id])
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        Ok(affected > 0)
    }
}
