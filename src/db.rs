//! SQLite persistence: the `ofertas` dataset plus a `runs` audit table.
//!
//! Skill flags are stored as one INTEGER column per catalogue entry, with
//! the column list generated from the catalogue so schema, inserts and
//! reads can never drift apart.

use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

use crate::pipeline::skills;
use crate::records::{AuditSummary, ClassifiedRecord};

const BASE_COLUMNS: [&str; 6] = ["career", "title", "company", "workday", "modality", "salary"];

/// Open (and create if absent) the database at `path`.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// In-memory database, mainly for tests and dry runs.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().context("failed to open in-memory database")
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let skill_columns: String = skills::keys()
        .iter()
        .map(|key| format!(",\n            {key} INTEGER NOT NULL DEFAULT 0"))
        .collect();
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS ofertas (
            id INTEGER PRIMARY KEY,
            career TEXT NOT NULL,
            title TEXT NOT NULL,
            company TEXT NOT NULL,
            workday TEXT,
            modality TEXT,
            salary REAL{skill_columns}
        );
        CREATE INDEX IF NOT EXISTS idx_ofertas_career ON ofertas(career);

        CREATE TABLE IF NOT EXISTS runs (
            run_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            summary TEXT NOT NULL
        );
        "
    ))
    .context("failed to initialize schema")
}

/// Swap the stored dataset for `records` in one transaction. A failure
/// rolls back and leaves the previous dataset untouched.
pub fn replace_all(conn: &Connection, records: &[ClassifiedRecord]) -> Result<usize> {
    let keys = skills::keys();
    let columns = BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(keys.iter().cloned())
        .join(", ");
    let placeholders = (1..=BASE_COLUMNS.len() + keys.len())
        .map(|i| format!("?{i}"))
        .join(", ");
    let sql = format!("INSERT INTO ofertas ({columns}) VALUES ({placeholders})");

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM ofertas", [])?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for record in records {
            let mut row: Vec<SqlValue> = Vec::with_capacity(BASE_COLUMNS.len() + keys.len());
            row.push(SqlValue::from(record.career.clone()));
            row.push(SqlValue::from(record.title.clone()));
            row.push(SqlValue::from(record.company.clone()));
            row.push(SqlValue::from(record.workday.clone()));
            row.push(SqlValue::from(record.modality.clone()));
            row.push(match record.salary {
                Some(amount) => SqlValue::from(amount),
                None => SqlValue::Null,
            });
            row.extend(record.skills.flags().iter().map(|f| SqlValue::from(*f)));
            stmt.execute(rusqlite::params_from_iter(row))?;
        }
    }
    tx.commit()?;
    Ok(records.len())
}

/// One stored posting as read back for aggregation.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub career: String,
    pub title: String,
    pub company: String,
    pub workday: String,
    pub modality: String,
    pub salary: Option<f64>,
    /// Skill flags in catalogue order.
    pub skills: Vec<bool>,
}

/// Postings whose career contains `career`, case-insensitively. An empty
/// parameter matches everything.
pub fn fetch_by_career(conn: &Connection, career: &str) -> Result<Vec<StoredRecord>> {
    let keys = skills::keys();
    let sql = format!(
        "SELECT career, title, company, workday, modality, salary, {} \
         FROM ofertas WHERE LOWER(career) LIKE '%' || ?1 || '%' ORDER BY id",
        keys.iter().join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let needle = career.trim().to_lowercase();
    let rows = stmt
        .query_map([&needle], |row| {
            let mut flags = Vec::with_capacity(keys.len());
            for i in 0..keys.len() {
                flags.push(row.get::<_, i64>(6 + i)? != 0);
            }
            Ok(StoredRecord {
                career: row.get(0)?,
                title: row.get(1)?,
                company: row.get(2)?,
                workday: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                modality: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                salary: row.get(5)?,
                skills: flags,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Record one processing run in the audit table.
pub fn insert_run(conn: &Connection, run_id: &str, summary: &AuditSummary) -> Result<()> {
    let payload = serde_json::to_string(summary).context("failed to serialize run summary")?;
    conn.execute(
        "INSERT OR REPLACE INTO runs (run_id, created_at, summary) VALUES (?1, ?2, ?3)",
        rusqlite::params![run_id, chrono::Utc::now().to_rfc3339(), payload],
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct StoreCounts {
    pub ofertas: usize,
    pub runs: usize,
}

pub fn counts(conn: &Connection) -> Result<StoreCounts> {
    let ofertas: usize = conn.query_row("SELECT COUNT(*) FROM ofertas", [], |r| r.get(0))?;
    let runs: usize = conn.query_row("SELECT COUNT(*) FROM runs", [], |r| r.get(0))?;
    Ok(StoreCounts { ofertas, runs })
}

pub fn new_run_id() -> String {
    format!("run-{}", chrono::Utc::now().timestamp_millis())
}
