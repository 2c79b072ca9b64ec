use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS people (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name        TEXT NOT NULL,
            first_name       TEXT,
            last_name        TEXT,
            role             TEXT,
            note             TEXT,
            profile_url      TEXT,
            source_page      TEXT,
            last_updated_utc TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_people_full_name ON people(full_name);
        CREATE INDEX IF NOT EXISTS idx_people_last_name ON people(last_name);
        CREATE INDEX IF NOT EXISTS idx_people_first_name ON people(first_name);
        ",
    )?;
    Ok(())
}

// ── People ──

/// One resolved person, as produced by a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub note: String,
    pub profile_url: String,
    pub source_page: String,
}

/// A person row read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPerson {
    pub record: PersonRecord,
    pub last_updated_utc: String,
}

/// Replace the whole table with the output of one run. Every row carries the
/// same UTC run stamp.
pub fn replace_all_people(conn: &Connection, people: &[PersonRecord]) -> Result<usize> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        tx.execute("DELETE FROM people", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO people
             (full_name, first_name, last_name, role, note, profile_url, source_page, last_updated_utc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for p in people {
            count += stmt.execute(rusqlite::params![
                p.full_name, p.first_name, p.last_name, p.role, p.note,
                p.profile_url, p.source_page, now,
            ])?;
        }
    }
    tx.commit()?;
    info!(stored = count, run = %now, "Replaced people table");
    Ok(count)
}

pub fn fetch_all(conn: &Connection) -> Result<Vec<StoredPerson>> {
    let mut stmt = conn.prepare(
        "SELECT full_name, COALESCE(first_name,''), COALESCE(last_name,''), COALESCE(role,''),
                COALESCE(note,''), COALESCE(profile_url,''), COALESCE(source_page,''),
                last_updated_utc
         FROM people
         ORDER BY last_name IS NULL, last_name, first_name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredPerson {
                record: PersonRecord {
                    full_name: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    role: row.get(3)?,
                    note: row.get(4)?,
                    profile_url: row.get(5)?,
                    source_page: row.get(6)?,
                },
                last_updated_utc: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn last_updated(conn: &Connection) -> Result<Option<String>> {
    let ts: Option<String> =
        conn.query_row("SELECT MAX(last_updated_utc) FROM people", [], |r| r.get(0))?;
    Ok(ts.filter(|t| !t.is_empty()))
}

pub fn count_people(conn: &Connection) -> Result<usize> {
    let n: usize = conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?;
    Ok(n)
}
