mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::models::ProgressRecord;

/// SQLite-backed persistence for progress records.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Progress operations
    // ============================================================

    pub fn get_progress(&self, card_id: &str) -> Result<Option<ProgressRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT g, r, last_seen, cooldown_until FROM progress WHERE card_id = ?",
        )?;

        let record = stmt
            .query_row([card_id], |row| {
                Ok(ProgressRecord {
                    g: row.get(0)?,
                    r: row.get(1)?,
                    last_seen: row.get(2)?,
                    cooldown_until: row.get(3)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    pub fn put_progress(&self, card_id: &str, record: &ProgressRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO progress (card_id, g, r, last_seen, cooldown_until, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(card_id) DO UPDATE SET
                g = excluded.g,
                r = excluded.r,
                last_seen = excluded.last_seen,
                cooldown_until = excluded.cooldown_until,
                updated_at = excluded.updated_at",
            (
                card_id,
                record.g,
                record.r,
                record.last_seen,
                record.cooldown_until,
                Utc::now().to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    /// Delete every stored record, returning how many were removed.
    pub fn clear_progress(&self) -> Result<usize> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM progress", [])?;
        Ok(rows)
    }

    pub fn count_progress(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM progress", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}
