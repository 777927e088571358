//! Durable ordered storage for pending broadcast items.
//!
//! The queue only needs append/list/clear; ordering is by insertion.
//! Production uses [`SqliteStore`] so queued items survive restarts,
//! tests and the demo binary use [`MemoryStore`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use hearthbot_core::error::{HearthError, Result};

/// Ordered item storage behind the broadcast queue.
pub trait ItemStore: Send + Sync {
    /// Append one item at the end.
    fn append(&self, item: &str) -> Result<()>;

    /// All pending items in insertion order.
    fn list(&self) -> Result<Vec<String>>;

    /// Remove every pending item.
    fn clear(&self) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemStore for MemoryStore {
    fn append(&self, item: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item.to_string());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// SQLite-backed store — survives restarts.
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open or create the broadcast database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| HearthError::Store(format!("DB open: {e}")))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Default database path (~/.hearthbot/broadcast.db).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hearthbot")
            .join("broadcast.db")
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS broadcast_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| HearthError::Store(format!("Migration: {e}")))?;
        Ok(())
    }
}

impl ItemStore for SqliteStore {
    fn append(&self, item: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO broadcast_items (body, created_at) VALUES (?1, ?2)",
            rusqlite::params![item, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| HearthError::Store(format!("Insert: {e}")))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn
            .prepare("SELECT body FROM broadcast_items ORDER BY id")
            .map_err(|e| HearthError::Store(format!("Query: {e}")))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| HearthError::Store(format!("Query: {e}")))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HearthError::Store(format!("Row: {e}")))
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute("DELETE FROM broadcast_items", [])
            .map_err(|e| HearthError::Store(format!("Delete: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_ordering() {
        let store = MemoryStore::new();
        store.append("first").unwrap();
        store.append("second").unwrap();
        assert_eq!(store.list().unwrap(), vec!["first", "second"]);
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = std::env::temp_dir().join("hearthbot-test-store-reopen");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("broadcast.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append("free game one").unwrap();
            store.append("free game two").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec!["free game one", "free game two"]
        );
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
