use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use crate::error::AppError;

pub const FAVORITES_KEY: &str = "f2p_favorites";

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    pub fn default_path() -> Result<PathBuf, AppError> {
        let mut db_path = dirs::home_dir()
            .ok_or_else(|| AppError::Internal("home directory not found".to_string()))?;
        db_path.push(".f2p-cli");
        db_path.push("f2p.db");
        Ok(db_path)
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::Internal(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), AppError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv(key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO kv(key, value) VALUES(?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Loads favorites; a value that is not a JSON array loads as empty.
    pub fn load_favorites(&self) -> Result<BTreeSet<String>, AppError> {
        let Some(raw) = self.get(FAVORITES_KEY)? else {
            return Ok(BTreeSet::new());
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(items)) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()),
            Ok(_) | Err(_) => {
                warn!(key = FAVORITES_KEY, "ignoring unreadable favorites value");
                Ok(BTreeSet::new())
            }
        }
    }

    pub fn save_favorites(&self, favorites: &BTreeSet<String>) -> Result<(), AppError> {
        let raw = serde_json::to_string(favorites)?;
        self.put(FAVORITES_KEY, &raw)
    }

    pub fn add_favorite(&self, id: &str) -> Result<bool, AppError> {
        let mut favorites = self.load_favorites()?;
        let added = favorites.insert(id.to_string());
        if added {
            self.save_favorites(&favorites)?;
        }
        Ok(added)
    }

    pub fn remove_favorite(&self, id: &str) -> Result<bool, AppError> {
        let mut favorites = self.load_favorites()?;
        let removed = favorites.remove(id);
        if removed {
            self.save_favorites(&favorites)?;
        }
        Ok(removed)
    }

    /// Returns whether the id is a favorite after toggling.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, AppError> {
        let mut favorites = self.load_favorites()?;
        let now_favorite = if favorites.remove(id) {
            false
        } else {
            favorites.insert(id.to_string())
        };
        self.save_favorites(&favorites)?;
        Ok(now_favorite)
    }
}
