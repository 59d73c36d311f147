// SQLite-backed session storage

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::TokenStore;

/// Persistent key-value store over a local SQLite database
///
/// Uses a single `auth_kv` table. The connection is not `Sync`, so it sits
/// behind a mutex; every operation is a single short statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the session database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open session database: {}", path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to initialize auth_kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TokenStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("Failed to read session key: {}", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )
        .with_context(|| format!("Failed to write session key: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.execute("DELETE FROM auth_kv WHERE key = ?", [key])
            .with_context(|| format!("Failed to delete session key: {}", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    fn temp_db_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rodo-admin-test-{}.sqlite3", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_set_get_remove() {
        let path = temp_db_path();
        let store = SqliteStore::open(&path).unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), Some("A1".to_string()));

        // Overwrite replaces the previous value
        store.set(ACCESS_TOKEN_KEY, "A2").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), Some("A2".to_string()));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        // Removing an absent key is fine
        store.remove(REFRESH_TOKEN_KEY).unwrap();

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_db_path();
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set(REFRESH_TOKEN_KEY, "R1").unwrap();
        }
        {
            let store = SqliteStore::open(&path).unwrap();
            assert_eq!(
                store.get(REFRESH_TOKEN_KEY).unwrap(),
                Some("R1".to_string())
            );
        }
        let _ = std::fs::remove_file(&path);
    }
}
