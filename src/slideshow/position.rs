use log::info;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::PersistenceError;

/// Durable home of the last-viewed filename
///
/// The slideshow treats every failure here as a warning.
pub trait PositionStore {
    fn load(&self) -> Result<Option<String>, PersistenceError>;
    fn save(&self, filename: &str) -> Result<(), PersistenceError>;
    fn clear(&self) -> Result<(), PersistenceError>;
}

impl<T: PositionStore + ?Sized> PositionStore for Box<T> {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, filename: &str) -> Result<(), PersistenceError> {
        (**self).save(filename)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

impl<T: PositionStore + ?Sized> PositionStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, filename: &str) -> Result<(), PersistenceError> {
        (**self).save(filename)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

const LAST_IMAGE_KEY: &str = "last_image";

/// Keeps the session position in a small SQLite database
pub struct SqlitePositionStore {
    conn: Connection,
}

impl SqlitePositionStore {
    /// Open the store in the user's data directory:
    /// - Linux: ~/.local/share/photo-frame/photo_frame.db
    /// - macOS: ~/Library/Application Support/photo-frame/photo_frame.db
    /// - Windows: %APPDATA%\photo-frame\photo_frame.db
    pub fn open_default() -> Result<Self, PersistenceError> {
        let path = Self::default_path().ok_or(PersistenceError::NoDataDir)?;
        Self::open(&path)
    }

    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("photo-frame");
        path.push("photo_frame.db");
        Some(path)
    }

    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("📁 Position store at: {}", path.display());
        Self::with_connection(conn)
    }

    /// Use an already open connection (in-memory databases included)
    pub fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl PositionStore for SqlitePositionStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                [LAST_IMAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, filename: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO session (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![LAST_IMAGE_KEY, filename],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM session WHERE key = ?1", [LAST_IMAGE_KEY])?;
        Ok(())
    }
}

impl std::fmt::Debug for SqlitePositionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePositionStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

/// Session-only store, used when nothing durable is available
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    last_image: Mutex<Option<String>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_image(filename: &str) -> Self {
        Self {
            last_image: Mutex::new(Some(filename.to_string())),
        }
    }
}

impl PositionStore for MemoryPositionStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .last_image
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default())
    }

    fn save(&self, filename: &str) -> Result<(), PersistenceError> {
        if let Ok(mut guard) = self.last_image.lock() {
            *guard = Some(filename.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        if let Ok(mut guard) = self.last_image.lock() {
            *guard = None;
        }
        Ok(())
    }
}
