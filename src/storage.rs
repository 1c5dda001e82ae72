//! Local persistence for forms and their journals.
//!
//! Each form lives in its own `SQLite` file under the storage root:
//!
//! ```text
//! <root>/<uuid>.sqlite
//!   form       # One row: metadata plus the document as JSON
//!   journal    # Append-only record of operations on the form
//! ```

mod form;
mod journal;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("form not found: {0}")]
    FormNotFound(Uuid),

    #[error("form already exists: {0}")]
    FormAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt form file: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE form (
        id           TEXT PRIMARY KEY,
        team         INTEGER NOT NULL,
        match_number INTEGER NOT NULL,
        scouter      TEXT NOT NULL,
        created_at   TEXT NOT NULL,
        status       TEXT NOT NULL,
        closed_at    TEXT,
        document     TEXT NOT NULL
    );
    CREATE TABLE journal (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        track       TEXT NOT NULL,
        operation   TEXT NOT NULL,
        recorded_at TEXT NOT NULL
    );
";

/// Local file-based storage for forms.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.scout/forms/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".scout").join("forms"))
    }

    fn form_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.sqlite"))
    }

    /// Creates the database file for a new form and its schema.
    fn create_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.form_path(id);
        if path.exists() {
            return Err(StorageError::FormAlreadyExists(id));
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens the database file of an existing form.
    fn open_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.form_path(id);
        if !path.exists() {
            return Err(StorageError::FormNotFound(id));
        }
        Ok(Connection::open(path)?)
    }
}
