//! Journal storage: append and load journal entries.

use jiff::Timestamp;
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{Form, JournalEntry, TrackId};

use super::form::write_form;
use super::{Result, Storage, StorageError};

impl Storage {
    /// Appends an entry to a form's journal, writing back the form it
    /// changed in the same transaction. Either both land or neither does.
    pub fn append_journal(&self, form: &Form, entry: &JournalEntry) -> Result<()> {
        let mut conn = self.open_db(form.id)?;
        let tx = conn.transaction()?;
        write_form(&tx, form)?;
        insert_journal(&tx, entry)?;
        tx.commit()?;
        info!(
            "journaled {} operation on form {}",
            entry.track,
            form.short_id()
        );
        Ok(())
    }

    /// Loads a form's journal in the order it was written.
    pub fn load_journal(&self, form_id: Uuid) -> Result<Vec<JournalEntry>> {
        let conn = self.open_db(form_id)?;
        let mut stmt =
            conn.prepare("SELECT track, operation, recorded_at FROM journal ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (track, operation, recorded_at) = row?;
            entries.push(JournalEntry {
                track: TrackId::parse(&track)
                    .ok_or_else(|| StorageError::Corrupt(format!("unknown track: {track}")))?,
                operation: serde_json::from_str(&operation)?,
                recorded_at: recorded_at
                    .parse::<Timestamp>()
                    .map_err(|e| StorageError::Corrupt(format!("invalid recorded_at: {e}")))?,
            });
        }
        Ok(entries)
    }
}

fn insert_journal(conn: &Connection, entry: &JournalEntry) -> Result<()> {
    let operation = serde_json::to_string(&entry.operation)?;
    conn.execute(
        "INSERT INTO journal (track, operation, recorded_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            entry.track.as_str(),
            operation,
            entry.recorded_at.to_string(),
        ],
    )?;
    Ok(())
}
