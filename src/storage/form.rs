//! Form storage: create, load, update, and list forms.

use std::{fs, io};

use jiff::Timestamp;
use log::{info, warn};
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{Form, FormStatus};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Creates a new form, writing it to a new `SQLite` file.
    pub fn create_form(&self, form: &Form) -> Result<()> {
        let conn = self.create_db(form.id)?;
        let (status, closed_at) = serialize_status(&form.status);
        let document = serde_json::to_string(&form.document)?;
        conn.execute(
            "INSERT INTO form (id, team, match_number, scouter, created_at, status, closed_at, document)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                form.id.to_string(),
                form.team,
                form.match_number,
                &form.scouter,
                form.created_at.to_string(),
                status,
                closed_at,
                document,
            ],
        )?;
        info!(
            "created form {} (team {}, match {})",
            form.short_id(),
            form.team,
            form.match_number
        );
        Ok(())
    }

    /// Writes a form's status and document back to disk.
    pub fn update_form(&self, form: &Form) -> Result<()> {
        let conn = self.open_db(form.id)?;
        write_form(&conn, form)?;
        info!("updated form {} [{}]", form.short_id(), form.status.as_str());
        Ok(())
    }

    pub fn load_form(&self, id: Uuid) -> Result<Form> {
        let conn = self.open_db(id)?;
        load_form_row(&conn)
    }

    /// Lists all forms by reading each `.sqlite` file in the storage root,
    /// oldest first.
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn list_forms(&self) -> Result<Vec<Form>> {
        let mut forms = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(forms),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sqlite") {
                continue;
            }
            match Connection::open(&path)
                .map_err(StorageError::from)
                .and_then(|conn| load_form_row(&conn))
            {
                Ok(form) => forms.push(form),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        forms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(forms)
    }
}

/// Writes a form's row. `conn` may be a transaction.
pub(super) fn write_form(conn: &Connection, form: &Form) -> Result<()> {
    let (status, closed_at) = serialize_status(&form.status);
    let document = serde_json::to_string(&form.document)?;
    let rows = conn.execute(
        "UPDATE form
         SET team = ?1, match_number = ?2, scouter = ?3, status = ?4, closed_at = ?5, document = ?6
         WHERE id = ?7",
        rusqlite::params![
            form.team,
            form.match_number,
            &form.scouter,
            status,
            closed_at,
            document,
            form.id.to_string(),
        ],
    )?;
    if rows == 0 {
        return Err(StorageError::FormNotFound(form.id));
    }
    Ok(())
}

/// Reads the single form row from an open connection.
fn load_form_row(conn: &Connection) -> Result<Form> {
    let (id_str, team, match_number, scouter, created_at_str, status_str, closed_at, document) =
        conn.query_row(
            "SELECT id, team, match_number, scouter, created_at, status, closed_at, document
             FROM form LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )?;

    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid form id: {e}")))?;
    let created_at = created_at_str
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
    let status = deserialize_status(&status_str, closed_at.as_deref())?;
    let document = serde_json::from_str(&document)?;

    Ok(Form {
        id,
        team,
        match_number,
        scouter,
        created_at,
        status,
        document,
    })
}

/// Converts a `FormStatus` to column values for the form table.
fn serialize_status(status: &FormStatus) -> (&'static str, Option<String>) {
    match status {
        FormStatus::Editing => (status.as_str(), None),
        FormStatus::Submitted { submitted_at: at } | FormStatus::Abandoned { abandoned_at: at } => {
            (status.as_str(), Some(at.to_string()))
        }
    }
}

/// Reconstructs a `FormStatus` from form table column values.
fn deserialize_status(status: &str, closed_at: Option<&str>) -> Result<FormStatus> {
    let closed = || -> Result<Timestamp> {
        closed_at
            .ok_or_else(|| StorageError::Corrupt(format!("form is {status} but closed_at is null")))?
            .parse::<Timestamp>()
            .map_err(|e| StorageError::Corrupt(format!("invalid closed_at: {e}")))
    };
    match status {
        "editing" => Ok(FormStatus::Editing),
        "submitted" => Ok(FormStatus::Submitted {
            submitted_at: closed()?,
        }),
        "abandoned" => Ok(FormStatus::Abandoned {
            abandoned_at: closed()?,
        }),
        other => Err(StorageError::Corrupt(format!("unknown form status: {other}"))),
    }
}
