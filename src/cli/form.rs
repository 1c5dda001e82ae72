//! Form lifecycle commands: new, list, submit, abandon.

use jiff::Timestamp;
use uuid::Uuid;

use crate::config::Config;
use crate::model::{Form, FormStatus};
use crate::storage::Storage;

use super::ensure_editing;

pub(super) fn cmd_new(
    config: &Config,
    storage: &Storage,
    team: u32,
    match_number: u32,
    scouter: Option<&str>,
    preloaded: bool,
) -> Result<(), String> {
    let scouter = scouter
        .or(config.default_scouter.as_deref())
        .ok_or("no scouter given: pass --as or set default-scouter in the config")?;

    let form = Form {
        id: Uuid::new_v4(),
        team,
        match_number,
        scouter: scouter.to_string(),
        created_at: Timestamp::now(),
        status: FormStatus::Editing,
        document: config.layout().document(preloaded),
    };

    storage
        .create_form(&form)
        .map_err(|e| format!("failed to create form: {e}"))?;

    println!("{}", form.id);
    Ok(())
}

pub(super) fn cmd_list(storage: &Storage) -> Result<(), String> {
    let forms = storage
        .list_forms()
        .map_err(|e| format!("failed to list forms: {e}"))?;

    if forms.is_empty() {
        println!("No forms");
        return Ok(());
    }

    for f in &forms {
        println!(
            "{}  [{}] [{}]  team {} match {}",
            f.short_id(),
            f.status.as_str(),
            f.scouter,
            f.team,
            f.match_number
        );
    }

    Ok(())
}

pub(super) fn cmd_submit(storage: &Storage, form: Form) -> Result<(), String> {
    close(
        storage,
        form,
        FormStatus::Submitted {
            submitted_at: Timestamp::now(),
        },
    )
}

pub(super) fn cmd_abandon(storage: &Storage, form: Form) -> Result<(), String> {
    close(
        storage,
        form,
        FormStatus::Abandoned {
            abandoned_at: Timestamp::now(),
        },
    )
}

/// Moves an editing form to a closed status. Undo history goes with it.
fn close(storage: &Storage, mut form: Form, status: FormStatus) -> Result<(), String> {
    ensure_editing(&form)?;

    form.close(status);
    storage
        .update_form(&form)
        .map_err(|e| format!("failed to update form: {e}"))?;

    eprintln!("Form {} {}", form.short_id(), form.status.as_str());
    Ok(())
}
