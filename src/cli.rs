//! CLI interface for Scout.
//!
//! Each subcommand is non-interactive: arguments in, plain text out.
//!
//! Commands split into two groups:
//!
//! - `scout form new|list`: lifecycle management, no form context needed.
//! - `scout --form <id> <command>`: everything else, operating on one form.
//!
//! The `--form` flag takes a full UUID or unambiguous prefix.

mod form;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use log::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::history::{HistoryError, HistoryManager};
use crate::model::{Form, HistoryEntry, JournalEntry, Operation, TrackId};
use crate::session::FormSession;
use crate::storage::Storage;

use format::{format_journal_entry, format_status};

/// Scout: stand-scouting forms with undo.
#[derive(Debug, Parser)]
#[command(name = "scout", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Form ID: full UUID or unambiguous prefix (e.g. `a3b`).
    /// Required for everything except `form new` and `form list`.
    #[arg(long, global = true)]
    form: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: scouting a match
  1. scout form new --team 1678 --match 12 --preloaded
     → prints a form ID (e.g. a3b0fc12)
  2. scout --form a3b outcome speakerScore      (preloaded note scored)
  3. scout --form a3b intake 2
  4. scout --form a3b outcome ampMiss
  5. scout --form a3b undo auto                 (oops, reopen note 2)
  6. scout --form a3b tally teleop ampScore
  7. scout --form a3b form submit";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage forms: create, list, submit, abandon.
    Form {
        #[command(subcommand)]
        command: FormCommand,
    },

    /// Bump a counter on a counters track.
    Tally {
        #[arg(value_enum)]
        track: TrackArg,

        /// Counter name (e.g. `ampScore`).
        field: String,
    },

    /// Record a note picked up on a timeline track.
    Intake {
        #[arg(long, value_enum, default_value_t = TrackArg::Auto)]
        track: TrackArg,

        /// Piece id: a positive number.
        piece: String,
    },

    /// Score the open note on a timeline track.
    Outcome {
        #[arg(long, value_enum, default_value_t = TrackArg::Auto)]
        track: TrackArg,

        /// Outcome name (e.g. `speakerScore`).
        result: String,
    },

    /// Reverse the last applied action on a track.
    Undo {
        #[arg(value_enum)]
        track: TrackArg,
    },

    /// Reapply the last undone action on a track.
    Redo {
        #[arg(value_enum)]
        track: TrackArg,
    },

    /// Put the preloaded note on or take it off a timeline track.
    Preload {
        #[command(subcommand)]
        command: PreloadCommand,
    },

    /// Show every track: data, history position, and pending undo/redo.
    Status,

    /// Show the recorded operations, oldest first.
    Journal,
}

#[derive(Debug, Subcommand)]
pub enum FormCommand {
    /// Create a new form. Prints the form ID.
    New {
        /// Team being scouted.
        #[arg(long)]
        team: u32,

        /// Match number.
        #[arg(long = "match")]
        match_number: u32,

        /// Who is scouting. Falls back to `default-scouter` in the config.
        #[arg(long = "as")]
        scouter: Option<String>,

        /// The robot starts the match holding a note.
        #[arg(long)]
        preloaded: bool,
    },

    /// List forms.
    List,

    /// Hand in the form. Its undo history is discarded.
    Submit,

    /// Give up on the form. Its undo history is discarded.
    Abandon,
}

#[derive(Debug, Subcommand)]
pub enum PreloadCommand {
    /// Add the preloaded note to the front of the timeline.
    Add {
        #[arg(long, value_enum, default_value_t = TrackArg::Auto)]
        track: TrackArg,
    },

    /// Remove the preloaded note, forgetting its outcome.
    Remove {
        #[arg(long, value_enum, default_value_t = TrackArg::Auto)]
        track: TrackArg,
    },
}

/// CLI-facing track, mapped to the domain `TrackId`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrackArg {
    Auto,
    Teleop,
    Endgame,
}

impl TrackArg {
    fn to_domain(self) -> TrackId {
        match self {
            Self::Auto => TrackId::Auto,
            Self::Teleop => TrackId::Teleop,
            Self::Endgame => TrackId::Endgame,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();
    let form_ref = cli.form.as_deref();

    match cli.command {
        Command::Form { command } => match command {
            FormCommand::New {
                team,
                match_number,
                scouter,
                preloaded,
            } => form::cmd_new(
                config,
                storage,
                team,
                match_number,
                scouter.as_deref(),
                preloaded,
            ),
            FormCommand::List => form::cmd_list(storage),
            FormCommand::Submit => {
                let form = require_form(storage, form_ref)?;
                form::cmd_submit(storage, form)
            }
            FormCommand::Abandon => {
                let form = require_form(storage, form_ref)?;
                form::cmd_abandon(storage, form)
            }
        },
        Command::Tally { track, field } => {
            let form = require_form(storage, form_ref)?;
            cmd_do(config, storage, form, track.to_domain(), HistoryEntry::Tally(field))
        }
        Command::Intake { track, piece } => {
            let form = require_form(storage, form_ref)?;
            cmd_do(config, storage, form, track.to_domain(), HistoryEntry::Intake(piece))
        }
        Command::Outcome { track, result } => {
            let form = require_form(storage, form_ref)?;
            cmd_do(
                config,
                storage,
                form,
                track.to_domain(),
                HistoryEntry::Outcome(result),
            )
        }
        Command::Undo { track } => {
            let form = require_form(storage, form_ref)?;
            cmd_undo(config, storage, form, track.to_domain())
        }
        Command::Redo { track } => {
            let form = require_form(storage, form_ref)?;
            cmd_redo(config, storage, form, track.to_domain())
        }
        Command::Preload { command } => {
            let form = require_form(storage, form_ref)?;
            match command {
                PreloadCommand::Add { track } => {
                    cmd_preload(config, storage, form, track.to_domain(), true)
                }
                PreloadCommand::Remove { track } => {
                    cmd_preload(config, storage, form, track.to_domain(), false)
                }
            }
        }
        Command::Status => {
            let form = require_form(storage, form_ref)?;
            cmd_status(config, &form)
        }
        Command::Journal => {
            let form = require_form(storage, form_ref)?;
            cmd_journal(storage, &form)
        }
    }
}

/// Require that `--form` was provided and resolve it.
fn require_form(storage: &Storage, form_ref: Option<&str>) -> Result<Form, String> {
    let form_ref = form_ref.ok_or("this command requires --form <id>")?;
    resolve_form(storage, form_ref)
}

fn cmd_do(
    config: &Config,
    storage: &Storage,
    form: Form,
    track: TrackId,
    entry: HistoryEntry,
) -> Result<(), String> {
    let layout = config.layout();
    let label = layout
        .track(track)
        .map_or(entry.token(), |t| t.label(entry.token()))
        .to_string();
    let token = entry.token().to_string();
    let description = match &entry {
        HistoryEntry::Tally(_) => format!("+1 {label}"),
        HistoryEntry::Intake(piece) => format!("picked up note {piece}"),
        HistoryEntry::Outcome(_) => format!("scored as {label}"),
    };

    edit(config, storage, form, track, |session| {
        session.apply(track, entry)?;
        Ok(Some(Operation::Do { entry: token }))
    })?;

    eprintln!("{track}: {description}");
    Ok(())
}

fn cmd_undo(config: &Config, storage: &Storage, form: Form, track: TrackId) -> Result<(), String> {
    let operation = edit(config, storage, form, track, |session| {
        let Some(note) = session.manager(track).and_then(HistoryManager::undo_note) else {
            return Ok(None);
        };
        session.undo(track)?;
        Ok(Some(Operation::Undo { note }))
    })?;

    match operation {
        Some(Operation::Undo { note }) => eprintln!("{track}: undid {note}"),
        _ => eprintln!("{track}: nothing to undo"),
    }
    Ok(())
}

fn cmd_redo(config: &Config, storage: &Storage, form: Form, track: TrackId) -> Result<(), String> {
    let operation = edit(config, storage, form, track, |session| {
        let Some(note) = session.manager(track).and_then(HistoryManager::redo_note) else {
            return Ok(None);
        };
        session.redo(track)?;
        Ok(Some(Operation::Redo { note }))
    })?;

    match operation {
        Some(Operation::Redo { note }) => eprintln!("{track}: redid {note}"),
        _ => eprintln!("{track}: nothing to redo"),
    }
    Ok(())
}

fn cmd_preload(
    config: &Config,
    storage: &Storage,
    form: Form,
    track: TrackId,
    add: bool,
) -> Result<(), String> {
    edit(config, storage, form, track, |session| {
        if add {
            session.add_preload(track)?;
            Ok(Some(Operation::AddPreload))
        } else {
            session.remove_preload(track)?;
            Ok(Some(Operation::RemovePreload))
        }
    })?;

    let verb = if add { "added" } else { "removed" };
    eprintln!("{track}: preloaded note {verb}");
    Ok(())
}

/// Runs one mutation against an editing form, then writes the document
/// and a journal entry. A mutation that returns `None` changed nothing and
/// writes nothing.
fn edit(
    config: &Config,
    storage: &Storage,
    mut form: Form,
    track: TrackId,
    mutate: impl FnOnce(&mut FormSession) -> Result<Option<Operation>, HistoryError>,
) -> Result<Option<Operation>, String> {
    ensure_editing(&form)?;

    let layout = config.layout();
    let short_id = form.short_id();
    let mut session = FormSession::open(&layout, form.document.clone())
        .map_err(|e| format!("failed to open form {short_id}: {e}"))?
        .with_observer(move |doc| {
            if let Some(history) = doc.history.get(&track) {
                debug!(
                    "form {short_id} {track}: position {} of {}",
                    history.position,
                    history.log.len()
                );
            }
        });

    let Some(operation) = mutate(&mut session).map_err(|e| e.to_string())? else {
        return Ok(None);
    };

    form.document = session.into_document();
    storage
        .append_journal(
            &form,
            &JournalEntry {
                track,
                operation: operation.clone(),
                recorded_at: Timestamp::now(),
            },
        )
        .map_err(|e| format!("failed to update form: {e}"))?;

    Ok(Some(operation))
}

fn ensure_editing(form: &Form) -> Result<(), String> {
    if form.is_editing() {
        Ok(())
    } else {
        Err(format!(
            "form {} is {}",
            form.short_id(),
            form.status.as_str()
        ))
    }
}

fn cmd_status(config: &Config, form: &Form) -> Result<(), String> {
    let layout = config.layout();
    let session = FormSession::open(&layout, form.document.clone())
        .map_err(|e| format!("failed to open form {}: {e}", form.short_id()))?;
    print!("{}", format_status(form, &layout, &session));
    Ok(())
}

fn cmd_journal(storage: &Storage, form: &Form) -> Result<(), String> {
    let entries = storage
        .load_journal(form.id)
        .map_err(|e| format!("failed to load journal: {e}"))?;

    if entries.is_empty() {
        println!("No journal entries");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_journal_entry(entry));
    }
    Ok(())
}

/// Resolve a form reference (full UUID or unambiguous prefix) to a form.
fn resolve_form(storage: &Storage, reference: &str) -> Result<Form, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_form(id)
            .map_err(|e| format!("form not found: {e}"));
    }

    let forms = storage
        .list_forms()
        .map_err(|e| format!("failed to list forms: {e}"))?;

    let matches: Vec<&Form> = forms
        .iter()
        .filter(|f| f.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no form matching '{reference}'")),
        [form] => Ok((*form).clone()),
        many => {
            let ids: Vec<String> = many.iter().map(|f| f.short_id()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} forms: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
