//! Output formatting for CLI display.

use crate::layout::{FormLayout, TrackLayout};
use crate::model::{Form, JournalEntry, Operation, TimelineEntry, TrackData};
use crate::session::FormSession;

/// Render every track of a form: its data, where its history cursor sits,
/// and what undo or redo would do next.
pub(super) fn format_status(form: &Form, layout: &FormLayout, session: &FormSession) -> String {
    let mut lines = vec![format!(
        "Form {}  [{}]  team {} match {} ({})",
        form.short_id(),
        form.status.as_str(),
        form.team,
        form.match_number,
        form.scouter
    )];

    for track in layout.tracks() {
        lines.push(String::new());
        let Some(manager) = session.manager(track.id) else {
            continue;
        };
        let position = manager
            .position()
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        lines.push(format!(
            "{} ({})  position {position} of {}",
            track.id,
            track.kind,
            manager.history_len()
        ));

        match session.document().track(track.id) {
            Some(TrackData::Counters(counters)) => {
                for field in &track.fields {
                    let count = counters.get(field).copied().unwrap_or(0);
                    lines.push(format!("  {}: {count}", track.label(field)));
                }
            }
            Some(TrackData::Timeline(entries)) if entries.is_empty() => {
                lines.push("  (no notes)".to_string());
            }
            Some(TrackData::Timeline(entries)) => {
                for (i, entry) in entries.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, format_timeline_entry(track, entry)));
                }
            }
            None => lines.push("  (missing)".to_string()),
        }

        if manager.state().is_empty() {
            lines.push("  (no history)".to_string());
        }
        if let Some(note) = manager.undo_note() {
            lines.push(format!("  undo: {note}"));
        }
        if let Some(note) = manager.redo_note() {
            lines.push(format!("  redo: {note}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_timeline_entry(track: &TrackLayout, entry: &TimelineEntry) -> String {
    let piece = if entry.is_preload() {
        "preloaded note".to_string()
    } else {
        format!("note {}", entry.piece_id)
    };
    match &entry.scored_as {
        Some(outcome) => format!("{piece} → {}", track.label(outcome)),
        None => format!("{piece} (open)"),
    }
}

pub(super) fn format_journal_entry(entry: &JournalEntry) -> String {
    format!(
        "{}  {:<7}  {}",
        entry.recorded_at,
        entry.track.as_str(),
        format_operation(&entry.operation)
    )
}

fn format_operation(operation: &Operation) -> String {
    match operation {
        Operation::Do { entry } => format!("did {entry}"),
        Operation::Undo { note } => format!("undid {note}"),
        Operation::Redo { note } => format!("redid {note}"),
        Operation::AddPreload => "added preloaded note".to_string(),
        Operation::RemovePreload => "removed preloaded note".to_string(),
    }
}
