//! Core data model for Scout.
//!
//! These types represent what a scout records during a match:
//! forms, their per-track documents, the history entries that mutate
//! them, and the journal of operations applied to a form.

mod document;
mod entry;
mod form;
mod journal;
mod timeline;
mod track;

pub use document::{FormDocument, TrackData};
pub use entry::{HistoryEntry, PersistedHistory, is_piece_id};
pub use form::{Form, FormStatus};
pub use journal::{JournalEntry, Operation};
pub use timeline::{PRELOAD_PIECE_ID, TimelineEntry};
pub use track::{TrackId, TrackKind};
