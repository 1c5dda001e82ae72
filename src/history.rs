//! Undo/redo history for multi-phase forms.
//!
//! Each track of a form gets its own [`HistoryManager`]. A manager pairs a
//! [`Command`] (how an entry mutates the document and how to reverse it)
//! with a [`TrackState`] (the entries applied so far and a cursor into
//! them). Managers for the same form edit disjoint tracks of one shared
//! [`FormDocument`](crate::model::FormDocument).
//!
//! Every violated precondition is reported as a [`HistoryError`] before the
//! document or the log is touched. Nothing is clamped.

mod command;
mod manager;
mod state;

use crate::model::{TrackId, TrackKind};

pub use command::{Command, Slot};
pub use manager::HistoryManager;
pub use state::TrackState;

/// Invariant violations raised by commands and managers.
///
/// Each one means the caller offered an action the form's current state
/// cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("track {0} is not on this form")]
    UnknownTrack(TrackId),

    #[error("track {track} is a {actual} track, not a {expected} track")]
    KindMismatch {
        track: TrackId,
        expected: TrackKind,
        actual: TrackKind,
    },

    #[error("{track} has no field named '{field}'")]
    UnknownField { track: TrackId, field: String },

    #[error("'{0}' is not a piece id")]
    InvalidPiece(String),

    #[error("counter '{field}' on {track} is already zero")]
    CounterUnderflow { track: TrackId, field: String },

    #[error("counter '{field}' on {track} is at its maximum")]
    CounterOverflow { track: TrackId, field: String },

    #[error("{0} has no open piece to score")]
    NoOpenEntry(TrackId),

    #[error("piece {piece} on {track} is still open")]
    EntryStillOpen { track: TrackId, piece: String },

    #[error("{track} timeline does not end with open piece {piece}")]
    MissingPiece { track: TrackId, piece: String },

    #[error("{track} has no piece scored as '{outcome}' to reopen")]
    NotScored { track: TrackId, outcome: String },

    #[error("{0} has no open preloaded piece")]
    NoOpenPreload(TrackId),

    #[error("{0} already has a preloaded piece")]
    PreloadPresent(TrackId),

    #[error("{0} has no preloaded piece")]
    PreloadMissing(TrackId),

    #[error("corrupt history for {track}: {reason}")]
    CorruptHistory { track: TrackId, reason: String },
}

pub type Result<T> = core::result::Result<T, HistoryError>;
