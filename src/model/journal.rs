//! Journal entries: an append-only record of what was done to a form.
//!
//! The history log of a track is truncated when a new action follows an
//! undo. The journal is not: it captures every operation as it happened.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TrackId;

/// A single recorded operation on one track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub track: TrackId,
    pub operation: Operation,
    pub recorded_at: Timestamp,
}

/// What was done to the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    /// A new action was applied. `entry` is the persisted token.
    Do { entry: String },

    /// The action with this label was undone.
    Undo { note: String },

    /// The action with this label was reapplied.
    Redo { note: String },

    /// A preloaded piece was added to the front of the timeline.
    AddPreload,

    /// The preloaded piece was taken off the timeline.
    RemovePreload,
}
