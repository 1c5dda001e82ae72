//! Timeline entries: one handled piece and how it was scored.

use serde::{Deserialize, Serialize};

/// Piece id reserved for the piece loaded into the robot before the match.
pub const PRELOAD_PIECE_ID: &str = "0";

/// A piece the robot handled, and its outcome once known.
///
/// An entry is open while `scored_as` is `None`. Only the last entry of a
/// timeline may be open, except the preload, which stays at index 0 while
/// it waits for its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub piece_id: String,
    pub scored_as: Option<String>,
}

impl TimelineEntry {
    /// A freshly intaken piece with no outcome yet.
    pub fn open(piece_id: impl Into<String>) -> Self {
        Self {
            piece_id: piece_id.into(),
            scored_as: None,
        }
    }

    pub fn preload() -> Self {
        Self::open(PRELOAD_PIECE_ID)
    }

    pub fn is_open(&self) -> bool {
        self.scored_as.is_none()
    }

    pub fn is_preload(&self) -> bool {
        self.piece_id == PRELOAD_PIECE_ID
    }

    pub fn is_open_preload(&self) -> bool {
        self.is_preload() && self.is_open()
    }
}
