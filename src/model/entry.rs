//! History entries and their persisted layout.

use serde::{Deserialize, Serialize};

use super::TrackKind;

/// A single value previously submitted to a track.
///
/// Timeline tracks distinguish starting on a new piece from recording
/// how the open piece ended. Counter tracks only ever tally a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// Increment the named counter.
    Tally(String),

    /// Pick up a piece: opens a new timeline entry.
    Intake(String),

    /// Record how the open piece was scored: closes it.
    Outcome(String),
}

impl HistoryEntry {
    /// The bare token written to the persisted log.
    pub fn token(&self) -> &str {
        match self {
            Self::Tally(s) | Self::Intake(s) | Self::Outcome(s) => s,
        }
    }

    pub fn is_outcome(&self) -> bool {
        matches!(self, Self::Outcome(_))
    }

    /// Re-types a persisted token for a track of the given kind.
    ///
    /// Piece ids are all-digit tokens; any other timeline token is an outcome.
    pub fn decode(kind: TrackKind, token: &str) -> Self {
        match kind {
            TrackKind::Counters => Self::Tally(token.to_string()),
            TrackKind::Timeline if is_piece_id(token) => Self::Intake(token.to_string()),
            TrackKind::Timeline => Self::Outcome(token.to_string()),
        }
    }
}

/// Whether `token` is usable as a piece id.
pub fn is_piece_id(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// The `{log, position}` mirror of one track's history, as stored in a
/// form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHistory {
    pub log: Vec<String>,

    /// Index of the last applied entry; `-1` when nothing is applied.
    pub position: i64,
}

impl Default for PersistedHistory {
    fn default() -> Self {
        Self {
            log: Vec::new(),
            position: -1,
        }
    }
}
