//! The form document: what every history manager edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PersistedHistory, TimelineEntry, TrackId, TrackKind};

/// Per-track data recorded on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum TrackData {
    Counters(BTreeMap<String, u32>),
    Timeline(Vec<TimelineEntry>),
}

impl TrackData {
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Counters(_) => TrackKind::Counters,
            Self::Timeline(_) => TrackKind::Timeline,
        }
    }
}

/// The mutable aggregate a scout edits during one match.
///
/// Each track owns a disjoint slice of `tracks`, and mirrors its undo
/// history into `history` so the document can be persisted and resumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDocument {
    pub tracks: BTreeMap<TrackId, TrackData>,

    #[serde(default)]
    pub history: BTreeMap<TrackId, PersistedHistory>,
}

impl FormDocument {
    pub fn track(&self, id: TrackId) -> Option<&TrackData> {
        self.tracks.get(&id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut TrackData> {
        self.tracks.get_mut(&id)
    }

    /// The counter map of a counters track.
    pub fn counters(&self, id: TrackId) -> Option<&BTreeMap<String, u32>> {
        match self.track(id)? {
            TrackData::Counters(counters) => Some(counters),
            TrackData::Timeline(_) => None,
        }
    }

    /// The entries of a timeline track.
    pub fn timeline(&self, id: TrackId) -> Option<&[TimelineEntry]> {
        match self.track(id)? {
            TrackData::Timeline(entries) => Some(entries),
            TrackData::Counters(_) => None,
        }
    }

    /// Drops every track's history mirror; recorded data stays.
    pub fn discard_history(&mut self) {
        self.history.clear();
    }
}
