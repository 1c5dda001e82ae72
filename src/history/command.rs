//! Commands: how one history entry mutates a track, and how to reverse it.

use std::collections::BTreeMap;

use crate::layout::TrackLayout;
use crate::model::{
    FormDocument, HistoryEntry, PRELOAD_PIECE_ID, TimelineEntry, TrackData, TrackId, TrackKind,
    is_piece_id,
};

use super::{HistoryError, Result};

/// Which timeline entry an outcome closes or reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The last entry of the timeline.
    Tail,

    /// The preloaded piece pinned at index 0.
    Preload,
}

/// The command bound to one track, built from that track's layout.
#[derive(Debug, Clone)]
pub enum Command {
    /// Increments and decrements named counters.
    Counter { track: TrackId, fields: Vec<String> },

    /// Opens and closes timeline entries.
    Timeline { track: TrackId, outcomes: Vec<String> },
}

impl Command {
    pub fn for_track(layout: &TrackLayout) -> Self {
        match layout.kind {
            TrackKind::Counters => Self::Counter {
                track: layout.id,
                fields: layout.fields.clone(),
            },
            TrackKind::Timeline => Self::Timeline {
                track: layout.id,
                outcomes: layout.fields.clone(),
            },
        }
    }

    pub fn track(&self) -> TrackId {
        match self {
            Self::Counter { track, .. } | Self::Timeline { track, .. } => *track,
        }
    }

    fn kind(&self) -> TrackKind {
        match self {
            Self::Counter { .. } => TrackKind::Counters,
            Self::Timeline { .. } => TrackKind::Timeline,
        }
    }

    /// Applies `entry` to the document.
    ///
    /// `slot` only matters for outcomes: it picks whether the preload or
    /// the tail of the timeline gets closed.
    pub fn execute(&self, doc: &mut FormDocument, entry: &HistoryEntry, slot: Slot) -> Result<()> {
        let track = self.track();
        match (self, entry) {
            (Self::Counter { fields, .. }, HistoryEntry::Tally(field)) => {
                check_field(track, fields, field)?;
                let counters = counters_mut(doc, track)?;
                let count = counters.entry(field.clone()).or_insert(0);
                *count = count
                    .checked_add(1)
                    .ok_or_else(|| HistoryError::CounterOverflow {
                        track,
                        field: field.clone(),
                    })?;
                Ok(())
            }
            (Self::Timeline { .. }, HistoryEntry::Intake(piece)) => {
                if !is_piece_id(piece) || piece == PRELOAD_PIECE_ID {
                    return Err(HistoryError::InvalidPiece(piece.clone()));
                }
                let timeline = timeline_mut(doc, track)?;
                if let Some(last) = timeline.last() {
                    // The open preload may sit in front of ordinary pieces.
                    let lone_preload = timeline.len() == 1 && last.is_open_preload();
                    if last.is_open() && !lone_preload {
                        return Err(HistoryError::EntryStillOpen {
                            track,
                            piece: last.piece_id.clone(),
                        });
                    }
                }
                timeline.push(TimelineEntry::open(piece.clone()));
                Ok(())
            }
            (Self::Timeline { outcomes, .. }, HistoryEntry::Outcome(outcome)) => {
                check_field(track, outcomes, outcome)?;
                let timeline = timeline_mut(doc, track)?;
                let target = match slot {
                    Slot::Preload => timeline
                        .first_mut()
                        .filter(|e| e.is_open_preload())
                        .ok_or(HistoryError::NoOpenPreload(track))?,
                    Slot::Tail => timeline
                        .last_mut()
                        .filter(|e| e.is_open())
                        .ok_or(HistoryError::NoOpenEntry(track))?,
                };
                target.scored_as = Some(outcome.clone());
                Ok(())
            }
            _ => Err(self.mismatch(entry)),
        }
    }

    /// Reverses a previous [`execute`](Self::execute) of `entry`.
    pub fn undo(&self, doc: &mut FormDocument, entry: &HistoryEntry, slot: Slot) -> Result<()> {
        let track = self.track();
        match (self, entry) {
            (Self::Counter { .. }, HistoryEntry::Tally(field)) => {
                let counters = counters_mut(doc, track)?;
                let count = counters
                    .get_mut(field)
                    .ok_or_else(|| HistoryError::UnknownField {
                        track,
                        field: field.clone(),
                    })?;
                *count = count
                    .checked_sub(1)
                    .ok_or_else(|| HistoryError::CounterUnderflow {
                        track,
                        field: field.clone(),
                    })?;
                Ok(())
            }
            (Self::Timeline { .. }, HistoryEntry::Intake(piece)) => {
                let timeline = timeline_mut(doc, track)?;
                let open_tail = timeline
                    .last()
                    .is_some_and(|last| last.is_open() && last.piece_id == *piece);
                if !open_tail {
                    return Err(HistoryError::MissingPiece {
                        track,
                        piece: piece.clone(),
                    });
                }
                timeline.pop();
                Ok(())
            }
            (Self::Timeline { .. }, HistoryEntry::Outcome(outcome)) => {
                let timeline = timeline_mut(doc, track)?;
                let target = match slot {
                    Slot::Preload => timeline.first_mut().filter(|e| e.is_preload()),
                    Slot::Tail => timeline.last_mut(),
                };
                match target {
                    Some(e) if e.scored_as.as_ref() == Some(outcome) => {
                        e.scored_as = None;
                        Ok(())
                    }
                    _ => Err(HistoryError::NotScored {
                        track,
                        outcome: outcome.clone(),
                    }),
                }
            }
            _ => Err(self.mismatch(entry)),
        }
    }

    fn mismatch(&self, entry: &HistoryEntry) -> HistoryError {
        let wanted = match entry {
            HistoryEntry::Tally(_) => TrackKind::Counters,
            HistoryEntry::Intake(_) | HistoryEntry::Outcome(_) => TrackKind::Timeline,
        };
        HistoryError::KindMismatch {
            track: self.track(),
            expected: wanted,
            actual: self.kind(),
        }
    }
}

fn check_field(track: TrackId, fields: &[String], field: &str) -> Result<()> {
    if fields.iter().any(|f| f == field) {
        Ok(())
    } else {
        Err(HistoryError::UnknownField {
            track,
            field: field.to_string(),
        })
    }
}

fn track_mut(doc: &mut FormDocument, track: TrackId) -> Result<&mut TrackData> {
    doc.track_mut(track).ok_or(HistoryError::UnknownTrack(track))
}

fn counters_mut(doc: &mut FormDocument, track: TrackId) -> Result<&mut BTreeMap<String, u32>> {
    match track_mut(doc, track)? {
        TrackData::Counters(counters) => Ok(counters),
        TrackData::Timeline(_) => Err(HistoryError::KindMismatch {
            track,
            expected: TrackKind::Counters,
            actual: TrackKind::Timeline,
        }),
    }
}

fn timeline_mut(doc: &mut FormDocument, track: TrackId) -> Result<&mut Vec<TimelineEntry>> {
    match track_mut(doc, track)? {
        TrackData::Timeline(entries) => Ok(entries),
        TrackData::Counters(_) => Err(HistoryError::KindMismatch {
            track,
            expected: TrackKind::Timeline,
            actual: TrackKind::Counters,
        }),
    }
}
