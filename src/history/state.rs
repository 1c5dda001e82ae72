//! Track state: the history log of one track and its cursor.
//!
//! The cursor counts applied entries. `position()` is the index of the last
//! applied entry, `None` when everything has been undone.

use crate::model::{HistoryEntry, PersistedHistory, TrackKind};

/// The applied (and redoable) entries of one track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackState {
    log: Vec<HistoryEntry>,
    applied: usize,
}

impl TrackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from its persisted mirror.
    ///
    /// Returns a description of the problem when the position lies
    /// outside `-1..=log.len() - 1`.
    pub fn restore(kind: TrackKind, persisted: &PersistedHistory) -> Result<Self, String> {
        let log: Vec<HistoryEntry> = persisted
            .log
            .iter()
            .map(|token| HistoryEntry::decode(kind, token))
            .collect();

        let applied = persisted
            .position
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n <= log.len())
            .ok_or_else(|| {
                format!(
                    "position {} is outside -1..={} for a log of {} entries",
                    persisted.position,
                    signed(log.len()) - 1,
                    log.len()
                )
            })?;

        Ok(Self { log, applied })
    }

    pub fn to_persisted(&self) -> PersistedHistory {
        PersistedHistory {
            log: self.log.iter().map(|e| e.token().to_string()).collect(),
            position: signed(self.applied) - 1,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Number of entries currently reflected in the document.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Index of the last applied entry.
    pub fn position(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.log.len()
    }

    /// Appends a newly applied entry, discarding the redo branch.
    pub(super) fn record(&mut self, entry: HistoryEntry) {
        self.log.truncate(self.applied);
        self.log.push(entry);
        self.applied += 1;
    }

    /// Records the preload's outcome at index 0.
    ///
    /// Replaces an earlier, undone preload outcome if there is one;
    /// otherwise shifts every entry back by one. The redo branch is kept.
    pub(super) fn pin_to_front(&mut self, entry: HistoryEntry) {
        if self.log.first().is_some_and(HistoryEntry::is_outcome) {
            assert_eq!(self.applied, 0, "preload outcome replaced while applied");
            self.log[0] = entry;
        } else {
            self.log.insert(0, entry);
        }
        self.applied += 1;
    }

    pub(super) fn step_back(&mut self) {
        assert!(self.can_undo(), "step back past the start of the log");
        self.applied -= 1;
    }

    pub(super) fn step_forward(&mut self) {
        assert!(self.can_redo(), "step forward past the end of the log");
        self.applied += 1;
    }

    /// Drops a preload outcome recorded at index 0.
    ///
    /// Returns whether one was removed.
    pub(super) fn drop_front_outcome(&mut self) -> bool {
        if !self.log.first().is_some_and(HistoryEntry::is_outcome) {
            return false;
        }
        self.log.remove(0);
        self.applied = self.applied.saturating_sub(1);
        true
    }
}

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
