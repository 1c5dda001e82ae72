//! History manager: do/undo/redo for one track of a form.

use log::debug;

use crate::layout::TrackLayout;
use crate::model::{
    FormDocument, HistoryEntry, PersistedHistory, TimelineEntry, TrackData, TrackId, TrackKind,
};

use super::{Command, HistoryError, Result, Slot, TrackState};

/// Coordinates one track's command and history log.
///
/// Every mutating call validates first, then mutates the document, then
/// mirrors the updated log into `doc.history[track]`. A failed call leaves
/// both the document and the log untouched.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    layout: TrackLayout,
    command: Command,
    state: TrackState,
}

impl HistoryManager {
    pub fn new(layout: &TrackLayout) -> Self {
        Self {
            layout: layout.clone(),
            command: Command::for_track(layout),
            state: TrackState::new(),
        }
    }

    /// Resumes a track from the history mirror stored in a document.
    pub fn restore(layout: &TrackLayout, persisted: &PersistedHistory) -> Result<Self> {
        let state = TrackState::restore(layout.kind, persisted).map_err(|reason| {
            HistoryError::CorruptHistory {
                track: layout.id,
                reason,
            }
        })?;
        Ok(Self {
            layout: layout.clone(),
            command: Command::for_track(layout),
            state,
        })
    }

    pub fn track(&self) -> TrackId {
        self.layout.id
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    /// Applies a new entry, discarding anything that could have been redone.
    ///
    /// An outcome recorded while the timeline still starts with an open
    /// preload closes the preload and is pinned to index 0 of the log.
    pub fn do_command(&mut self, doc: &mut FormDocument, entry: HistoryEntry) -> Result<()> {
        let pins_preload = entry.is_outcome() && self.has_open_preload(doc);
        let slot = if pins_preload { Slot::Preload } else { Slot::Tail };

        self.command.execute(doc, &entry, slot)?;
        debug!(
            "{}: do {} ({slot:?}) at position {:?}",
            self.track(),
            entry.token(),
            self.state.position()
        );

        if pins_preload {
            self.state.pin_to_front(entry);
        } else {
            self.state.record(entry);
        }
        self.sync(doc);
        Ok(())
    }

    /// Reverses the last applied entry.
    ///
    /// Returns `false` without touching anything when nothing is applied.
    pub fn undo(&mut self, doc: &mut FormDocument) -> Result<bool> {
        let Some(index) = self.state.position() else {
            return Ok(false);
        };
        let entry = &self.state.entries()[index];
        self.command.undo(doc, entry, self.slot_at(index))?;
        debug!("{}: undo {} at position {index}", self.track(), entry.token());

        self.state.step_back();
        self.sync(doc);
        Ok(true)
    }

    /// Reapplies the next undone entry.
    ///
    /// Redo never moves entries in the log: a preload outcome is reapplied
    /// to the preload because it sits at index 0, not because the preload
    /// happens to be open. Returns `false` when nothing is left to redo.
    pub fn redo(&mut self, doc: &mut FormDocument) -> Result<bool> {
        if !self.state.can_redo() {
            return Ok(false);
        }
        let index = self.state.applied();
        let entry = &self.state.entries()[index];
        self.command.execute(doc, entry, self.slot_at(index))?;
        debug!("{}: redo {} at position {index}", self.track(), entry.token());

        self.state.step_forward();
        self.sync(doc);
        Ok(true)
    }

    /// Takes the preloaded piece off the timeline.
    ///
    /// If its outcome was already recorded at index 0 of the log, that
    /// entry goes too and the position shifts down with it.
    pub fn remove_preloaded_entry(&mut self, doc: &mut FormDocument) -> Result<()> {
        let track = self.track();
        let timeline = self.timeline_mut(doc)?;
        if !timeline.first().is_some_and(TimelineEntry::is_preload) {
            return Err(HistoryError::PreloadMissing(track));
        }
        timeline.remove(0);

        let dropped = self.state.drop_front_outcome();
        debug!("{track}: removed preload (outcome dropped from log: {dropped})");
        self.sync(doc);
        Ok(())
    }

    /// Puts an open preloaded piece at the front of the timeline.
    pub fn add_preloaded_entry(&mut self, doc: &mut FormDocument) -> Result<()> {
        let track = self.track();
        let timeline = self.timeline_mut(doc)?;
        if timeline.first().is_some_and(TimelineEntry::is_preload) {
            return Err(HistoryError::PreloadPresent(track));
        }
        timeline.insert(0, TimelineEntry::preload());
        debug!("{track}: added preload");
        self.sync(doc);
        Ok(())
    }

    /// Index of the last applied entry, `None` when fully undone.
    pub fn position(&self) -> Option<usize> {
        self.state.position()
    }

    pub fn history_len(&self) -> usize {
        self.state.len()
    }

    /// Label of the entry `undo` would reverse.
    pub fn undo_note(&self) -> Option<String> {
        self.state.position().map(|index| self.note_at(index))
    }

    /// Label of the entry `redo` would reapply.
    pub fn redo_note(&self) -> Option<String> {
        self.state
            .can_redo()
            .then(|| self.note_at(self.state.applied()))
    }

    fn note_at(&self, index: usize) -> String {
        match &self.state.entries()[index] {
            HistoryEntry::Tally(field) => self.layout.label(field).to_string(),
            HistoryEntry::Intake(piece) => format!("Note {piece}"),
            HistoryEntry::Outcome(outcome) if index == 0 => {
                format!("{} (Preloaded)", self.layout.label(outcome))
            }
            HistoryEntry::Outcome(outcome) => self.layout.label(outcome).to_string(),
        }
    }

    /// An outcome at index 0 can only have closed the preload: any other
    /// first outcome would have had no open piece to score.
    fn slot_at(&self, index: usize) -> Slot {
        if index == 0 && self.state.entries()[0].is_outcome() {
            Slot::Preload
        } else {
            Slot::Tail
        }
    }

    fn has_open_preload(&self, doc: &FormDocument) -> bool {
        doc.timeline(self.track())
            .and_then(<[TimelineEntry]>::first)
            .is_some_and(TimelineEntry::is_open_preload)
    }

    fn timeline_mut<'d>(&self, doc: &'d mut FormDocument) -> Result<&'d mut Vec<TimelineEntry>> {
        let track = self.track();
        match doc.track_mut(track) {
            Some(TrackData::Timeline(entries)) => Ok(entries),
            Some(data) => Err(HistoryError::KindMismatch {
                track,
                expected: TrackKind::Timeline,
                actual: data.kind(),
            }),
            None => Err(HistoryError::UnknownTrack(track)),
        }
    }

    fn sync(&self, doc: &mut FormDocument) {
        doc.history.insert(self.track(), self.state.to_persisted());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::layout::FormLayout;

    fn manager(track: TrackId) -> HistoryManager {
        HistoryManager::new(FormLayout::stand().track(track).unwrap())
    }

    fn tally(field: &str) -> HistoryEntry {
        HistoryEntry::Tally(field.into())
    }

    fn intake(piece: &str) -> HistoryEntry {
        HistoryEntry::Intake(piece.into())
    }

    fn outcome(result: &str) -> HistoryEntry {
        HistoryEntry::Outcome(result.into())
    }

    fn scored(piece: &str, result: &str) -> TimelineEntry {
        TimelineEntry {
            piece_id: piece.into(),
            scored_as: Some(result.into()),
        }
    }

    /// A counters-only layout with the two intake fields from the scouting
    /// walkthrough.
    fn source_ground() -> (TrackLayout, FormDocument) {
        let layout = TrackLayout {
            id: TrackId::Teleop,
            kind: TrackKind::Counters,
            fields: vec!["source".into(), "ground".into()],
            labels: BTreeMap::from([
                ("source".into(), "Source Intake".into()),
                ("ground".into(), "Ground Intake".into()),
            ]),
        };
        let mut doc = FormDocument::default();
        doc.tracks.insert(
            TrackId::Teleop,
            TrackData::Counters(BTreeMap::from([("source".into(), 0), ("ground".into(), 0)])),
        );
        (layout, doc)
    }

    fn counts(doc: &FormDocument) -> (u32, u32) {
        let c = doc.counters(TrackId::Teleop).unwrap();
        (c["source"], c["ground"])
    }

    #[test]
    fn counter_walkthrough() {
        let (layout, mut doc) = source_ground();
        let mut m = HistoryManager::new(&layout);
        assert_eq!(m.position(), None);

        m.do_command(&mut doc, tally("source")).unwrap();
        assert_eq!(counts(&doc), (1, 0));
        assert_eq!(doc.history[&TrackId::Teleop].log, ["source"]);
        assert_eq!(doc.history[&TrackId::Teleop].position, 0);

        m.do_command(&mut doc, tally("ground")).unwrap();
        assert_eq!(counts(&doc), (1, 1));
        assert_eq!(m.position(), Some(1));

        assert!(m.undo(&mut doc).unwrap());
        assert_eq!(counts(&doc), (1, 0));
        assert_eq!(m.position(), Some(0));

        m.do_command(&mut doc, tally("ground")).unwrap();
        assert_eq!(counts(&doc), (1, 1));
        assert_eq!(doc.history[&TrackId::Teleop].log, ["source", "ground"]);
        assert_eq!(doc.history[&TrackId::Teleop].position, 1);
        assert_eq!(m.history_len(), 2);
    }

    #[test]
    fn undo_restores_previous_document() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(false);

        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("speakerScore")).unwrap();
        m.do_command(&mut doc, intake("2")).unwrap();
        let before = doc.tracks.clone();

        m.do_command(&mut doc, outcome("ampMiss")).unwrap();
        m.undo(&mut doc).unwrap();

        assert_eq!(doc.tracks, before);
    }

    #[test]
    fn redo_replays_exactly() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(false);

        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        let after = doc.clone();

        m.undo(&mut doc).unwrap();
        assert_ne!(doc.tracks, after.tracks);
        m.redo(&mut doc).unwrap();

        assert_eq!(doc, after);
    }

    #[test]
    fn undo_and_redo_at_the_ends_are_no_ops() {
        let mut m = manager(TrackId::Endgame);
        let mut doc = FormLayout::stand().document(false);
        let untouched = doc.clone();

        assert!(!m.undo(&mut doc).unwrap());
        assert!(!m.redo(&mut doc).unwrap());
        assert_eq!(doc, untouched);

        m.do_command(&mut doc, tally("harmony")).unwrap();
        assert!(!m.redo(&mut doc).unwrap());
        assert_eq!(m.position(), Some(0));
    }

    #[test]
    fn branching_discards_redo_entries() {
        let mut m = manager(TrackId::Teleop);
        let mut doc = FormLayout::stand().document(false);
        for f in ["ampScore", "speakerScore", "trap"] {
            m.do_command(&mut doc, tally(f)).unwrap();
        }
        assert_eq!(m.position(), Some(2));

        m.undo(&mut doc).unwrap();
        m.undo(&mut doc).unwrap();
        assert_eq!(m.position(), Some(0));

        m.do_command(&mut doc, tally("ampMiss")).unwrap();
        assert_eq!(
            doc.history[&TrackId::Teleop].log,
            ["ampScore", "ampMiss"]
        );
        assert_eq!(m.position(), Some(1));
        assert_eq!(doc.counters(TrackId::Teleop).unwrap()["trap"], 0);
    }

    #[test]
    fn position_stays_in_bounds() {
        let mut m = manager(TrackId::Teleop);
        let mut doc = FormLayout::stand().document(false);
        let fields = ["ampScore", "trap", "intakeGround"];

        for step in 0..60_usize {
            match step % 7 {
                0 | 3 | 5 => m.undo(&mut doc).map(|_| ()).unwrap(),
                4 => m.redo(&mut doc).map(|_| ()).unwrap(),
                _ => m.do_command(&mut doc, tally(fields[step % 3])).unwrap(),
            }
            assert!(m.state().applied() <= m.history_len());
            let persisted = &doc.history[&TrackId::Teleop];
            assert!(persisted.position >= -1);
            assert!(persisted.position < i64::try_from(persisted.log.len()).unwrap());
        }
    }

    #[test]
    fn preload_outcome_closes_preload_in_place() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);

        m.do_command(&mut doc, outcome("ampScore")).unwrap();

        assert_eq!(doc.timeline(TrackId::Auto).unwrap(), [scored("0", "ampScore")]);
        assert_eq!(doc.history[&TrackId::Auto].log, ["ampScore"]);
        assert_eq!(m.position(), Some(0));
    }

    #[test]
    fn preload_outcome_is_pinned_ahead_of_earlier_intakes() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);

        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("speakerScore")).unwrap();
        m.do_command(&mut doc, outcome("ampScore")).unwrap();

        assert_eq!(
            doc.timeline(TrackId::Auto).unwrap(),
            [scored("0", "speakerScore"), scored("1", "ampScore")]
        );
        assert_eq!(
            doc.history[&TrackId::Auto].log,
            ["speakerScore", "1", "ampScore"]
        );
        assert_eq!(m.position(), Some(2));
    }

    #[test]
    fn undoing_everything_reopens_the_preload_last() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);
        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("speakerScore")).unwrap();
        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        let full = doc.clone();

        while m.undo(&mut doc).unwrap() {}
        assert_eq!(doc.timeline(TrackId::Auto).unwrap(), [TimelineEntry::preload()]);
        assert_eq!(m.position(), None);

        while m.redo(&mut doc).unwrap() {}
        assert_eq!(doc, full);
    }

    #[test]
    fn rescoring_the_preload_keeps_later_redo_entries() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);
        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        m.do_command(&mut doc, intake("1")).unwrap();
        m.undo(&mut doc).unwrap();
        m.undo(&mut doc).unwrap();

        m.do_command(&mut doc, outcome("speakerMiss")).unwrap();

        assert_eq!(doc.history[&TrackId::Auto].log, ["speakerMiss", "1"]);
        assert_eq!(m.position(), Some(0));
        assert!(m.redo(&mut doc).unwrap());
        assert_eq!(
            doc.timeline(TrackId::Auto).unwrap(),
            [scored("0", "speakerMiss"), TimelineEntry::open("1")]
        );
    }

    #[test]
    fn counter_symmetry_from_any_start() {
        for start in [0, 1, 7] {
            let mut m = manager(TrackId::Teleop);
            let mut doc = FormLayout::stand().document(false);
            if let Some(TrackData::Counters(c)) = doc.track_mut(TrackId::Teleop) {
                c.insert("intakeGround".into(), start);
            }

            m.do_command(&mut doc, tally("intakeGround")).unwrap();
            m.undo(&mut doc).unwrap();

            assert_eq!(doc.counters(TrackId::Teleop).unwrap()["intakeGround"], start);
        }
    }

    #[test]
    fn undo_and_redo_update_the_history_mirror() {
        let mut m = manager(TrackId::Teleop);
        let mut doc = FormLayout::stand().document(false);
        m.do_command(&mut doc, tally("trap")).unwrap();

        m.undo(&mut doc).unwrap();
        assert_eq!(doc.history[&TrackId::Teleop].position, -1);

        m.redo(&mut doc).unwrap();
        assert_eq!(doc.history[&TrackId::Teleop].position, 0);
    }

    #[test]
    fn failed_command_changes_nothing() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(false);
        let before = doc.clone();

        let err = m.do_command(&mut doc, outcome("ampScore")).unwrap_err();

        assert_eq!(err, HistoryError::NoOpenEntry(TrackId::Auto));
        assert_eq!(doc, before);
        assert_eq!(m.history_len(), 0);
    }

    #[test]
    fn notes_use_labels() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);
        assert_eq!(m.undo_note(), None);

        m.do_command(&mut doc, intake("4")).unwrap();
        assert_eq!(m.undo_note().as_deref(), Some("Note 4"));

        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        assert_eq!(m.undo_note().as_deref(), Some("Note 4"));
        assert_eq!(m.redo_note(), None);

        m.undo(&mut doc).unwrap();
        m.undo(&mut doc).unwrap();
        assert_eq!(m.redo_note().as_deref(), Some("Amp Score (Preloaded)"));

        m.redo(&mut doc).unwrap();
        m.redo(&mut doc).unwrap();
        m.do_command(&mut doc, outcome("dropped")).unwrap();
        assert_eq!(m.undo_note().as_deref(), Some("Dropped"));
    }

    #[test]
    fn counter_notes_fall_back_to_field_name() {
        let (mut layout, mut doc) = source_ground();
        layout.labels.clear();
        let mut m = HistoryManager::new(&layout);
        m.do_command(&mut doc, tally("ground")).unwrap();
        assert_eq!(m.undo_note().as_deref(), Some("ground"));
    }

    #[test]
    fn removing_scored_preload_drops_its_log_entry() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);
        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        assert_eq!(m.position(), Some(1));

        m.remove_preloaded_entry(&mut doc).unwrap();

        assert_eq!(doc.timeline(TrackId::Auto).unwrap(), [TimelineEntry::open("1")]);
        assert_eq!(doc.history[&TrackId::Auto].log, ["1"]);
        assert_eq!(m.position(), Some(0));

        // The remaining history still undoes cleanly.
        m.undo(&mut doc).unwrap();
        assert!(doc.timeline(TrackId::Auto).unwrap().is_empty());
    }

    #[test]
    fn removing_unscored_preload_keeps_log() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(true);
        m.do_command(&mut doc, intake("1")).unwrap();

        m.remove_preloaded_entry(&mut doc).unwrap();

        assert_eq!(doc.history[&TrackId::Auto].log, ["1"]);
        assert_eq!(m.position(), Some(0));
    }

    #[test]
    fn preload_add_and_remove_guard_state() {
        let mut m = manager(TrackId::Auto);
        let mut doc = FormLayout::stand().document(false);

        assert_eq!(
            m.remove_preloaded_entry(&mut doc).unwrap_err(),
            HistoryError::PreloadMissing(TrackId::Auto)
        );
        m.add_preloaded_entry(&mut doc).unwrap();
        assert_eq!(
            m.add_preloaded_entry(&mut doc).unwrap_err(),
            HistoryError::PreloadPresent(TrackId::Auto)
        );
        assert_eq!(doc.timeline(TrackId::Auto).unwrap(), [TimelineEntry::preload()]);
    }

    #[test]
    fn preload_on_counter_track_is_a_kind_mismatch() {
        let mut m = manager(TrackId::Teleop);
        let mut doc = FormLayout::stand().document(false);
        let err = m.add_preloaded_entry(&mut doc).unwrap_err();
        assert!(matches!(err, HistoryError::KindMismatch { .. }));
    }

    #[test]
    fn restore_resumes_where_it_left_off() {
        let layout = FormLayout::stand();
        let track = layout.track(TrackId::Auto).unwrap();
        let mut m = HistoryManager::new(track);
        let mut doc = layout.document(true);
        m.do_command(&mut doc, intake("1")).unwrap();
        m.do_command(&mut doc, outcome("ampScore")).unwrap();
        m.undo(&mut doc).unwrap();

        let mut resumed = HistoryManager::restore(track, &doc.history[&TrackId::Auto]).unwrap();
        assert_eq!(resumed.state(), m.state());

        resumed.redo(&mut doc).unwrap();
        assert_eq!(
            doc.timeline(TrackId::Auto).unwrap(),
            [scored("0", "ampScore"), TimelineEntry::open("1")]
        );
    }

    #[test]
    fn restore_rejects_corrupt_position() {
        let layout = FormLayout::stand();
        let persisted = PersistedHistory {
            log: vec!["trap".into()],
            position: 3,
        };
        let err =
            HistoryManager::restore(layout.track(TrackId::Teleop).unwrap(), &persisted).unwrap_err();
        assert!(matches!(err, HistoryError::CorruptHistory { .. }));
    }
}
