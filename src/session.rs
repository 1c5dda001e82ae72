//! Form sessions: one document and a history manager per track.
//!
//! A session is what a scout edits between opening a form and handing it in.
//! Every successful mutation is published to an optional observer with the
//! updated document, whichever of do, undo, or redo caused it.

use std::collections::BTreeMap;

use crate::history::{HistoryError, HistoryManager, Result};
use crate::layout::FormLayout;
use crate::model::{FormDocument, HistoryEntry, TrackId};

type Observer = Box<dyn FnMut(&FormDocument)>;

/// An open form: its document plus the history of each track.
pub struct FormSession {
    document: FormDocument,
    managers: BTreeMap<TrackId, HistoryManager>,
    observer: Option<Observer>,
}

impl FormSession {
    /// Opens a session over `document`, resuming each track from the
    /// history mirror the document carries.
    pub fn open(layout: &FormLayout, document: FormDocument) -> Result<Self> {
        let mut managers = BTreeMap::new();
        for track in layout.tracks() {
            let manager = match document.history.get(&track.id) {
                Some(persisted) => HistoryManager::restore(track, persisted)?,
                None => HistoryManager::new(track),
            };
            managers.insert(track.id, manager);
        }
        Ok(Self {
            document,
            managers,
            observer: None,
        })
    }

    /// Calls `observer` with the document after every change.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&FormDocument) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn into_document(self) -> FormDocument {
        self.document
    }

    pub fn manager(&self, track: TrackId) -> Option<&HistoryManager> {
        self.managers.get(&track)
    }

    pub fn apply(&mut self, track: TrackId, entry: HistoryEntry) -> Result<()> {
        let manager = Self::manager_mut(&mut self.managers, track)?;
        manager.do_command(&mut self.document, entry)?;
        self.publish();
        Ok(())
    }

    /// Returns `false` when the track had nothing to undo.
    pub fn undo(&mut self, track: TrackId) -> Result<bool> {
        let manager = Self::manager_mut(&mut self.managers, track)?;
        let changed = manager.undo(&mut self.document)?;
        if changed {
            self.publish();
        }
        Ok(changed)
    }

    /// Returns `false` when the track had nothing to redo.
    pub fn redo(&mut self, track: TrackId) -> Result<bool> {
        let manager = Self::manager_mut(&mut self.managers, track)?;
        let changed = manager.redo(&mut self.document)?;
        if changed {
            self.publish();
        }
        Ok(changed)
    }

    pub fn add_preload(&mut self, track: TrackId) -> Result<()> {
        let manager = Self::manager_mut(&mut self.managers, track)?;
        manager.add_preloaded_entry(&mut self.document)?;
        self.publish();
        Ok(())
    }

    pub fn remove_preload(&mut self, track: TrackId) -> Result<()> {
        let manager = Self::manager_mut(&mut self.managers, track)?;
        manager.remove_preloaded_entry(&mut self.document)?;
        self.publish();
        Ok(())
    }

    fn manager_mut(
        managers: &mut BTreeMap<TrackId, HistoryManager>,
        track: TrackId,
    ) -> Result<&mut HistoryManager> {
        managers
            .get_mut(&track)
            .ok_or(HistoryError::UnknownTrack(track))
    }

    fn publish(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::model::{PersistedHistory, TimelineEntry};

    fn open(preloaded: bool) -> FormSession {
        let layout = FormLayout::stand();
        let doc = layout.document(preloaded);
        FormSession::open(&layout, doc).unwrap()
    }

    #[test]
    fn tracks_are_independent() {
        let mut session = open(false);
        session
            .apply(TrackId::Teleop, HistoryEntry::Tally("ampScore".into()))
            .unwrap();
        session
            .apply(TrackId::Endgame, HistoryEntry::Tally("harmony".into()))
            .unwrap();

        assert!(session.undo(TrackId::Teleop).unwrap());

        let doc = session.document();
        assert_eq!(doc.counters(TrackId::Teleop).unwrap()["ampScore"], 0);
        assert_eq!(doc.counters(TrackId::Endgame).unwrap()["harmony"], 1);
        assert_eq!(session.manager(TrackId::Endgame).unwrap().position(), Some(0));
    }

    #[test]
    fn observer_sees_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut session = open(true).with_observer(move |doc| {
            sink.borrow_mut().push(doc.history[&TrackId::Auto].position);
        });

        session
            .apply(TrackId::Auto, HistoryEntry::Outcome("ampScore".into()))
            .unwrap();
        session.undo(TrackId::Auto).unwrap();
        session.redo(TrackId::Auto).unwrap();
        // Nothing left to redo: no notification.
        session.redo(TrackId::Auto).unwrap();

        assert_eq!(*seen.borrow(), vec![0_i64, -1, 0]);
    }

    #[test]
    fn failed_apply_does_not_notify() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        let mut session = open(false).with_observer(move |_| *sink.borrow_mut() += 1);

        let err = session
            .apply(TrackId::Auto, HistoryEntry::Outcome("ampScore".into()))
            .unwrap_err();

        assert_eq!(err, HistoryError::NoOpenEntry(TrackId::Auto));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn reopening_resumes_history() {
        let layout = FormLayout::stand();
        let mut session = open(false);
        session
            .apply(TrackId::Auto, HistoryEntry::Intake("2".into()))
            .unwrap();
        session
            .apply(TrackId::Auto, HistoryEntry::Outcome("speakerScore".into()))
            .unwrap();
        session.undo(TrackId::Auto).unwrap();

        let json = serde_json::to_string(&session.into_document()).unwrap();
        let doc: FormDocument = serde_json::from_str(&json).unwrap();
        let mut resumed = FormSession::open(&layout, doc).unwrap();

        assert_eq!(
            resumed.manager(TrackId::Auto).unwrap().redo_note().as_deref(),
            Some("Speaker Score")
        );
        assert!(resumed.redo(TrackId::Auto).unwrap());
        assert_eq!(
            resumed.document().timeline(TrackId::Auto).unwrap(),
            [TimelineEntry {
                piece_id: "2".into(),
                scored_as: Some("speakerScore".into()),
            }]
        );
    }

    #[test]
    fn open_rejects_corrupt_history() {
        let layout = FormLayout::stand();
        let mut doc = layout.document(false);
        doc.history.insert(
            TrackId::Teleop,
            PersistedHistory {
                log: vec![],
                position: 0,
            },
        );
        assert!(matches!(
            FormSession::open(&layout, doc),
            Err(HistoryError::CorruptHistory { .. })
        ));
    }

    #[test]
    fn open_without_history_starts_fresh() {
        let layout = FormLayout::stand();
        let mut doc = layout.document(true);
        doc.discard_history();
        let mut session = FormSession::open(&layout, doc).unwrap();

        session.remove_preload(TrackId::Auto).unwrap();
        session.add_preload(TrackId::Auto).unwrap();
        assert_eq!(
            session.document().timeline(TrackId::Auto).unwrap(),
            [TimelineEntry::preload()]
        );
        assert_eq!(session.manager(TrackId::Auto).unwrap().history_len(), 0);
    }
}
