//! Form layout: which tracks a form has and what each track accepts.
//!
//! The layout is the registry history managers are built from. Each track
//! names its kind, the fields (counter names or timeline outcomes) it
//! accepts, and the labels shown for them.

use std::collections::BTreeMap;

use crate::model::{FormDocument, PersistedHistory, TimelineEntry, TrackData, TrackId, TrackKind};

/// One track's configuration.
#[derive(Debug, Clone)]
pub struct TrackLayout {
    pub id: TrackId,
    pub kind: TrackKind,

    /// Counter names for a counters track; accepted outcomes for a timeline.
    pub fields: Vec<String>,

    /// Field name → human-readable label.
    pub labels: BTreeMap<String, String>,
}

impl TrackLayout {
    fn new(id: TrackId, kind: TrackKind, fields: &[(&str, &str)]) -> Self {
        Self {
            id,
            kind,
            fields: fields.iter().map(|(f, _)| (*f).to_string()).collect(),
            labels: fields
                .iter()
                .map(|(f, l)| ((*f).to_string(), (*l).to_string()))
                .collect(),
        }
    }

    pub fn accepts(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// The label for `field`, or the field itself when none is configured.
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map_or(field, String::as_str)
    }

    /// Empty data for this track: zeroed counters or an empty timeline.
    fn empty_data(&self, preloaded: bool) -> TrackData {
        match self.kind {
            TrackKind::Counters => {
                TrackData::Counters(self.fields.iter().map(|f| (f.clone(), 0)).collect())
            }
            TrackKind::Timeline if preloaded => TrackData::Timeline(vec![TimelineEntry::preload()]),
            TrackKind::Timeline => TrackData::Timeline(Vec::new()),
        }
    }
}

/// All tracks of a form.
#[derive(Debug, Clone)]
pub struct FormLayout {
    tracks: Vec<TrackLayout>,
}

impl FormLayout {
    /// The stand-scouting layout for the 2024 game.
    pub fn stand() -> Self {
        let outcomes = [
            ("ampScore", "Amp Score"),
            ("speakerScore", "Speaker Score"),
            ("ampMiss", "Amp Miss"),
            ("speakerMiss", "Speaker Miss"),
            ("dropped", "Dropped"),
        ];
        let teleop = [
            ("intakeSource", "Source Intake"),
            ("intakeGround", "Ground Intake"),
            ("ampScore", "Amp Score"),
            ("speakerScore", "Speaker Score"),
            ("ampMiss", "Amp Miss"),
            ("speakerMiss", "Speaker Miss"),
            ("trap", "Trap"),
        ];
        let endgame = [
            ("climbAttempt", "Climb Attempt"),
            ("climbSuccess", "Climb"),
            ("harmony", "Harmony"),
            ("spotlight", "Spotlight"),
        ];

        Self {
            tracks: vec![
                TrackLayout::new(TrackId::Auto, TrackKind::Timeline, &outcomes),
                TrackLayout::new(TrackId::Teleop, TrackKind::Counters, &teleop),
                TrackLayout::new(TrackId::Endgame, TrackKind::Counters, &endgame),
            ],
        }
    }

    /// Overrides labels on every track that already knows the field.
    #[must_use]
    pub fn with_labels(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for track in &mut self.tracks {
            for (field, label) in overrides {
                if track.accepts(field) {
                    track.labels.insert(field.clone(), label.clone());
                }
            }
        }
        self
    }

    pub fn tracks(&self) -> &[TrackLayout] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackLayout> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// A blank document for this layout, with an open preload on every
    /// timeline track when `preloaded` is set.
    pub fn document(&self, preloaded: bool) -> FormDocument {
        let mut doc = FormDocument::default();
        for track in &self.tracks {
            doc.tracks.insert(track.id, track.empty_data(preloaded));
            doc.history.insert(track.id, PersistedHistory::default());
        }
        doc
    }
}
