//! Form types: one scout's record of one team in one match.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FormDocument;

/// A stand-scouting form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,

    /// Team number being watched.
    pub team: u32,

    pub match_number: u32,

    /// Who filled in the form.
    pub scouter: String,

    pub created_at: Timestamp,
    pub status: FormStatus,
    pub document: FormDocument,
}

impl Form {
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.status, FormStatus::Editing)
    }

    /// Hands the form in or gives it up. Undo history goes with it; the
    /// recorded tracks stay.
    pub fn close(&mut self, status: FormStatus) {
        self.status = status;
        self.document.discard_history();
    }
}

/// Where a form stands in its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FormStatus {
    /// Still being filled in; history is live.
    Editing,

    /// Handed in. History has been discarded.
    Submitted { submitted_at: Timestamp },

    /// Given up on. History has been discarded.
    Abandoned { abandoned_at: Timestamp },
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitted { .. } => "submitted",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}
