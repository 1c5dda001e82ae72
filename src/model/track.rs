//! Track identifiers: the independently-undoable phases of a match.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One phase of a match, each with its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackId {
    /// Autonomous period: recorded as a timeline of pieces.
    Auto,

    /// Driver-controlled period.
    Teleop,

    /// Final seconds of the match.
    Endgame,
}

impl TrackId {
    pub const ALL: [Self; 3] = [Self::Auto, Self::Teleop, Self::Endgame];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Teleop => "teleop",
            Self::Endgame => "endgame",
        }
    }

    /// Parses the lowercase name used in storage and on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a track stores what happened in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
    /// Named counters, one tally per button press.
    Counters,

    /// Ordered pieces, each opened by an intake and closed by an outcome.
    Timeline,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counters => f.write_str("counters"),
            Self::Timeline => f.write_str("timeline"),
        }
    }
}
