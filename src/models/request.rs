//! Session request model.
//!
//! A session request asks the engine to place one session (a match, a
//! training slot, a doubles game) of a given duration and size. The
//! participants are either fixed up front or drawn from a pool.

use serde::{Deserialize, Serialize};

use super::Minutes;

/// Who plays in a requested session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantSelection {
    /// A specific set of participants (e.g. a scheduled match).
    Fixed(Vec<String>),
    /// Any eligible participants. `pool: None` draws from the whole roster.
    Open {
        /// Restricts candidates to these participant ids.
        pool: Option<Vec<String>>,
    },
}

/// A request to place one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Unique request identifier; becomes the assignment's session id.
    pub id: String,
    /// Number of participants in the session.
    pub participant_count: u32,
    /// Session length (minutes).
    pub duration: Minutes,
    /// Placement priority (higher = placed earlier).
    pub priority: i32,
    /// Tie-break among equal priorities (lower = placed earlier).
    pub seed: u64,
    /// Participant binding.
    pub selection: ParticipantSelection,
}

impl SessionRequest {
    /// Creates an open request drawing from the whole roster.
    pub fn open(id: impl Into<String>, participant_count: u32, duration: Minutes) -> Self {
        Self {
            id: id.into(),
            participant_count,
            duration,
            priority: 0,
            seed: 0,
            selection: ParticipantSelection::Open { pool: None },
        }
    }

    /// Creates a request for a fixed set of participants.
    ///
    /// `participant_count` is set to the number of ids given.
    pub fn fixed<I, S>(id: impl Into<String>, participants: I, duration: Minutes) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = participants.into_iter().map(Into::into).collect();
        Self {
            id: id.into(),
            participant_count: ids.len() as u32,
            duration,
            priority: 0,
            seed: 0,
            selection: ParticipantSelection::Fixed(ids),
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the tie-break seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Restricts an open request to a participant pool.
    ///
    /// Has no effect on fixed requests.
    pub fn with_pool<I, S>(mut self, pool: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ParticipantSelection::Open { .. } = self.selection {
            self.selection = ParticipantSelection::Open {
                pool: Some(pool.into_iter().map(Into::into).collect()),
            };
        }
        self
    }

    /// Fixed participant ids, if this is a fixed request.
    pub fn fixed_participants(&self) -> Option<&[String]> {
        match &self.selection {
            ParticipantSelection::Fixed(ids) => Some(ids),
            ParticipantSelection::Open { .. } => None,
        }
    }

    /// Whether this request draws from a pool.
    pub fn is_open(&self) -> bool {
        matches!(self.selection, ParticipantSelection::Open { .. })
    }
}
