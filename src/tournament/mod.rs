//! The tournament and section entities (spec.md §3's `Tournament`).

use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{SectionId, TournamentId},
    settings::TournamentConfig,
};

mod tournament_status;
pub use tournament_status::TournamentStatus;

/// A single section of a tournament: its own player pool, round count, and
/// pairing history, sharing the parent tournament's format and
/// configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// This section's id
    pub id: SectionId,
    /// The tournament this section belongs to
    pub tournament: TournamentId,
    /// A human-readable name (e.g. "Open", "U1800")
    pub name: String,
}

impl Section {
    /// Creates a new, empty section.
    pub fn new(tournament: TournamentId, name: impl Into<String>) -> Self {
        Section {
            id: uuid::Uuid::new_v4().into(),
            tournament,
            name: name.into(),
        }
    }
}

/// The tournament snapshot entity of spec.md §3: everything the engine
/// needs about the event itself, independent of the players and pairings
/// living inside its sections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    /// The tournament's id
    pub id: TournamentId,
    /// A human-readable name
    pub name: String,
    /// The tournament's lifecycle status
    pub status: TournamentStatus,
    /// The total number of rounds scheduled
    pub total_rounds: u32,
    /// The highest round number that has been paired so far (0 before the
    /// first round is paired)
    pub current_round: u32,
    /// The sections that make up this tournament
    pub sections: Vec<SectionId>,
    /// Format, acceleration, tiebreak order, bye/scoring settings, and
    /// validator thresholds (spec.md §6)
    pub config: TournamentConfig,
}

impl Tournament {
    /// Creates a new, unstarted tournament with a single default section.
    pub fn new(name: impl Into<String>, total_rounds: u32, config: TournamentConfig) -> Self {
        Tournament {
            id: uuid::Uuid::new_v4().into(),
            name: name.into(),
            status: TournamentStatus::Planned,
            total_rounds,
            current_round: 0,
            sections: Vec::new(),
            config,
        }
    }

    /// Whether the tournament accepts further pairing/result operations.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.status,
            TournamentStatus::Frozen | TournamentStatus::Ended | TournamentStatus::Cancelled
        )
    }

    /// Whether every scheduled round has been paired.
    pub fn is_finished_pairing(&self) -> bool {
        self.current_round >= self.total_rounds
    }
}
