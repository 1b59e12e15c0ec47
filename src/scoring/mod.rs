use serde::{Deserialize, Serialize};

use crate::{identifiers::PlayerId, r64};

mod standard_scoring;

pub use standard_scoring::{build_histories, compute_standings, GameKind, GameRecord};

/// The seven tiebreaks of spec.md §4.8.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TiebreakId {
    /// Sum of opponent points
    Buchholz,
    /// Buchholz minus the single lowest opponent score
    BuchholzCut1,
    /// Sum of opponent points weighted by the result achieved against them
    SonnebornBerger,
    /// Sum of the running score after each round
    Cumulative,
    /// Head-to-head result against each tied player
    DirectEncounter,
    /// Average opponent rating adjusted by score rate
    PerformanceRating,
    /// Buchholz with the single lowest-scoring opponent excluded
    ModifiedBuchholz,
}

/// A single row of a standings table: a player's total score plus every
/// configured tiebreak value, in the configured order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    /// The player this row describes
    pub player: PlayerId,
    /// Total points, from awarded results only
    pub points: r64,
    /// Tiebreak values, in the tournament's configured order
    pub tiebreaks: Vec<(TiebreakId, r64)>,
}

/// An ordered standings table: index 0 is first place. Ties are broken by
/// cascading through `tiebreaks` in order, then by ascending player id
/// (spec.md's universal determinism rule).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsTable {
    /// Rows, already sorted best-to-worst.
    pub rows: Vec<StandingsRow>,
}

impl StandingsTable {
    /// The 1-based rank of `player`, if present.
    pub fn rank_of(&self, player: PlayerId) -> Option<usize> {
        self.rows.iter().position(|r| r.player == player).map(|i| i + 1)
    }
}
