use serde::{Deserialize, Serialize};

use crate::{error::PairingError, r64};

/// The four acceleration schemes of spec.md §4.6.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelerationType {
    /// Top half +1 point for round 1; +0.5 for round 2; 0 thereafter.
    Standard,
    /// Top half +1 point for the configured window, constant.
    AddedScore,
    /// Top sixth +1 in round 1, top third +0.5 in round 2.
    Sixths,
    /// A constant added score applied every round.
    AllRounds,
}

/// Acceleration settings (spec.md §4.6). Acceleration modifies *effective*
/// score used only for bracketing; it never changes real standings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelerationSettings {
    /// Whether acceleration is active at all.
    pub enabled: bool,
    /// Which scheme is used.
    pub accel_type: AccelerationType,
    /// How many early rounds acceleration applies to (ignored by
    /// `Standard`, which has its own fixed round-1/round-2 taper).
    pub rounds: u32,
    /// The round index at which the scheme's taper changes (e.g. the round
    /// after which `Standard` stops adding anything). Configurable per
    /// spec.md §11's supplemented `breakPoint` detail.
    pub break_point: u32,
    /// The constant bonus used by `AddedScore` and `AllRounds`.
    pub added_score: r64,
}

impl Default for AccelerationSettings {
    fn default() -> Self {
        AccelerationSettings {
            enabled: false,
            accel_type: AccelerationType::Standard,
            rounds: 2,
            break_point: 2,
            added_score: r64::from_integer(1),
        }
    }
}

impl AccelerationSettings {
    /// Validates the acceleration configuration. `rounds = 0` is accepted
    /// even while `enabled`: it is a legitimate degenerate configuration
    /// (spec.md §8's R2 relies on "enabled with rounds=0" producing pairings
    /// identical to disabled acceleration for the `AddedScore`/`Sixths`/
    /// `AllRounds` schemes).
    pub fn validate(&self) -> Result<(), PairingError> {
        Ok(())
    }
}

/// Bye-related settings (spec.md §4.4 and §6).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByeSettings {
    /// If `false`, pairing-allocated byes are worth 0.5 instead of 1.0.
    pub full_point_pairing_bye: bool,
    /// Prefer the lowest-rated *rated* player as the bye/float candidate
    /// over an unrated player, when both are eligible.
    pub avoid_unrated_dropping: bool,
}

impl Default for ByeSettings {
    fn default() -> Self {
        ByeSettings {
            full_point_pairing_bye: true,
            avoid_unrated_dropping: true,
        }
    }
}

/// Settings common to every pairing style (spec.md §6's `transpositionLimit`
/// and similar knobs that apply regardless of `TournamentFormat`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingCommonSettings {
    /// Upper bound on brute-force permutation of S2 before falling back to
    /// the matching-based search (spec.md §4.2).
    pub transposition_limit: usize,
}

impl Default for PairingCommonSettings {
    fn default() -> Self {
        PairingCommonSettings {
            transposition_limit: 8,
        }
    }
}
