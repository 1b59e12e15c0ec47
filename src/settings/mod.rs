use serde::{Deserialize, Serialize};

mod pairing;
mod scoring;

pub use pairing::{AccelerationSettings, AccelerationType, ByeSettings, PairingCommonSettings};
pub use scoring::ScoringSettings;

use crate::scoring::TiebreakId;

/// Selects the pairing variant of spec.md §4.7, dispatched on by
/// `pairings::PairingEngine`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentFormat {
    /// The Dutch Swiss-system pairer (spec.md §4.2). "accelerated-swiss" is
    /// this same variant with `AccelerationSettings::enabled` set.
    Swiss,
    /// A round-robin (Berger) schedule (spec.md §4.7).
    RoundRobin,
    /// A single-elimination bracket (spec.md §4.7).
    SingleElimination,
    /// Groups-of-four round robins (spec.md §4.7).
    Quad,
    /// Team Swiss: team-level Swiss pairing plus per-board pairing inside
    /// each match (spec.md §4.7).
    TeamSwiss,
}

/// Settings specific to the quad variant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadSettings {
    /// The number of players per quad group, normally 4.
    pub group_size: u32,
    /// Whether players left over from an incomplete final quad are
    /// cross-paired against players from other quads rather than each
    /// receiving a bye. Defaults to `false` per spec.md's open question.
    pub cross_group_pairings: bool,
}

impl Default for QuadSettings {
    fn default() -> Self {
        QuadSettings {
            group_size: 4,
            cross_group_pairings: false,
        }
    }
}

/// Validator warning thresholds (spec.md §4.9).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorSettings {
    /// A pairing with a rating gap larger than this (in either direction)
    /// produces a warning rather than an error.
    pub rating_gap_warning: u32,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        ValidatorSettings {
            rating_gap_warning: 400,
        }
    }
}

/// The full configuration surface enumerated in spec.md §6.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Selects the pairing variant
    pub format: TournamentFormat,
    /// Acceleration settings (spec.md §4.6)
    pub acceleration: AccelerationSettings,
    /// The ordered list of tiebreak ids applied lexicographically
    pub tiebreak_order: Vec<TiebreakId>,
    /// Bye-related settings (spec.md §4.4)
    pub bye_settings: ByeSettings,
    /// Point awards for win/draw/loss
    pub scoring: ScoringSettings,
    /// Upper bound on brute-force transposition search (spec.md §4.2)
    pub transposition_limit: usize,
    /// Settings specific to the quad variant
    pub quad: QuadSettings,
    /// Validator warning thresholds
    pub validator: ValidatorSettings,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            format: TournamentFormat::Swiss,
            acceleration: AccelerationSettings::default(),
            tiebreak_order: vec![
                TiebreakId::ModifiedBuchholz,
                TiebreakId::SonnebornBerger,
                TiebreakId::Cumulative,
                TiebreakId::DirectEncounter,
            ],
            bye_settings: ByeSettings::default(),
            scoring: ScoringSettings::default(),
            transposition_limit: 8,
            quad: QuadSettings::default(),
            validator: ValidatorSettings::default(),
        }
    }
}

impl TournamentConfig {
    /// Validates that the configuration is internally consistent, returning
    /// a `ConfigurationError` describing the first problem found.
    pub fn validate(&self) -> Result<(), crate::error::PairingError> {
        use crate::error::PairingError;
        if self.transposition_limit == 0 {
            return Err(PairingError::ConfigurationError(
                "transposition_limit must be at least 1".into(),
            ));
        }
        if self.quad.group_size < 2 {
            return Err(PairingError::ConfigurationError(
                "quad.group_size must be at least 2".into(),
            ));
        }
        self.acceleration.validate()?;
        Ok(())
    }
}
