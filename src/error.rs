use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::{PlayerId, SectionId};

/// All the errors that can occur while computing pairings or standings.
///
/// The engine never partially commits: every fallible operation returns one
/// of these instead of a partial or duplicated result.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PairingError {
    /// The snapshot handed to the engine was internally contradictory (a
    /// player referenced in two sections, a pairing naming an unknown
    /// player, inconsistent color records, etc).
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// `ContinueToNextRound` was called before every pairing of the current
    /// round had a result or was a bye.
    #[error(
        "round {round} is incomplete in {sections:?} ({missing_count} pairing(s) missing a result)"
    )]
    RoundIncomplete {
        /// The round that was checked
        round: u32,
        /// How many pairings are still missing a result
        missing_count: u32,
        /// The sections that are not yet complete
        sections: Vec<SectionId>,
    },

    /// Pairings for the requested round already exist.
    #[error("round {0} already has pairings")]
    AlreadyPaired(u32),

    /// No legal pairing assignment exists after all transpositions,
    /// resections, and floats have been exhausted.
    #[error("round could not be paired: no legal assignment for bracket {bracket:?} ({reason})")]
    UnpairableRound {
        /// The players of the last bracket the pairer attempted
        bracket: Vec<PlayerId>,
        /// A human-readable description of the constraint that failed
        reason: String,
    },

    /// An internal invariant was violated; indicates a bug in the engine
    /// rather than a problem with the input.
    #[error("internal invariant violated: {message} (bracket: {bracket:?})")]
    InvariantViolation {
        /// Description of the violated invariant
        message: String,
        /// The bracket being processed when the violation was detected
        bracket: Vec<PlayerId>,
    },

    /// The tournament configuration is internally impossible (unknown
    /// tiebreak id, zero-length acceleration window, etc).
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl PairingError {
    pub(crate) fn invariant(message: impl Into<String>, bracket: &[PlayerId]) -> Self {
        PairingError::InvariantViolation {
            message: message.into(),
            bracket: bracket.to_vec(),
        }
    }

    pub(crate) fn unpairable(reason: impl Into<String>, bracket: &[PlayerId]) -> Self {
        PairingError::UnpairableRound {
            bracket: bracket.to_vec(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type PairingResult<T> = Result<T, PairingError>;
