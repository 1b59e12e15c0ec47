//! A pure, deterministic Swiss-system (and related-format) chess pairing
//! engine: given a tournament snapshot, produces the next round's pairings,
//! colors, byes, and board numbers, and computes standings with tiebreaks.
//!
//! The engine performs no I/O. Callers implement [`engine::SnapshotSource`]
//! and [`engine::PairingSink`] to bridge to their own persistence layer.

pub mod engine;
pub mod error;
pub mod identifiers;
pub mod pairings;
pub mod players;
pub mod rounds;
pub mod scoring;
pub mod settings;
pub mod state;
pub mod tournament;
pub mod trf;
pub mod validator;

/// The exact-rational type used for scores and tiebreak values throughout
/// the crate, so that standings comparisons never suffer float drift.
pub type r64 = num_rational::Rational64;

pub use error::{PairingError, PairingResult};
