//! The five external operations of spec.md §6, and the collaborator traits
//! that bind the pure core to a caller's own persistence layer.
//!
//! `PairingEngine` is a zero-sized dispatch type: every operation takes a
//! `&Snapshot` (or the pieces of one) directly and performs no I/O itself.
//! Fetching a snapshot and persisting its result are entirely the caller's
//! responsibility, via `SnapshotSource`/`PairingSink`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::PairingError,
    identifiers::{SectionId, TournamentId},
    pairings::generate_section_pairings,
    players::PlayerRegistry,
    rounds::{ByeType, Pairing, RoundRegistry, RoundState},
    scoring::{compute_standings, StandingsTable, TiebreakId},
    state::PlayerStateBuilder,
    tournament::Tournament,
    validator::{self, ValidationReport},
};

/// Everything the engine needs to pair a round or compute standings: the
/// tournament's own record plus every player and every pairing produced so
/// far, across all its sections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The tournament's own metadata and configuration
    pub tournament: Tournament,
    /// Every player registered to any section of the tournament
    pub players: PlayerRegistry,
    /// Every pairing produced so far, across all sections and rounds
    pub rounds: RoundRegistry,
}

/// One section's slice of a freshly produced pairing set, with the bye
/// counts spec.md §6's `GeneratePairings` post-condition requires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SectionPairings {
    /// The section these pairings belong to
    pub section: SectionId,
    /// The pairings themselves
    pub pairings: Vec<Pairing>,
    /// How many byes of each type were given out in this section
    pub bye_counts: HashMap<ByeType, u32>,
}

/// The full, section-partitioned result of a pairing computation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PairingSet {
    /// The round these pairings are for
    pub round: u32,
    /// One entry per section of the tournament
    pub sections: Vec<SectionPairings>,
}

impl PairingSet {
    /// All pairings across every section, in section-declaration order.
    pub fn all_pairings(&self) -> impl Iterator<Item = &Pairing> {
        self.sections.iter().flat_map(|s| s.pairings.iter())
    }
}

/// The result of `IsRoundComplete`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RoundCompleteness {
    /// Whether every section of the tournament has finished the round
    pub complete: bool,
    /// The sections that are not yet complete
    pub incomplete_by_section: Vec<SectionId>,
}

/// Loads a `Snapshot` for a tournament, round, at the start of a pairing
/// operation. Supplied by the caller; the engine performs no I/O of its own.
pub trait SnapshotSource {
    /// Loads the current state of `tournament` as of `round`.
    fn load_snapshot(&self, tournament: TournamentId, round: u32) -> Result<Snapshot, PairingError>;
}

/// Persists a freshly produced, already-validated `PairingSet`. Supplied by
/// the caller; must be atomic per spec.md §5 ("either all pairings for the
/// round/section are stored, or none").
pub trait PairingSink {
    /// Persists `pairings`.
    fn persist_pairings(&mut self, pairings: &PairingSet) -> Result<(), PairingError>;
}

/// A zero-sized dispatch type exposing the five operations of spec.md §6.
pub struct PairingEngine;

impl PairingEngine {
    /// Produces the full section-partitioned pairing set for `round`.
    /// Pre: results for rounds < `round` are complete; `round` has no
    /// existing pairings in any section. Post: the returned set validates.
    pub fn generate_pairings(snapshot: &Snapshot, round: u32) -> Result<PairingSet, PairingError> {
        snapshot.tournament.config.validate()?;

        let mut sections = Vec::with_capacity(snapshot.tournament.sections.len());
        for &section in &snapshot.tournament.sections {
            if snapshot.rounds.has_pairings(section, round) {
                return Err(PairingError::AlreadyPaired(round));
            }

            let (pairings, floats) = generate_section_pairings(
                &snapshot.players,
                &snapshot.rounds,
                section,
                round,
                &snapshot.tournament.config,
            )?;

            let states = PlayerStateBuilder::build(
                &snapshot.players,
                &snapshot.rounds,
                section,
                round,
                &snapshot.tournament.config.scoring,
                &snapshot.tournament.config.bye_settings,
            )?;
            let report = validator::validate(
                &pairings,
                &snapshot.players,
                &states,
                &snapshot.tournament.config.validator,
            );
            if !report.is_valid() {
                return Err(PairingError::invariant(
                    format!("generated pairings failed validation: {:?}", report.errors),
                    &pairings.iter().flat_map(|p| p.players()).collect::<Vec<_>>(),
                ));
            }

            let mut bye_counts: HashMap<ByeType, u32> = HashMap::new();
            for pairing in &pairings {
                if let Some(bye_type) = pairing.bye_type {
                    *bye_counts.entry(bye_type).or_default() += 1;
                }
            }
            let _ = floats; // recorded by the caller via PairingSink + RoundRegistry::record_floats

            sections.push(SectionPairings {
                section,
                pairings,
                bye_counts,
            });
        }

        Ok(PairingSet { round, sections })
    }

    /// Reports whether every section of the tournament has finished
    /// `round` (every pairing has a result, or is a bye).
    pub fn is_round_complete(snapshot: &Snapshot, round: u32) -> RoundCompleteness {
        let mut incomplete_by_section = Vec::new();
        for &section in &snapshot.tournament.sections {
            if snapshot.rounds.state(section, round) != RoundState::Complete {
                incomplete_by_section.push(section);
            }
        }
        RoundCompleteness {
            complete: incomplete_by_section.is_empty(),
            incomplete_by_section,
        }
    }

    /// The composed gate: checks `current_round` is complete everywhere,
    /// then generates pairings for the round after it.
    pub fn continue_to_next_round(
        snapshot: &Snapshot,
        current_round: u32,
    ) -> Result<PairingSet, PairingError> {
        let completeness = Self::is_round_complete(snapshot, current_round);
        if !completeness.complete {
            return Err(PairingError::RoundIncomplete {
                round: current_round,
                missing_count: completeness.incomplete_by_section.len() as u32,
                sections: completeness.incomplete_by_section,
            });
        }
        Self::generate_pairings(snapshot, current_round + 1)
    }

    /// Computes the standings table for a single section.
    pub fn compute_standings(
        snapshot: &Snapshot,
        section: SectionId,
        tiebreak_order: &[TiebreakId],
    ) -> StandingsTable {
        compute_standings(
            &snapshot.players,
            &snapshot.rounds,
            section,
            tiebreak_order,
            &snapshot.tournament.config.scoring,
            &snapshot.tournament.config.bye_settings,
        )
    }

    /// Validates an already-produced pairing set against every invariant of
    /// spec.md §4.9, per section.
    pub fn validate_pairings(pairing_set: &PairingSet, snapshot: &Snapshot) -> Result<ValidationReport, PairingError> {
        let mut combined = ValidationReport::default();
        for section_pairings in &pairing_set.sections {
            let states = PlayerStateBuilder::build(
                &snapshot.players,
                &snapshot.rounds,
                section_pairings.section,
                pairing_set.round,
                &snapshot.tournament.config.scoring,
                &snapshot.tournament.config.bye_settings,
            )?;
            let report = validator::validate(
                &section_pairings.pairings,
                &snapshot.players,
                &states,
                &snapshot.tournament.config.validator,
            );
            combined.errors.extend(report.errors);
            combined.warnings.extend(report.warnings);
        }
        Ok(combined)
    }
}
