use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Seq};

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    rounds::{FloatDirection, Pairing, RoundState},
};

/// Stores every pairing ever produced, across every round and section of a
/// tournament, and answers the queries the pairer, validator, and round
/// state machine need.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RoundRegistry {
    /// All pairings, keyed by (section, round). Stored as a sequence of
    /// pairs rather than a map, since `(SectionId, u32)` isn't a key a
    /// self-describing format like JSON can use directly.
    #[serde_as(as = "Seq<(_, _)>")]
    pairings: HashMap<(SectionId, u32), Vec<Pairing>>,
    /// Which players floated, and which way, in a given (section, round).
    /// This is bracketing metadata the Dutch pairer produces as a
    /// byproduct; it isn't part of the `Pairing` output entity itself but
    /// is needed by later rounds' floater-policy tie-break (spec.md §4.2
    /// step 6).
    #[serde_as(as = "Seq<(_, _)>")]
    floats: HashMap<(SectionId, u32), HashMap<PlayerId, FloatDirection>>,
}

impl RoundRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        RoundRegistry {
            pairings: HashMap::new(),
            floats: HashMap::new(),
        }
    }

    /// Stores a freshly generated, already-validated set of pairings for a
    /// (section, round). Fails if pairings already exist for that
    /// (section, round) — the idempotence contract of spec.md §5 requires
    /// callers to check `has_pairings` first.
    pub fn store(&mut self, section: SectionId, round: u32, pairings: Vec<Pairing>) -> Result<(), PairingError> {
        if self.has_pairings(section, round) {
            return Err(PairingError::AlreadyPaired(round));
        }
        self.pairings.insert((section, round), pairings);
        Ok(())
    }

    /// Records which players floated (and which way) while pairing
    /// (section, round). Called by the Dutch pairer immediately after
    /// `store`.
    pub fn record_floats(
        &mut self,
        section: SectionId,
        round: u32,
        floats: HashMap<PlayerId, FloatDirection>,
    ) {
        self.floats.insert((section, round), floats);
    }

    /// A player's float history in `section`, strictly before `round`, in
    /// ascending round order.
    pub fn float_history(&self, section: SectionId, player: PlayerId, round: u32) -> Vec<(u32, FloatDirection)> {
        let mut out: Vec<(u32, FloatDirection)> = self
            .floats
            .iter()
            .filter(|((s, r), _)| *s == section && *r < round)
            .filter_map(|((_, r), m)| m.get(&player).map(|d| (*r, *d)))
            .collect();
        out.sort_by_key(|(r, _)| *r);
        out
    }

    /// Whether any pairings exist for (section, round).
    pub fn has_pairings(&self, section: SectionId, round: u32) -> bool {
        self.pairings
            .get(&(section, round))
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// The pairings for exactly (section, round), if any.
    pub fn pairings_for(&self, section: SectionId, round: u32) -> &[Pairing] {
        self.pairings
            .get(&(section, round))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A mutable view of the pairings for (section, round), used to record
    /// results as they come in.
    pub fn pairings_for_mut(&mut self, section: SectionId, round: u32) -> &mut Vec<Pairing> {
        self.pairings.entry((section, round)).or_default()
    }

    /// All pairings for `section` in rounds strictly before `round`, in
    /// ascending round order — the input spec.md §4.1 hands to the
    /// player-state builder.
    pub fn pairings_before(&self, section: SectionId, round: u32) -> Vec<&Pairing> {
        let mut out: Vec<&Pairing> = self
            .pairings
            .iter()
            .filter(|((s, r), _)| *s == section && *r < round)
            .flat_map(|(_, ps)| ps.iter())
            .collect();
        out.sort_by_key(|p| p.round);
        out
    }

    /// The round-completion state of (section, round).
    pub fn state(&self, section: SectionId, round: u32) -> RoundState {
        RoundState::from_pairings(self.pairings_for(section, round))
    }

    /// The highest round number for which `section` has any pairings, if
    /// any.
    pub fn latest_round(&self, section: SectionId) -> Option<u32> {
        self.pairings
            .keys()
            .filter(|(s, _)| *s == section)
            .map(|(_, r)| *r)
            .max()
    }
}
