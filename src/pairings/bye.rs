//! Bye allocation (spec.md §4.4 and §4.2 steps 1 & 4).

use tracing::warn;

use crate::{
    error::PairingError,
    identifiers::PlayerId,
    players::{PlayerRegistry, PlayerStatus},
    rounds::ByeType,
    settings::ByeSettings,
    state::PlayerState,
};

/// The result of partitioning a section's bracketable pool into byes and
/// the remainder to be bracketed and paired.
pub struct ByePartition {
    /// Players receiving a half-point requested bye this round
    pub requested: Vec<PlayerId>,
    /// Players receiving a zero-point inactive bye this round
    pub inactive: Vec<PlayerId>,
    /// The player chosen for the odd-pool pairing-allocated bye, if any
    pub pairing_allocated: Option<PlayerId>,
    /// The states remaining to be bracketed and paired
    pub pool: Vec<PlayerState>,
}

/// Partitions `states` (already filtered to non-withdrawn players) into
/// byes and a bracketable remainder.
pub fn allocate_byes(
    states: Vec<PlayerState>,
    players: &PlayerRegistry,
    round: u32,
    bye_settings: &ByeSettings,
) -> Result<ByePartition, PairingError> {
    let mut requested = Vec::new();
    let mut inactive = Vec::new();
    let mut pool = Vec::new();

    for state in states {
        let player = players.get(&state.player)?;
        if player.status == PlayerStatus::Inactive {
            inactive.push(state.player);
        } else if player.has_requested_bye(round) {
            requested.push(state.player);
        } else {
            pool.push(state);
        }
    }

    let pairing_allocated = if pool.len() % 2 == 1 {
        Some(pick_pairing_allocated_bye(&mut pool, bye_settings)?)
    } else {
        None
    };

    Ok(ByePartition {
        requested,
        inactive,
        pairing_allocated,
        pool,
    })
}

/// Picks, and removes from `pool`, the recipient of the odd-pool
/// pairing-allocated-full bye: the lowest-rated eligible player in the
/// lowest-scoring bracket, unrated players dropped last when
/// `avoid_unrated_dropping` is set. If every player in `pool` has already
/// received one, eligibility resets across the whole pool and the event is
/// logged.
fn pick_pairing_allocated_bye(
    pool: &mut Vec<PlayerState>,
    bye_settings: &ByeSettings,
) -> Result<PlayerId, PairingError> {
    if pool.is_empty() {
        return Err(PairingError::invariant(
            "pairing-allocated bye requested on an empty pool",
            &[],
        ));
    }

    let lowest_score = pool
        .iter()
        .map(|s| s.effective_score())
        .min()
        .expect("pool is non-empty");
    let lowest_bracket: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, s)| s.effective_score() == lowest_score)
        .map(|(i, _)| i)
        .collect();

    let mut candidates: Vec<usize> = lowest_bracket
        .iter()
        .copied()
        .filter(|&i| !pool[i].had_pairing_allocated_bye)
        .collect();

    if candidates.is_empty() {
        warn!(
            pool_size = pool.len(),
            "every candidate in the lowest bracket already holds a pairing-allocated bye; resetting eligibility across the full pool"
        );
        candidates = (0..pool.len())
            .filter(|&i| !pool[i].had_pairing_allocated_bye)
            .collect();
        if candidates.is_empty() {
            candidates = (0..pool.len()).collect();
        }
    }

    candidates.sort_by(|&i, &j| {
        let a = &pool[i];
        let b = &pool[j];
        if bye_settings.avoid_unrated_dropping {
            let a_unrated = a.rating == 0;
            let b_unrated = b.rating == 0;
            if a_unrated != b_unrated {
                // Unrated is sorted last (i.e. not preferred as the float
                // candidate) when dropping should be avoided for them.
                return a_unrated.cmp(&b_unrated);
            }
        }
        a.rating.cmp(&b.rating).then_with(|| a.player.cmp(&b.player))
    });

    let chosen_index = candidates[0];
    let chosen = pool.remove(chosen_index);
    Ok(chosen.player)
}

/// The bye type that corresponds to each partition bucket, for constructing
/// the output `Pairing`.
pub fn bye_type_for_bucket(bucket: ByeBucket) -> ByeType {
    match bucket {
        ByeBucket::Requested => ByeType::RequestedHalf,
        ByeBucket::Inactive => ByeType::InactiveZero,
        ByeBucket::PairingAllocated => ByeType::PairingAllocatedFull,
    }
}

/// Identifies which bye bucket a player fell into, for labeling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByeBucket {
    /// Pre-requested half-point bye
    Requested,
    /// Zero-point inactive bye
    Inactive,
    /// Pairer-assigned full-point bye
    PairingAllocated,
}
