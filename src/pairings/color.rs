//! Color assignment cascade (spec.md §4.3).

use crate::{identifiers::PlayerId, rounds::Color, state::PlayerState};

/// Assigns white/black to a candidate pair, following the seven-step
/// cascade. `s1_is_a` and `board_index` are only consulted at step 6, when
/// neither player holds any color preference at all: `board_index` is the
/// pair's 1-based position within its bracket, and `s1_is_a` says which of
/// `a`/`b` came from the upper half (S1) of the split.
pub fn assign_colors(
    a: &PlayerState,
    b: &PlayerState,
    s1_is_a: bool,
    board_index: usize,
) -> (PlayerId, PlayerId) {
    let a_abs = a.absolute_color_preference();
    let b_abs = b.absolute_color_preference();

    if let (Some(wanted), None) = (a_abs, b_abs) {
        return ordered(a, b, wanted);
    }
    if let (None, Some(wanted)) = (a_abs, b_abs) {
        return ordered(b, a, wanted);
    }
    if let (Some(wa), Some(wb)) = (a_abs, b_abs) {
        if wa != wb {
            return ordered(a, b, wa);
        }
        return resolve_conflict(a, b, wa);
    }

    let a_strong = a.strong_color_preference();
    let b_strong = b.strong_color_preference();
    if let (Some(wanted), None) = (a_strong, b_strong) {
        return ordered(a, b, wanted);
    }
    if let (None, Some(wanted)) = (a_strong, b_strong) {
        return ordered(b, a, wanted);
    }
    if let (Some(wa), Some(wb)) = (a_strong, b_strong) {
        if wa != wb {
            return ordered(a, b, wa);
        }
        return resolve_conflict(a, b, wa);
    }

    let a_mild = a.mild_color_preference();
    let b_mild = b.mild_color_preference();
    if let (Some(wanted), None) = (a_mild, b_mild) {
        return ordered(a, b, wanted);
    }
    if let (None, Some(wanted)) = (a_mild, b_mild) {
        return ordered(b, a, wanted);
    }
    if let (Some(wa), Some(wb)) = (a_mild, b_mild) {
        if wa != wb {
            return ordered(a, b, wa);
        }
        return resolve_conflict(a, b, wa);
    }

    // Neither player has any preference: Dutch default is that S1 takes
    // white on odd board indices, black on even.
    let s1_wants_white = board_index % 2 == 1;
    let s1 = if s1_is_a { a } else { b };
    let s2 = if s1_is_a { b } else { a };
    if s1_wants_white {
        ordered(s1, s2, Color::White)
    } else {
        ordered(s2, s1, Color::White)
    }
}

/// Returns `(white, black)` given which color `preferring` wants.
fn ordered(preferring: &PlayerState, other: &PlayerState, wanted: Color) -> (PlayerId, PlayerId) {
    match wanted {
        Color::White => (preferring.player, other.player),
        Color::Black => (other.player, preferring.player),
    }
}

/// Resolves a conflict where both players want the same color `wanted`,
/// per spec.md §4.3 step 3's tie-break cascade.
fn resolve_conflict(a: &PlayerState, b: &PlayerState, wanted: Color) -> (PlayerId, PlayerId) {
    let a_mag = a.color_imbalance.abs();
    let b_mag = b.color_imbalance.abs();
    if a_mag != b_mag {
        let winner = if a_mag > b_mag { a } else { b };
        let loser = if a_mag > b_mag { b } else { a };
        return ordered(winner, loser, wanted);
    }

    if let Some((winner, loser)) = earliest_differing_round_winner(a, b, wanted) {
        return ordered(winner, loser, wanted);
    }

    if a.rating != b.rating {
        let winner = if a.rating > b.rating { a } else { b };
        let loser = if a.rating > b.rating { b } else { a };
        return ordered(winner, loser, wanted);
    }

    if a.player < b.player {
        (a.player, b.player)
    } else {
        (b.player, a.player)
    }
}

/// Finds the earliest game at which `a` and `b` held different colors, and
/// grants each the color opposite to what they held then — resolved by
/// index position within the (chronological) `colors_played` sequence,
/// since past games are already stored in ascending round order.
fn earliest_differing_round_winner<'a>(
    a: &'a PlayerState,
    b: &'a PlayerState,
    wanted: Color,
) -> Option<(&'a PlayerState, &'a PlayerState)> {
    let shared = a.colors_played.len().min(b.colors_played.len());
    for i in 0..shared {
        let ca = a.colors_played[i];
        let cb = b.colors_played[i];
        if ca != cb {
            // The player who had `wanted.opposite()` back then is due
            // `wanted` now.
            return if ca == wanted.opposite() {
                Some((a, b))
            } else {
                Some((b, a))
            };
        }
    }
    None
}
