//! The pairing-set validator (spec.md §4.9): the last stage before
//! pairings are handed to a `PairingSink`. Enforces every structural and
//! rule invariant, plus non-fatal warnings (large rating gaps).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    rounds::{Color, Pairing},
    settings::ValidatorSettings,
    state::PlayerState,
};

/// A single validation problem, fatal or not.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A player appears more than once (or not at all, when `expected` is
    /// supplied) within a single (round, section).
    PlayerAppearsWrongNumberOfTimes {
        /// The player in question
        player: PlayerId,
        /// How many times they appeared
        count: usize,
    },
    /// A pairing has the same player on both sides.
    SelfPairing {
        /// The board number
        board: u32,
    },
    /// Two players who already faced each other were paired again.
    RepeatPairing {
        /// The first player
        a: PlayerId,
        /// The second player
        b: PlayerId,
    },
    /// Board numbers are not a contiguous 1..N prefix.
    NonContiguousBoards {
        /// The boards actually present, sorted
        boards: Vec<u32>,
    },
    /// A bye pairing has no `bye_type`, or a non-bye pairing has one.
    MalformedBye {
        /// The board number
        board: u32,
    },
    /// The assigned colors satisfy neither player's due color, even though
    /// at least one of them could have been honored. Two players sharing
    /// the same absolute preference is not itself an error — spec.md
    /// §4.3 step 3's tie-break always grants the color to one of them —
    /// this only fires when the assignment contradicts both.
    ColorConflict {
        /// The board number
        board: u32,
    },
    /// The pairing set mixes more than one round, section, or tournament.
    MixedScope {
        /// A human-readable description of the mismatch
        detail: String,
    },
}

/// A non-fatal observation about a pairing set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A pairing's rating gap exceeds the configured threshold.
    LargeRatingGap {
        /// The board number
        board: u32,
        /// The absolute rating difference
        gap: u32,
    },
}

/// The result of validating one pairing set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Fatal structural/rule violations. Non-empty means the pairing set
    /// must not be persisted.
    pub errors: Vec<ValidationIssue>,
    /// Non-fatal observations worth surfacing to a tournament director.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether the pairing set is free of fatal issues.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a freshly produced pairing set against every invariant of
/// spec.md §4.9. `prior_opponents` is each player's opponent set *before*
/// this round (so this round's own repeats are still caught).
pub fn validate(
    pairings: &[Pairing],
    players: &PlayerRegistry,
    states: &[PlayerState],
    settings: &ValidatorSettings,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if pairings.is_empty() {
        return report;
    }

    check_scope(pairings, &mut report);
    check_appearances(pairings, &mut report);
    check_boards(pairings, &mut report);
    check_byes(pairings, &mut report);
    check_self_pairings(pairings, &mut report);

    let prior_opponents: HashMap<PlayerId, &HashSet<PlayerId>> =
        states.iter().map(|s| (s.player, &s.opponents)).collect();
    check_repeats(pairings, &prior_opponents, &mut report);
    check_color_conflicts(pairings, states, &mut report);
    check_rating_gaps(pairings, players, settings, &mut report);

    report
}

fn check_scope(pairings: &[Pairing], report: &mut ValidationReport) {
    let first = &pairings[0];
    for p in pairings {
        if p.round != first.round || p.section != first.section {
            report.errors.push(ValidationIssue::MixedScope {
                detail: format!(
                    "expected every pairing to share (round {}, section {}), found (round {}, section {})",
                    first.round, first.section, p.round, p.section
                ),
            });
            return;
        }
    }
}

fn check_appearances(pairings: &[Pairing], report: &mut ValidationReport) {
    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for p in pairings {
        for player in p.players() {
            *counts.entry(player).or_default() += 1;
        }
    }
    for (player, count) in counts {
        if count != 1 {
            report
                .errors
                .push(ValidationIssue::PlayerAppearsWrongNumberOfTimes { player, count });
        }
    }
}

fn check_boards(pairings: &[Pairing], report: &mut ValidationReport) {
    let mut boards: Vec<u32> = pairings.iter().map(|p| p.board).collect();
    boards.sort_unstable();
    let contiguous = boards.iter().enumerate().all(|(i, &b)| b == i as u32 + 1);
    if !contiguous {
        report
            .errors
            .push(ValidationIssue::NonContiguousBoards { boards });
    }
}

fn check_byes(pairings: &[Pairing], report: &mut ValidationReport) {
    for p in pairings {
        let malformed = (p.black_id.is_none()) != p.bye_type.is_some();
        if malformed {
            report
                .errors
                .push(ValidationIssue::MalformedBye { board: p.board });
        }
    }
}

fn check_self_pairings(pairings: &[Pairing], report: &mut ValidationReport) {
    for p in pairings {
        if p.black_id == Some(p.white_id) {
            report.errors.push(ValidationIssue::SelfPairing { board: p.board });
        }
    }
}

fn check_repeats(
    pairings: &[Pairing],
    prior_opponents: &HashMap<PlayerId, &HashSet<PlayerId>>,
    report: &mut ValidationReport,
) {
    for p in pairings {
        let Some(black) = p.black_id else { continue };
        if prior_opponents
            .get(&p.white_id)
            .map(|opps| opps.contains(&black))
            .unwrap_or(false)
        {
            report.errors.push(ValidationIssue::RepeatPairing {
                a: p.white_id,
                b: black,
            });
        }
    }
}

fn check_color_conflicts(pairings: &[Pairing], states: &[PlayerState], report: &mut ValidationReport) {
    let by_id: HashMap<PlayerId, &PlayerState> = states.iter().map(|s| (s.player, s)).collect();
    for p in pairings {
        let Some(black) = p.black_id else { continue };
        let (Some(white_state), Some(black_state)) = (by_id.get(&p.white_id), by_id.get(&black))
        else {
            continue;
        };
        let white_contradicted = white_state.due_color().is_some_and(|due| due != Color::White);
        let black_contradicted = black_state.due_color().is_some_and(|due| due != Color::Black);
        if white_contradicted && black_contradicted {
            report.errors.push(ValidationIssue::ColorConflict { board: p.board });
        }
    }
}

fn check_rating_gaps(
    pairings: &[Pairing],
    players: &PlayerRegistry,
    settings: &ValidatorSettings,
    report: &mut ValidationReport,
) {
    for p in pairings {
        let Some(black) = p.black_id else { continue };
        let (Ok(white), Ok(black)) = (players.get(&p.white_id), players.get(&black)) else {
            continue;
        };
        let gap = white.rating.abs_diff(black.rating);
        if gap > settings.rating_gap_warning {
            report
                .warnings
                .push(ValidationWarning::LargeRatingGap { board: p.board, gap });
        }
    }
}
