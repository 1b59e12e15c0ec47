use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    r64,
    rounds::{ByeType, Color, GameOutcome, RoundRegistry},
    scoring::{StandingsRow, StandingsTable, TiebreakId},
    settings::{ByeSettings, ScoringSettings},
};

/// How a single round went for a player, used to compute tiebreaks. The
/// kind is tracked explicitly rather than inferred from `points_awarded`
/// (spec.md §9's "never infer bye meaning from point values").
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    /// Won the game
    Win,
    /// Drew the game
    Draw,
    /// Lost the game
    Loss,
    /// Received a bye of the given type
    Bye(ByeType),
    /// An unplayed forfeit; excluded from Sonneborn-Berger and does not
    /// count toward color streaks.
    Forfeit,
}

impl GameKind {
    /// The Sonneborn-Berger result weight: win = 1, draw = 0.5, loss = 0.
    /// Byes use the weight of the point fraction they carry; forfeits do
    /// not contribute (callers filter them out before weighting).
    fn sb_weight(self, bye_settings: &ByeSettings) -> r64 {
        match self {
            GameKind::Win => r64::from_integer(1),
            GameKind::Draw => r64::new(1, 2),
            GameKind::Loss | GameKind::Forfeit => r64::from_integer(0),
            GameKind::Bye(ByeType::PairingAllocatedFull) if bye_settings.full_point_pairing_bye => {
                r64::from_integer(1)
            }
            GameKind::Bye(ByeType::PairingAllocatedFull) => r64::new(1, 2),
            GameKind::Bye(ByeType::RequestedHalf) => r64::new(1, 2),
            GameKind::Bye(ByeType::InactiveZero) => r64::from_integer(0),
        }
    }
}

/// One round's worth of history for a single player, as consumed by the
/// tiebreak computations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// The round this record is for
    pub round: u32,
    /// The opponent faced, or `None` for a bye
    pub opponent: Option<PlayerId>,
    /// The opponent's rating at registration time
    pub opponent_rating: u32,
    /// What happened
    pub kind: GameKind,
    /// Points actually awarded for this round
    pub points_awarded: r64,
    /// The color held, if any (byes and unplayed forfeits hold no color
    /// and so do not count toward imbalance or color streaks, per
    /// spec.md §4.3 and the open question on bye rounds in §9).
    pub color: Option<Color>,
}

fn outcome_to_kind(outcome: GameOutcome, is_white: bool) -> GameKind {
    match (outcome, is_white) {
        (GameOutcome::WhiteWin, true) | (GameOutcome::BlackWin, false) => GameKind::Win,
        (GameOutcome::WhiteWin, false) | (GameOutcome::BlackWin, true) => GameKind::Loss,
        (GameOutcome::Draw, _) => GameKind::Draw,
        (GameOutcome::UnplayedForfeit, _) => GameKind::Forfeit,
    }
}

/// Builds every player's game history, from round 1 through (and including)
/// every completed pairing on record, for `section`.
pub fn build_histories(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    scoring: &ScoringSettings,
    bye_settings: &ByeSettings,
) -> HashMap<PlayerId, Vec<GameRecord>> {
    let mut histories: HashMap<PlayerId, Vec<GameRecord>> = players
        .in_section(section)
        .map(|p| (p.id, Vec::new()))
        .collect();

    let last_round = rounds.latest_round(section).unwrap_or(0);

    for round in 1..=last_round {
        for pairing in rounds.pairings_for(section, round) {
            if pairing.is_bye() {
                let bye_type = pairing
                    .bye_type
                    .expect("bye pairings always carry a bye_type (validator invariant)");
                let points = scoring.bye_points(bye_type, bye_settings.full_point_pairing_bye);
                if let Some(hist) = histories.get_mut(&pairing.white_id) {
                    hist.push(GameRecord {
                        round,
                        opponent: None,
                        opponent_rating: 0,
                        kind: GameKind::Bye(bye_type),
                        points_awarded: points,
                        color: None,
                    });
                }
                continue;
            }
            let Some(black) = pairing.black_id else { continue };
            let Some(outcome) = pairing.result else { continue };
            let white_rating = players.get(&black).map(|p| p.rating).unwrap_or(0);
            let black_rating = players.get(&pairing.white_id).map(|p| p.rating).unwrap_or(0);

            let white_kind = outcome_to_kind(outcome, true);
            let black_kind = outcome_to_kind(outcome, false);
            let white_points = kind_points(white_kind, scoring);
            let black_points = kind_points(black_kind, scoring);
            let (white_color, black_color) = if matches!(outcome, GameOutcome::UnplayedForfeit) {
                (None, None)
            } else {
                (Some(Color::White), Some(Color::Black))
            };

            if let Some(hist) = histories.get_mut(&pairing.white_id) {
                hist.push(GameRecord {
                    round,
                    opponent: Some(black),
                    opponent_rating: white_rating,
                    kind: white_kind,
                    points_awarded: white_points,
                    color: white_color,
                });
            }
            if let Some(hist) = histories.get_mut(&black) {
                hist.push(GameRecord {
                    round,
                    opponent: Some(pairing.white_id),
                    opponent_rating: black_rating,
                    kind: black_kind,
                    points_awarded: black_points,
                    color: black_color,
                });
            }
        }
    }

    histories
}

fn kind_points(kind: GameKind, scoring: &ScoringSettings) -> r64 {
    match kind {
        GameKind::Win => scoring.win,
        GameKind::Draw => scoring.draw,
        GameKind::Loss | GameKind::Forfeit => scoring.loss,
        // Bye point values are resolved by the caller before constructing the
        // record; this arm only exists so `kind_points` stays total.
        GameKind::Bye(_) => r64::from_integer(0),
    }
}

fn total_points(history: &[GameRecord]) -> r64 {
    history.iter().map(|g| g.points_awarded).sum()
}

fn games_with_opponent(history: &[GameRecord]) -> impl Iterator<Item = &GameRecord> {
    history.iter().filter(|g| g.opponent.is_some())
}

fn buchholz(history: &[GameRecord], totals: &HashMap<PlayerId, r64>) -> r64 {
    games_with_opponent(history)
        .filter_map(|g| g.opponent.and_then(|o| totals.get(&o)))
        .copied()
        .sum()
}

fn buchholz_cut_1(history: &[GameRecord], totals: &HashMap<PlayerId, r64>) -> r64 {
    let full = buchholz(history, totals);
    let worst = games_with_opponent(history)
        .filter_map(|g| g.opponent.and_then(|o| totals.get(&o)))
        .copied()
        .fold(None, |min: Option<r64>, v| match min {
            Some(m) if m <= v => Some(m),
            _ => Some(v),
        });
    full - worst.unwrap_or_default()
}

fn modified_buchholz(history: &[GameRecord], totals: &HashMap<PlayerId, r64>) -> r64 {
    buchholz_cut_1(history, totals)
}

fn sonneborn_berger(
    history: &[GameRecord],
    totals: &HashMap<PlayerId, r64>,
    bye_settings: &ByeSettings,
) -> r64 {
    games_with_opponent(history)
        .filter_map(|g| {
            g.opponent
                .and_then(|o| totals.get(&o))
                .map(|&opp_pts| opp_pts * g.kind.sb_weight(bye_settings))
        })
        .sum()
}

fn cumulative(history: &[GameRecord]) -> r64 {
    let mut running = r64::from_integer(0);
    let mut sum = r64::from_integer(0);
    let mut by_round: Vec<&GameRecord> = history.iter().collect();
    by_round.sort_by_key(|g| g.round);
    for g in by_round {
        running += g.points_awarded;
        sum += running;
    }
    sum
}

fn performance_rating(history: &[GameRecord], own_rating: u32) -> r64 {
    let games: Vec<&GameRecord> = games_with_opponent(history).collect();
    if games.is_empty() {
        return r64::from_integer(own_rating as i64);
    }
    let n = games.len() as i64;
    let avg_opp_rating: r64 =
        games.iter().map(|g| r64::from_integer(g.opponent_rating as i64)).sum::<r64>()
            / r64::from_integer(n);
    let score: r64 = games.iter().map(|g| g.points_awarded).sum();
    avg_opp_rating + r64::from_integer(400) * (score / r64::from_integer(n) - r64::new(1, 2))
}

fn direct_encounter(history: &[GameRecord], totals: &HashMap<PlayerId, r64>, own_total: r64) -> r64 {
    games_with_opponent(history)
        .filter(|g| {
            g.opponent
                .and_then(|o| totals.get(&o))
                .map(|&t| t == own_total)
                .unwrap_or(false)
        })
        .map(|g| g.points_awarded)
        .sum()
}

/// Computes the standings table for `section`, sorted best-to-worst by
/// total points and then the configured tiebreak order, with ties finally
/// broken by ascending player id (spec.md's universal determinism rule).
pub fn compute_standings(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    tiebreak_order: &[TiebreakId],
    scoring: &ScoringSettings,
    bye_settings: &ByeSettings,
) -> StandingsTable {
    let histories = build_histories(players, rounds, section, scoring, bye_settings);
    let totals: HashMap<PlayerId, r64> = histories
        .iter()
        .map(|(id, h)| (*id, total_points(h)))
        .collect();

    let mut rows: Vec<StandingsRow> = histories
        .iter()
        .map(|(id, history)| {
            let own_total = totals[id];
            let own_rating = players.get(id).map(|p| p.rating).unwrap_or(0);
            let tiebreaks = tiebreak_order
                .iter()
                .map(|tb| {
                    let value = match tb {
                        TiebreakId::Buchholz => buchholz(history, &totals),
                        TiebreakId::BuchholzCut1 => buchholz_cut_1(history, &totals),
                        TiebreakId::ModifiedBuchholz => modified_buchholz(history, &totals),
                        TiebreakId::SonnebornBerger => {
                            sonneborn_berger(history, &totals, bye_settings)
                        }
                        TiebreakId::Cumulative => cumulative(history),
                        TiebreakId::DirectEncounter => {
                            direct_encounter(history, &totals, own_total)
                        }
                        TiebreakId::PerformanceRating => performance_rating(history, own_rating),
                    };
                    (*tb, value)
                })
                .collect();
            StandingsRow {
                player: *id,
                points: own_total,
                tiebreaks,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| {
                a.tiebreaks
                    .iter()
                    .zip(b.tiebreaks.iter())
                    .find_map(|((_, av), (_, bv))| {
                        let ord = bv.cmp(av);
                        (!ord.is_eq()).then_some(ord)
                    })
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.player.cmp(&b.player))
    });

    StandingsTable { rows }
}

/// Renders an `r64` tiebreak value at one-decimal precision for display,
/// while the underlying comparisons always use the exact rational form
/// (spec.md §4.8's "canonical fixed-point form").
pub fn display_one_decimal(value: r64) -> String {
    let tenths = (value * r64::from_integer(10)).round().to_integer();
    format!("{:.1}", tenths as f64 / 10.0)
}
