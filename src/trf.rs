//! Optional TRF-style import/export (spec.md §9: "Keep the TRF format as an
//! optional import/export only").
//!
//! This is not byte-column-exact FIDE TRF16 (that format predates
//! whitespace-delimited tooling and is brittle to hand-write without a
//! reference file to test against); it's the same information FIDE's format
//! carries — one line per player, one token per round — tokenized on
//! whitespace instead of fixed columns. It operates purely on the data
//! model: no external process, no bbpPairings invocation.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::{Player, PlayerRegistry},
    r64,
    rounds::{ByeType, Color, GameOutcome, Pairing, RoundRegistry},
};

/// One round's result for one player, as recorded in a TRF report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TrfGame {
    /// A played game, against the opponent at `opponent_rank` (1-based,
    /// matching `TrfPlayerRecord::starting_rank`).
    Played {
        /// The opponent's starting rank
        opponent_rank: u32,
        /// The color held
        color: Color,
        /// The outcome, from this player's perspective
        outcome: GameOutcome,
    },
    /// A bye of the given type.
    Bye(ByeType),
}

/// One player's full record across a tournament, as carried by a TRF
/// report: identity, rating, total points, and one `TrfGame` per round
/// played so far.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrfPlayerRecord {
    /// This player's 1-based starting rank within the report (TRF's
    /// cross-reference key; stable for the life of the report, independent
    /// of the engine's own `PlayerId`).
    pub starting_rank: u32,
    /// The player's name
    pub name: String,
    /// The player's rating (0 = unrated)
    pub rating: u32,
    /// Total points as of the last recorded round
    pub points: r64,
    /// One entry per round, in ascending round order
    pub games: Vec<TrfGame>,
}

/// A full tournament report in TRF-inspired form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrfReport {
    /// The tournament's name
    pub tournament_name: String,
    /// One record per player, ordered by starting rank
    pub players: Vec<TrfPlayerRecord>,
}

const RESULT_WIN: char = 'W';
const RESULT_LOSS: char = 'L';
const RESULT_DRAW: char = 'D';
const RESULT_FORFEIT: char = 'U';
const BYE_REQUESTED: char = 'H';
const BYE_INACTIVE: char = 'Z';
const BYE_PAIRING_ALLOCATED: char = 'F';

/// Builds a `TrfReport` from a section's current state. Starting ranks are
/// assigned by the canonical (-rating, name, id) ordering spec.md uses
/// elsewhere for deterministic tie-breaking.
pub fn build_trf_report(
    tournament_name: impl Into<String>,
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
) -> TrfReport {
    let mut roster: Vec<&Player> = players.in_section(section).collect();
    roster.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.name.cmp(&b.name)).then_with(|| a.id.cmp(&b.id)));

    let rank_of: std::collections::HashMap<PlayerId, u32> = roster
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i as u32 + 1))
        .collect();

    let last_round = rounds.latest_round(section).unwrap_or(0);
    let mut records = Vec::with_capacity(roster.len());
    for player in roster {
        let mut games = Vec::new();
        let mut points = r64::from_integer(0);
        for round in 1..=last_round {
            for pairing in rounds.pairings_for(section, round) {
                if let Some(game) = game_for_player(pairing, player.id, &rank_of) {
                    points += points_for(&game);
                    games.push(game);
                }
            }
        }
        records.push(TrfPlayerRecord {
            starting_rank: rank_of[&player.id],
            name: player.name.clone(),
            rating: player.rating,
            points,
            games,
        });
    }
    records.sort_by_key(|r| r.starting_rank);

    TrfReport {
        tournament_name: tournament_name.into(),
        players: records,
    }
}

fn game_for_player(
    pairing: &Pairing,
    player: PlayerId,
    rank_of: &std::collections::HashMap<PlayerId, u32>,
) -> Option<TrfGame> {
    if pairing.white_id == player {
        if let Some(black) = pairing.black_id {
            let outcome = pairing.result?;
            return Some(TrfGame::Played {
                opponent_rank: *rank_of.get(&black)?,
                color: Color::White,
                outcome,
            });
        }
        return pairing.bye_type.map(TrfGame::Bye);
    }
    if pairing.black_id == Some(player) {
        let outcome = pairing.result?;
        return Some(TrfGame::Played {
            opponent_rank: *rank_of.get(&pairing.white_id)?,
            color: Color::Black,
            outcome,
        });
    }
    None
}

/// Crude, FIDE-adjacent point value per game: wins/draws/losses at the
/// standard 1/0.5/0, byes at a flat 0.5 except a pairing-allocated full
/// bye. Only used to populate the report's informational `points` column;
/// the engine's own standings always derive points from `ScoringSettings`.
/// `outcome` is stored from the absolute white/black perspective, so the
/// record owner's own result must be read against the color they held.
fn points_for(game: &TrfGame) -> r64 {
    match game {
        TrfGame::Played { color, outcome, .. } => match (color, outcome) {
            (Color::White, GameOutcome::WhiteWin) | (Color::Black, GameOutcome::BlackWin) => {
                r64::from_integer(1)
            }
            (_, GameOutcome::Draw) => r64::new(1, 2),
            _ => r64::from_integer(0),
        },
        TrfGame::Bye(ByeType::PairingAllocatedFull) => r64::from_integer(1),
        TrfGame::Bye(ByeType::RequestedHalf) => r64::new(1, 2),
        TrfGame::Bye(ByeType::InactiveZero) => r64::from_integer(0),
    }
}

/// Renders a report to TRF-inspired text: one `012` header line naming the
/// tournament, then one `001` line per player.
pub fn write_trf(report: &TrfReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "012 {}", report.tournament_name);
    for player in &report.players {
        let _ = write!(
            out,
            "001 {} {} {} {}",
            player.starting_rank,
            player.name,
            player.rating,
            display_points(player.points)
        );
        for game in &player.games {
            let _ = write!(out, " {}", encode_game(game));
        }
        let _ = writeln!(out);
    }
    out
}

fn display_points(points: r64) -> String {
    let tenths = (points * r64::from_integer(10)).round().to_integer();
    format!("{:.1}", tenths as f64 / 10.0)
}

fn encode_game(game: &TrfGame) -> String {
    match game {
        TrfGame::Played { opponent_rank, color, outcome } => {
            let color = match color {
                Color::White => 'w',
                Color::Black => 'b',
            };
            let result = match outcome {
                GameOutcome::WhiteWin => RESULT_WIN,
                GameOutcome::BlackWin => RESULT_LOSS,
                GameOutcome::Draw => RESULT_DRAW,
                GameOutcome::UnplayedForfeit => RESULT_FORFEIT,
            };
            // From the perspective of whoever holds `color`: a white win is
            // a win for white and a loss for black, and vice versa.
            let result = if *color == Color::Black {
                match result {
                    RESULT_WIN => RESULT_LOSS,
                    RESULT_LOSS => RESULT_WIN,
                    other => other,
                }
            } else {
                result
            };
            format!("{opponent_rank:04} {color} {result}")
        }
        TrfGame::Bye(ByeType::RequestedHalf) => format!("0000 - {BYE_REQUESTED}"),
        TrfGame::Bye(ByeType::InactiveZero) => format!("0000 - {BYE_INACTIVE}"),
        TrfGame::Bye(ByeType::PairingAllocatedFull) => format!("0000 - {BYE_PAIRING_ALLOCATED}"),
    }
}

/// Parses a TRF-inspired report previously produced by `write_trf`.
pub fn parse_trf(input: &str) -> Result<TrfReport, PairingError> {
    let mut tournament_name = String::new();
    let mut players = Vec::new();

    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("012 ") {
            tournament_name = rest.trim().to_string();
            continue;
        }
        if let Some(rest) = line.strip_prefix("001 ") {
            players.push(parse_player_line(rest, line_no + 1)?);
            continue;
        }
        return Err(PairingError::InvalidSnapshot(format!(
            "line {}: unrecognized TRF record prefix",
            line_no + 1
        )));
    }

    Ok(TrfReport { tournament_name, players })
}

fn parse_player_line(rest: &str, line_no: usize) -> Result<TrfPlayerRecord, PairingError> {
    let mut tokens = rest.split_whitespace();
    let bad_line = || PairingError::InvalidSnapshot(format!("line {line_no}: malformed TRF player record"));

    let starting_rank: u32 = tokens.next().ok_or_else(bad_line)?.parse().map_err(|_| bad_line())?;
    let name = tokens.next().ok_or_else(bad_line)?.to_string();
    let rating: u32 = tokens.next().ok_or_else(bad_line)?.parse().map_err(|_| bad_line())?;
    let points = parse_decimal(tokens.next().ok_or_else(bad_line)?).ok_or_else(bad_line)?;

    let mut games = Vec::new();
    loop {
        let Some(opp_tok) = tokens.next() else { break };
        let color_tok = tokens.next().ok_or_else(bad_line)?;
        let result_tok = tokens.next().ok_or_else(bad_line)?;
        games.push(parse_game(opp_tok, color_tok, result_tok, line_no)?);
    }

    Ok(TrfPlayerRecord {
        starting_rank,
        name,
        rating,
        points,
        games,
    })
}

fn parse_game(opp_tok: &str, color_tok: &str, result_tok: &str, line_no: usize) -> Result<TrfGame, PairingError> {
    let bad_line = || PairingError::InvalidSnapshot(format!("line {line_no}: malformed TRF game token"));
    let result_char = result_tok.chars().next().ok_or_else(bad_line)?;

    if color_tok == "-" {
        return match result_char {
            BYE_REQUESTED => Ok(TrfGame::Bye(ByeType::RequestedHalf)),
            BYE_INACTIVE => Ok(TrfGame::Bye(ByeType::InactiveZero)),
            BYE_PAIRING_ALLOCATED => Ok(TrfGame::Bye(ByeType::PairingAllocatedFull)),
            _ => Err(bad_line()),
        };
    }

    let opponent_rank: u32 = opp_tok.parse().map_err(|_| bad_line())?;
    let color = match color_tok {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(bad_line()),
    };
    let result_for_holder = match result_char {
        RESULT_WIN => GameOutcome::WhiteWin,
        RESULT_LOSS => GameOutcome::BlackWin,
        RESULT_DRAW => GameOutcome::Draw,
        RESULT_FORFEIT => GameOutcome::UnplayedForfeit,
        _ => return Err(bad_line()),
    };
    // `result_for_holder` above is phrased as if `color` were White; flip it
    // back to an actual white/black outcome when the holder played Black.
    let outcome = match (color, result_for_holder) {
        (Color::Black, GameOutcome::WhiteWin) => GameOutcome::BlackWin,
        (Color::Black, GameOutcome::BlackWin) => GameOutcome::WhiteWin,
        (_, other) => other,
    };

    Ok(TrfGame::Played { opponent_rank, color, outcome })
}

fn parse_decimal(token: &str) -> Option<r64> {
    let (whole, frac) = token.split_once('.').unwrap_or((token, "0"));
    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = frac.parse().ok()?;
    let sign = if whole < 0 { -1 } else { 1 };
    Some(r64::from_integer(whole) + r64::new(sign * frac, 10))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::players::Player;

    #[test]
    fn round_trips_a_single_decisive_game() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let mut a = Player::new("Alice", section);
        a.rating = 2100;
        let mut b = Player::new("Bob", section);
        b.rating = 2000;
        let (a_id, b_id) = (a.id, b.id);
        players.register(a).unwrap();
        players.register(b).unwrap();

        let mut rounds = RoundRegistry::new();
        rounds
            .store(
                section,
                1,
                vec![Pairing {
                    round: 1,
                    board: 1,
                    section,
                    white_id: a_id,
                    black_id: Some(b_id),
                    bye_type: None,
                    result: Some(GameOutcome::WhiteWin),
                }],
            )
            .unwrap();

        let report = build_trf_report("Spring Open", &players, &rounds, section);
        let text = write_trf(&report);
        let parsed = parse_trf(&text).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn round_trips_every_bye_type() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let a = Player::new("Solo", section);
        let a_id = a.id;
        players.register(a).unwrap();

        let mut rounds = RoundRegistry::new();
        for (round, bye_type) in [
            (1, ByeType::RequestedHalf),
            (2, ByeType::InactiveZero),
            (3, ByeType::PairingAllocatedFull),
        ] {
            rounds
                .store(
                    section,
                    round,
                    vec![Pairing {
                        round,
                        board: 1,
                        section,
                        white_id: a_id,
                        black_id: None,
                        bye_type: Some(bye_type),
                        result: None,
                    }],
                )
                .unwrap();
        }

        let report = build_trf_report("Bye Cup", &players, &rounds, section);
        let text = write_trf(&report);
        let parsed = parse_trf(&text).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn rejects_an_unrecognized_line_prefix() {
        assert!(parse_trf("999 garbage").is_err());
    }
}
