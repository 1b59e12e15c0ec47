//! Shared spoof-data helpers for the scenario tests under `tests/`.

use dutch_pairing_engine::{
    engine::Snapshot,
    identifiers::{PlayerId, SectionId},
    players::{Player, PlayerRegistry},
    rounds::RoundRegistry,
    settings::{TournamentConfig, TournamentFormat},
    tournament::Tournament,
};

pub fn snapshot_with(format: TournamentFormat, ratings: &[(&str, u32)]) -> (Snapshot, SectionId) {
    let config = TournamentConfig {
        format,
        ..TournamentConfig::default()
    };
    let mut tournament = Tournament::new("Test Open", 7, config);
    let section: SectionId = uuid::Uuid::new_v4().into();
    tournament.sections.push(section);

    let mut players = PlayerRegistry::new();
    for (name, rating) in ratings {
        let mut p = Player::new(*name, section);
        p.rating = *rating;
        players.register(p).unwrap();
    }

    (
        Snapshot {
            tournament,
            players,
            rounds: RoundRegistry::new(),
        },
        section,
    )
}

pub fn id_of(snapshot: &Snapshot, name: &str) -> PlayerId {
    snapshot.players.all().find(|p| p.name == name).unwrap().id
}
