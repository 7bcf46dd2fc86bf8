//! Per-tournament tabulation.
//!
//! Turns the parsed games of one tournament into win/draw/loss tallies
//! per player, ready to be merged into a team table.

use crate::models::{GameRecord, PlayerTally, TournamentTable};

/// Outcome of tabulating one tournament.
#[derive(Debug, Clone, PartialEq)]
pub enum Tabulation {
    /// The tournament had no parsable games; nothing to merge.
    NoData,
    /// Tallies for every player that appears in at least one game.
    Table(TournamentTable),
}

/// Tally wins, draws and losses for every player in `games`.
pub fn tabulate(games: &[GameRecord]) -> Tabulation {
    if games.is_empty() {
        return Tabulation::NoData;
    }

    let mut table = TournamentTable::new();
    for game in games {
        match game.decisive() {
            Some((winner, loser)) => {
                table.entry(winner.to_string()).or_default().wins += 1;
                table.entry(loser.to_string()).or_default().losses += 1;
            }
            None => {
                table.entry(game.white.clone()).or_default().draws += 1;
                table.entry(game.black.clone()).or_default().draws += 1;
            }
        }
    }

    Tabulation::Table(table)
}
