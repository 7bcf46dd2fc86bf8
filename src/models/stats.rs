//! Player tallies and the per-team accumulation table.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Win/draw/loss counters for one player. Only ever incremented or summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl PlayerTally {
    pub fn new(wins: u32, draws: u32, losses: u32) -> Self {
        Self {
            wins,
            draws,
            losses,
        }
    }

    /// Number of games this tally covers.
    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    /// Tournament score: one point per win, half a point per draw.
    pub fn score(&self) -> Score {
        Score::from_half_points(self.wins * 2 + self.draws)
    }
}

impl AddAssign for PlayerTally {
    fn add_assign(&mut self, other: Self) {
        self.wins += other.wins;
        self.draws += other.draws;
        self.losses += other.losses;
    }
}

/// A chess score kept as a count of half points, so it never drifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Score(u32);

impl Score {
    pub fn from_half_points(half_points: u32) -> Self {
        Self(half_points)
    }

    pub fn half_points(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 2;
        let fraction = if self.0 % 2 == 1 { 5 } else { 0 };
        write!(f, "{}.{}", whole, fraction)
    }
}

/// Tallies for the players of a single tournament.
pub type TournamentTable = BTreeMap<String, PlayerTally>;

/// Running statistics for one team, accumulated over every tournament
/// folded into it so far.
///
/// Scores are derived: they are only brought up to date by
/// [`TeamTable::recompute_scores`], which the aggregator calls once after
/// a batch of merges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTable {
    /// Canonical team name
    pub team: String,

    players: BTreeMap<String, PlayerTally>,

    scores: BTreeMap<String, Score>,
}

impl TeamTable {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            players: BTreeMap::new(),
            scores: BTreeMap::new(),
        }
    }

    /// Sum a tournament's tallies into this table, field by field.
    /// Players missing on either side count as zero.
    pub fn merge(&mut self, tournament: TournamentTable) {
        for (player, tally) in tournament {
            *self.players.entry(player).or_default() += tally;
        }
    }

    /// Re-derive every player's score from the current tallies.
    pub fn recompute_scores(&mut self) {
        self.scores = self
            .players
            .iter()
            .map(|(name, tally)| (name.clone(), tally.score()))
            .collect();
    }

    /// Look up a player's tally (case-insensitive).
    pub fn tally(&self, player: &str) -> Option<&PlayerTally> {
        self.players.get(&player.to_lowercase())
    }

    /// Look up a player's derived score (case-insensitive).
    pub fn score(&self, player: &str) -> Option<Score> {
        self.scores.get(&player.to_lowercase()).copied()
    }

    /// Iterate players in name order with their tally and derived score.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &PlayerTally, Score)> + '_ {
        self.players.iter().map(move |(name, tally)| {
            let score = self.scores.get(name).copied().unwrap_or_default();
            (name.as_str(), tally, score)
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Sum of `wins + draws + losses` over all players.
    pub fn total_results(&self) -> u32 {
        self.players.values().map(PlayerTally::games).sum()
    }
}
