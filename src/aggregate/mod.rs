//! Team aggregation.
//!
//! Folds newly discovered tournaments into a team's running table:
//! 1. Discover the team's tournaments upstream
//! 2. Skip the ones already processed
//! 3. Fetch, parse and tabulate each new tournament, merging as it goes
//! 4. Recompute scores and commit to the [`TeamStore`]

mod store;

pub use store::*;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::{tabulate, Tabulation};
use crate::fetch::FetchError;
use crate::models::{TeamRef, TeamTable, TournamentId};
use crate::pgn;

/// Errors that can occur while refreshing a team.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No team found matching '{0}'")]
    UnknownTeam(String),

    #[error("Team '{0}' is already being refreshed")]
    RefreshInProgress(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Fetching tournament {tournament} failed after {merged} new tournament(s) were merged: {source}")]
    TournamentFetch {
        tournament: TournamentId,
        merged: usize,
        #[source]
        source: FetchError,
    },
}

/// Upstream collaborators the aggregator depends on.
#[async_trait]
pub trait TournamentSource: Send + Sync {
    /// Resolve a user-typed fragment to a canonical team (first match).
    async fn resolve_team(&self, fragment: &str) -> Result<Option<TeamRef>, FetchError>;

    /// All tournament IDs of a team, in discovery order.
    async fn list_tournaments(&self, team: &TeamRef) -> Result<Vec<TournamentId>, FetchError>;

    /// Raw PGN blocks of one tournament, one per game.
    async fn fetch_games(&self, tournament: &TournamentId) -> Result<Vec<String>, FetchError>;
}

/// Receives human-readable progress text during a refresh.
#[async_trait]
pub trait ProgressSink: Send {
    async fn report(&mut self, text: &str);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn report(&mut self, _text: &str) {}
}

/// Format the progress line sent after each tournament.
pub fn progress_text(done: usize, total: usize) -> String {
    format!("Fortschritt: {}/{}", done, total)
}

/// Outcome of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub team: TeamRef,
    pub table: TeamTable,
    /// Tournaments folded in by this refresh
    pub new_tournaments: usize,
    /// Of those, how many had no games
    pub empty_tournaments: usize,
}

impl RefreshReport {
    /// True when there was nothing new to fold in.
    pub fn up_to_date(&self) -> bool {
        self.new_tournaments == 0
    }
}

/// Incrementally maintains per-team tables.
#[derive(Clone)]
pub struct TeamAggregator {
    source: Arc<dyn TournamentSource>,
    store: Arc<TeamStore>,
}

impl TeamAggregator {
    pub fn new(source: Arc<dyn TournamentSource>, store: Arc<TeamStore>) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &TeamStore {
        &self.store
    }

    /// Resolve a team fragment to its canonical identity.
    pub async fn resolve(&self, fragment: &str) -> Result<TeamRef, AggregateError> {
        self.source
            .resolve_team(fragment)
            .await?
            .ok_or_else(|| AggregateError::UnknownTeam(fragment.to_string()))
    }

    /// Resolve a fragment and refresh that team.
    pub async fn refresh(
        &self,
        fragment: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<RefreshReport, AggregateError> {
        let team = self.resolve(fragment).await?;
        self.refresh_team(&team, progress).await
    }

    /// Fold every not-yet-processed tournament of `team` into its table.
    ///
    /// On a failed tournament fetch, tournaments merged before it are kept
    /// and committed; the failed one and everything after it stay
    /// unprocessed, and the table is marked stale so the next cached read
    /// retries them.
    pub async fn refresh_team(
        &self,
        team: &TeamRef,
        progress: &mut dyn ProgressSink,
    ) -> Result<RefreshReport, AggregateError> {
        let _guard = self
            .store
            .try_begin_refresh(&team.name)
            .ok_or_else(|| AggregateError::RefreshInProgress(team.name.clone()))?;

        let discovered = self.source.list_tournaments(team).await?;
        let processed = self.store.processed(&team.name);

        let mut seen = HashSet::new();
        let new_tournaments: Vec<TournamentId> = discovered
            .into_iter()
            .filter(|id| !processed.contains(id) && seen.insert(id.clone()))
            .collect();

        let mut table = self
            .store
            .get(&team.name)
            .unwrap_or_else(|| TeamTable::new(team.name.clone()));

        if new_tournaments.is_empty() {
            info!("Team {} is up to date", team.name);
            self.store
                .commit(&team.name, table.clone(), Vec::new(), Some(Utc::now()));
            return Ok(RefreshReport {
                team: team.clone(),
                table,
                new_tournaments: 0,
                empty_tournaments: 0,
            });
        }

        let total = new_tournaments.len();
        info!("Team {}: {} new tournament(s) to process", team.name, total);

        let mut completed: Vec<TournamentId> = Vec::with_capacity(total);
        let mut empty_tournaments = 0;
        let mut failure: Option<(TournamentId, FetchError)> = None;

        for id in new_tournaments {
            let blocks = match self.source.fetch_games(&id).await {
                Ok(blocks) => blocks,
                Err(e) => {
                    warn!("Team {}: fetching tournament {} failed: {}", team.name, id, e);
                    failure = Some((id, e));
                    break;
                }
            };

            let games = pgn::parse_games(&blocks);
            match tabulate(&games) {
                Tabulation::NoData => {
                    debug!("Tournament {} has no games", id);
                    empty_tournaments += 1;
                }
                Tabulation::Table(tournament_table) => {
                    debug!(
                        "Tournament {}: {} games, {} players",
                        id,
                        games.len(),
                        tournament_table.len()
                    );
                    table.merge(tournament_table);
                }
            }

            completed.push(id);
            progress.report(&progress_text(completed.len(), total)).await;
        }

        table.recompute_scores();
        let merged = completed.len();

        match failure {
            Some((tournament, source)) => {
                self.store.commit(&team.name, table, completed, None);
                Err(AggregateError::TournamentFetch {
                    tournament,
                    merged,
                    source,
                })
            }
            None => {
                self.store
                    .commit(&team.name, table.clone(), completed, Some(Utc::now()));
                info!(
                    "Team {}: merged {} tournament(s), {} players, {} results",
                    team.name,
                    merged,
                    table.len(),
                    table.total_results()
                );
                Ok(RefreshReport {
                    team: team.clone(),
                    table,
                    new_tournaments: merged,
                    empty_tournaments,
                })
            }
        }
    }

    /// The cached table if it was completely refreshed less than `max_age` ago.
    pub fn fresh_table(&self, team: &TeamRef, max_age: Duration) -> Option<TeamTable> {
        let table = self.store.get(&team.name)?;
        let at = self.store.refreshed_at(&team.name)?;
        // A negative age (clock moved backwards) counts as fresh
        Utc::now()
            .signed_duration_since(at)
            .to_std()
            .map_or(true, |age| age < max_age)
            .then_some(table)
    }

    /// The cached table when it is younger than `max_age`, otherwise a
    /// refreshed one. The flag is true when a refresh ran.
    pub async fn table_for(
        &self,
        team: &TeamRef,
        max_age: Duration,
        progress: &mut dyn ProgressSink,
    ) -> Result<(TeamTable, bool), AggregateError> {
        if self.store.is_refreshing(&team.name) {
            return Err(AggregateError::RefreshInProgress(team.name.clone()));
        }

        if let Some(table) = self.fresh_table(team, max_age) {
            debug!("Serving team {} from cache", team.name);
            return Ok((table, false));
        }

        let report = self.refresh_team(team, progress).await?;
        Ok((report.table, true))
    }
}
