//! In-process team state.
//!
//! Holds, per canonical team name, the accumulated [`TeamTable`], the set
//! of tournaments already folded into it and the time of the last complete
//! refresh, plus the set of teams currently being refreshed. Nothing here
//! survives a restart.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::models::{TeamTable, TournamentId};

#[derive(Debug, Default)]
struct TeamEntry {
    table: Option<TeamTable>,
    processed: HashSet<TournamentId>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Explicit store for team state, shared by every command handler of one
/// bot instance.
#[derive(Debug, Default)]
pub struct TeamStore {
    teams: Mutex<HashMap<String, TeamEntry>>,
    processing: Arc<Mutex<HashSet<String>>>,
}

impl TeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn teams(&self) -> MutexGuard<'_, HashMap<String, TeamEntry>> {
        self.teams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current table for a team, if one has been built.
    pub fn get(&self, team: &str) -> Option<TeamTable> {
        self.teams().get(team).and_then(|e| e.table.clone())
    }

    /// Tournaments already folded into a team's table.
    pub fn processed(&self, team: &str) -> HashSet<TournamentId> {
        self.teams()
            .get(team)
            .map(|e| e.processed.clone())
            .unwrap_or_default()
    }

    /// Store the result of a refresh in one step: table, newly processed
    /// tournaments and the completion time. `None` marks the table stale.
    /// Processed entries are never removed.
    pub fn commit(
        &self,
        team: &str,
        table: TeamTable,
        processed: Vec<TournamentId>,
        completed_at: Option<DateTime<Utc>>,
    ) {
        let mut teams = self.teams();
        let entry = teams.entry(team.to_string()).or_default();
        entry.table = Some(table);
        entry.processed.extend(processed);
        entry.refreshed_at = completed_at;
    }

    /// When the team was last refreshed to completion.
    pub fn refreshed_at(&self, team: &str) -> Option<DateTime<Utc>> {
        self.teams().get(team).and_then(|e| e.refreshed_at)
    }

    pub fn is_refreshing(&self, team: &str) -> bool {
        self.processing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(team)
    }

    /// Mark a team as being refreshed. Returns `None` if it already is.
    ///
    /// The mark is held for as long as the returned guard lives.
    pub fn try_begin_refresh(&self, team: &str) -> Option<RefreshGuard> {
        let mut processing = self
            .processing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !processing.insert(team.to_string()) {
            return None;
        }
        Some(RefreshGuard {
            team: team.to_string(),
            processing: Arc::clone(&self.processing),
        })
    }
}

/// Releases a team's refresh mark on drop.
#[derive(Debug)]
pub struct RefreshGuard {
    team: String,
    processing: Arc<Mutex<HashSet<String>>>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.processing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.team);
    }
}
