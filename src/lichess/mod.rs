//! Lichess API client.
//!
//! Resolves teams, lists a team's Swiss tournaments and downloads their
//! games. All Lichess endpoint specifics live in this module.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::aggregate::TournamentSource;
use crate::fetch::{FetchError, Fetcher};
use crate::models::{TeamRef, TournamentId};
use crate::pgn;

pub const DEFAULT_BASE_URL: &str = "https://lichess.org";

/// One page of `GET /api/team/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamSearchPage {
    #[serde(default)]
    current_page_results: Vec<TeamSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamSearchResult {
    id: String,
    name: String,
}

/// One NDJSON line of `GET /api/team/{id}/swiss`. Only the ID is used.
#[derive(Debug, Clone, Deserialize)]
struct SwissSummary {
    id: String,
}

/// Pick the first hit of a team search response.
pub fn parse_team_search(json: &str) -> Result<Option<TeamRef>, serde_json::Error> {
    let page: TeamSearchPage = serde_json::from_str(json)?;
    Ok(page
        .current_page_results
        .into_iter()
        .next()
        .map(|hit| TeamRef::new(hit.id, hit.name)))
}

/// Extract tournament IDs from an NDJSON listing, skipping lines that
/// don't parse.
pub fn parse_tournament_ids(ndjson: &str) -> Vec<TournamentId> {
    ndjson
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<SwissSummary>(line) {
            Ok(summary) => Some(TournamentId::new(summary.id)),
            Err(e) => {
                debug!("Skipping tournament line: {}", e);
                None
            }
        })
        .collect()
}

/// Client for the public Lichess API.
#[derive(Debug, Clone)]
pub struct LichessClient {
    fetcher: Fetcher,
    base_url: Url,
}

impl LichessClient {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("Bad Lichess base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "Lichess base URL cannot be a base: {}",
                base_url
            )));
        }
        Ok(Self { fetcher, base_url })
    }

    /// Build `{base}/seg1/seg2/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Search teams by name fragment; returns the first match.
    pub async fn search_team(&self, fragment: &str) -> Result<Option<TeamRef>, FetchError> {
        let mut url = self.endpoint(&["api", "team", "search"])?;
        url.query_pairs_mut()
            .append_pair("text", &fragment.to_lowercase());

        let body = self.fetcher.get_text(&url).await?;
        let team = parse_team_search(&body)?;
        match &team {
            Some(t) => info!("Lichess: '{}' resolved to {} ({})", fragment, t.name, t.id),
            None => info!("Lichess: no team matches '{}'", fragment),
        }
        Ok(team)
    }

    /// List the Swiss tournaments of a team, in the order Lichess returns them.
    pub async fn team_swiss_tournaments(
        &self,
        team_id: &str,
    ) -> Result<Vec<TournamentId>, FetchError> {
        let url = self.endpoint(&["api", "team", team_id, "swiss"])?;
        let body = self.fetcher.get_text(&url).await?;
        let ids = parse_tournament_ids(&body);
        info!("Lichess: team {} has {} Swiss tournaments", team_id, ids.len());
        Ok(ids)
    }

    /// Download all games of a Swiss tournament as raw PGN blocks.
    pub async fn swiss_games(&self, tournament: &TournamentId) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(&["api", "swiss", tournament.as_str(), "games"])?;
        let body = self.fetcher.get_text(&url).await?;
        let games = pgn::split_games(&body);
        debug!("Lichess: tournament {} has {} games", tournament, games.len());
        Ok(games)
    }
}

#[async_trait]
impl TournamentSource for LichessClient {
    async fn resolve_team(&self, fragment: &str) -> Result<Option<TeamRef>, FetchError> {
        self.search_team(fragment).await
    }

    async fn list_tournaments(&self, team: &TeamRef) -> Result<Vec<TournamentId>, FetchError> {
        self.team_swiss_tournaments(&team.id).await
    }

    async fn fetch_games(&self, tournament: &TournamentId) -> Result<Vec<String>, FetchError> {
        self.swiss_games(tournament).await
    }
}
