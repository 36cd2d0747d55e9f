use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_default;
use crate::endpoints::Endpoint;
use crate::fpl::Fpl;
use crate::http_client::Transport;

/// Standings phases in upstream order; the phase id is the 1-based index.
pub const PHASE_NAMES: [&str; 13] = [
    "Overall",
    "August",
    "September",
    "October",
    "November",
    "December",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
];

/// Upper bound on pages walked for one listing.
const MAX_PAGES: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
    pub created: Option<String>,
    pub closed: bool,
    pub max_entries: Option<u32>,
    pub league_type: String,
    pub scoring: String,
    pub admin_entry: Option<u64>,
    pub start_event: u32,
    pub code_privacy: String,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicStandingEntry {
    pub id: u64,
    pub entry: u64,
    pub entry_name: String,
    pub player_name: String,
    pub event_total: i32,
    pub total: i32,
    pub rank: u32,
    pub last_rank: u32,
    pub rank_sort: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct H2hStandingEntry {
    pub id: u64,
    pub entry: u64,
    pub entry_name: String,
    pub player_name: String,
    pub division: u64,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_drawn: u32,
    pub matches_lost: u32,
    pub points_for: i32,
    pub total: i32,
    pub rank: u32,
    pub last_rank: u32,
    pub rank_sort: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEntry {
    pub entry: u64,
    pub entry_name: String,
    pub joined_time: String,
    pub player_first_name: String,
    pub player_last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct H2hMatch {
    pub id: u64,
    pub event: u32,
    pub entry_1_entry: Option<u64>,
    pub entry_1_name: String,
    pub entry_1_player_name: String,
    pub entry_1_points: i32,
    pub entry_1_win: u32,
    pub entry_1_draw: u32,
    pub entry_1_loss: u32,
    pub entry_1_total: i32,
    pub entry_2_entry: Option<u64>,
    pub entry_2_name: String,
    pub entry_2_player_name: String,
    pub entry_2_points: i32,
    pub entry_2_win: u32,
    pub entry_2_draw: u32,
    pub entry_2_loss: u32,
    pub entry_2_total: i32,
    pub is_knockout: bool,
    pub winner: Option<u64>,
    pub seed_value: Option<u64>,
    pub tiebreak: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new", deserialize_with = "null_default")]
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            has_next: false,
            page: 0,
            results: Vec::new(),
        }
    }
}

/// A standings row type and the endpoint its league is served from.
pub trait StandingEntry: DeserializeOwned + Send {
    const ENDPOINT: Endpoint;
    const RESOURCE: &'static str;
}

impl StandingEntry for ClassicStandingEntry {
    const ENDPOINT: Endpoint = Endpoint::LeagueClassic;
    const RESOURCE: &'static str = "classic league standings";
}

impl StandingEntry for H2hStandingEntry {
    const ENDPOINT: Endpoint = Endpoint::LeagueH2h;
    const RESOURCE: &'static str = "h2h league standings";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct League<E> {
    pub info: LeagueInfo,
    /// First standings page as returned with the league.
    pub standings: Page<E>,
}

pub type ClassicLeague = League<ClassicStandingEntry>;
pub type H2hLeague = League<H2hStandingEntry>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseStandings<E> {
    pub phase_id: u32,
    pub phase_name: String,
    pub entries: Vec<E>,
}

#[derive(Deserialize)]
#[serde(bound = "E: DeserializeOwned")]
struct LeagueResponse<E> {
    #[serde(default)]
    league: LeagueInfo,
    #[serde(default, deserialize_with = "null_default")]
    standings: Page<E>,
    #[serde(default, deserialize_with = "null_default")]
    new_entries: Page<NewEntry>,
}

fn parse_league_response<E: DeserializeOwned>(raw: Value) -> Result<LeagueResponse<E>> {
    if raw.is_null() {
        return Ok(LeagueResponse {
            league: LeagueInfo::default(),
            standings: Page::default(),
            new_entries: Page::default(),
        });
    }
    serde_json::from_value(raw).context("invalid league json")
}

pub fn parse_league_json<E: StandingEntry>(raw: &str) -> Result<League<E>> {
    let resp = parse_league_response::<E>(crate::http_client::parse_json_body(raw)?)?;
    Ok(League {
        info: resp.league,
        standings: resp.standings,
    })
}

impl<T: Transport> Fpl<T> {
    pub fn get_classic_league(&self, league_id: u64) -> Result<ClassicLeague> {
        self.get_league(league_id)
    }

    pub fn get_h2h_league(&self, league_id: u64) -> Result<H2hLeague> {
        self.get_league(league_id)
    }

    /// Requires an authenticated session.
    pub fn get_league<E: StandingEntry>(&self, league_id: u64) -> Result<League<E>> {
        self.require_login(E::RESOURCE)?;
        let raw = self
            .fetch(E::ENDPOINT, &[&league_id])
            .with_context(|| format!("league {league_id} request failed"))?;
        let resp = parse_league_response::<E>(raw)?;
        Ok(League {
            info: resp.league,
            standings: resp.standings,
        })
    }

    fn league_page<E: StandingEntry>(
        &self,
        league_id: u64,
        standings_page: u32,
        new_entries_page: u32,
        phase_id: u32,
    ) -> Result<LeagueResponse<E>> {
        self.require_login(E::RESOURCE)?;
        let url = format!(
            "{}?page_new_entries={new_entries_page}&page_standings={standings_page}&phase={phase_id}",
            self.url(E::ENDPOINT, &[&league_id])
        );
        let raw = self
            .transport()
            .get_json(&url)
            .with_context(|| format!("league {league_id} page request failed"))?;
        parse_league_response(raw)
    }

    pub fn standings_page<E: StandingEntry>(
        &self,
        league: &League<E>,
        page: u32,
        phase_id: u32,
    ) -> Result<Page<E>> {
        Ok(self.league_page::<E>(league.info.id, page, 1, phase_id)?.standings)
    }

    /// Every page of every phase.
    pub fn all_standings<E: StandingEntry>(&self, league: &League<E>) -> Result<Vec<PhaseStandings<E>>> {
        let mut out = Vec::with_capacity(PHASE_NAMES.len());
        for (idx, phase_name) in PHASE_NAMES.iter().enumerate() {
            let phase_id = idx as u32 + 1;
            let mut entries = Vec::new();
            let mut page = 1;
            loop {
                let standings = self.standings_page(league, page, phase_id)?;
                let has_next = standings.has_next && !standings.results.is_empty();
                entries.extend(standings.results);
                if !has_next || page >= MAX_PAGES {
                    break;
                }
                page += 1;
            }
            debug!("league {} phase {phase_name}: {} entries", league.info.id, entries.len());
            out.push(PhaseStandings {
                phase_id,
                phase_name: phase_name.to_string(),
                entries,
            });
        }
        Ok(out)
    }

    pub fn new_entries<E: StandingEntry>(&self, league: &League<E>) -> Result<Vec<NewEntry>> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let resp = self.league_page::<E>(league.info.id, 1, page, 1)?;
            let has_next = resp.new_entries.has_next && !resp.new_entries.results.is_empty();
            out.extend(resp.new_entries.results);
            if !has_next || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    /// H2H fixtures/results, optionally for a single gameweek.
    pub fn h2h_matches(&self, league: &H2hLeague, gameweek: Option<u32>) -> Result<Vec<H2hMatch>> {
        self.require_login("h2h league fixtures")?;
        let query = gameweek.map(|gw| format!("event={gw}&")).unwrap_or_default();
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let raw = self
                .fetch(Endpoint::LeagueH2hMatches, &[&league.info.id, &query, &page])
                .with_context(|| format!("h2h matches page {page} request failed"))?;
            let matches: Page<H2hMatch> = if raw.is_null() {
                Page::default()
            } else {
                serde_json::from_value(raw).context("invalid h2h matches json")?
            };
            let has_next = matches.has_next && !matches.results.is_empty();
            out.extend(matches.results);
            if !has_next || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        Ok(out)
    }
}
