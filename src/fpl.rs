use std::collections::BTreeSet;

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::bootstrap::Bootstrap;
use crate::config::{ClientConfig, Credentials};
use crate::endpoints::Endpoint;
use crate::error::FplError;
use crate::fixture::{Fixture, Location};
use crate::gameweek::{Gameweek, LiveGameweek};
use crate::http_client::{HttpSession, Transport};
use crate::player::{Player, PlayerSummary};
use crate::team::Team;

/// Entry point: owns the transport and the bootstrap snapshot.
pub struct Fpl<T: Transport = HttpSession> {
    transport: T,
    api_base: String,
    bootstrap: Bootstrap,
    pool: Option<rayon::ThreadPool>,
}

/// A team's fixtures split by where the team played.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamFixtures {
    pub home: Vec<Fixture>,
    pub away: Vec<Fixture>,
}

impl TeamFixtures {
    pub fn split(team_id: u32, fixtures: &[Fixture]) -> Self {
        let mut out = Self::default();
        for fixture in fixtures {
            match fixture.location_of(team_id) {
                Some(Location::Home) => out.home.push(fixture.clone()),
                Some(Location::Away) => out.away.push(fixture.clone()),
                None => {}
            }
        }
        out
    }

    pub fn at(&self, location: Location) -> &[Fixture] {
        match location {
            Location::Home => &self.home,
            Location::Away => &self.away,
        }
    }
}

impl Fpl<HttpSession> {
    /// Cookie-capable session so [`Fpl::login`] works later.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let session = HttpSession::with_cookies(config.clone())?;
        Self::new(session, &config)
    }

    pub fn connect_anonymous(config: ClientConfig) -> Result<Self> {
        let session = HttpSession::anonymous(config.clone())?;
        Self::new(session, &config)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<()> {
        self.transport.login(credentials)
    }
}

impl<T: Transport> Fpl<T> {
    /// Loads the bootstrap snapshot through `transport`.
    pub fn new(transport: T, config: &ClientConfig) -> Result<Self> {
        let api_base = config.api_base.clone();
        let url = Endpoint::Static.url(&api_base, &[]);
        let static_json = transport
            .get_json(&url)
            .context("bootstrap-static request failed")?;
        let bootstrap = Bootstrap::from_value(static_json)?;
        info!(
            "loaded bootstrap: {} teams, {} players, {} gameweeks",
            bootstrap.teams.len(),
            bootstrap.players.len(),
            bootstrap.gameweeks.len()
        );
        Ok(Self {
            transport,
            api_base,
            bootstrap,
            pool: build_fetch_pool(config.fetch_parallelism),
        })
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn team(&self, team_id: u32) -> Option<&Team> {
        self.bootstrap.teams.get(&team_id)
    }

    pub fn player(&self, player_id: u32) -> Option<&Player> {
        self.bootstrap.players.get(&player_id)
    }

    pub fn team_players(&self, team_id: u32) -> Vec<&Player> {
        self.bootstrap.team_players(team_id)
    }

    pub(crate) fn url(&self, endpoint: Endpoint, args: &[&dyn std::fmt::Display]) -> String {
        endpoint.url(&self.api_base, args)
    }

    pub(crate) fn fetch(&self, endpoint: Endpoint, args: &[&dyn std::fmt::Display]) -> Result<Value> {
        let url = self.url(endpoint, args);
        self.transport.get_json(&url)
    }

    pub(crate) fn require_login(&self, resource: &str) -> Result<()> {
        if self.transport.is_authenticated() {
            Ok(())
        } else {
            Err(FplError::unauthorized(resource).into())
        }
    }

    /// Runs `f` over `items` on the fetch pool. Output order follows input;
    /// the first error fails the batch.
    pub(crate) fn fan_out<I, R, F>(&self, items: &[I], f: F) -> Result<Vec<R>>
    where
        I: Sync,
        R: Send,
        F: Fn(&I) -> Result<R> + Sync + Send,
    {
        let run = || items.par_iter().map(&f).collect::<Result<Vec<R>>>();
        match self.pool.as_ref() {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Fixtures of one gameweek, or the whole season when `gameweek` is
    /// `None`, restricted to `ids` unless it is empty.
    pub fn get_fixtures(&self, ids: &[u32], gameweek: Option<u32>) -> Result<Vec<Fixture>> {
        let raw = match gameweek {
            Some(gw) => self.fetch(Endpoint::GameweekFixtures, &[&gw]),
            None => self.fetch(Endpoint::Fixtures, &[]),
        }
        .context("fixtures request failed")?;
        let fixtures: Vec<Fixture> = if raw.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(raw).context("invalid fixtures json")?
        };
        Ok(fixtures
            .into_iter()
            .filter(|f| ids.is_empty() || ids.contains(&f.id))
            .collect())
    }

    pub fn get_fixture(&self, fixture_id: u32) -> Result<Option<Fixture>> {
        Ok(self.get_fixtures(&[fixture_id], None)?.into_iter().next())
    }

    pub fn team_fixtures(&self, team_id: u32) -> Result<TeamFixtures> {
        let fixtures = self.get_fixtures(&[], None)?;
        Ok(TeamFixtures::split(team_id, &fixtures))
    }

    pub fn get_player_summary(&self, player_id: u32) -> Result<PlayerSummary> {
        let raw = self
            .fetch(Endpoint::PlayerSummary, &[&player_id])
            .with_context(|| format!("summary request failed for player {player_id}"))?;
        PlayerSummary::from_value(player_id, raw)
    }

    /// Fetches summaries in parallel. Id 0 is skipped; results keep input order.
    pub fn get_player_summaries(&self, player_ids: &[u32]) -> Result<Vec<PlayerSummary>> {
        let ids: Vec<u32> = player_ids.iter().copied().filter(|id| *id > 0).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("fetching {} player summaries", ids.len());
        self.fan_out(&ids, |id| self.get_player_summary(*id))
    }

    /// Summaries for every player who appeared in any of `fixtures`, each fetched once.
    pub fn participant_summaries(&self, fixtures: &[Fixture]) -> Result<Vec<PlayerSummary>> {
        let ids: BTreeSet<u32> = fixtures
            .iter()
            .flat_map(|f| f.bps().iter().map(|p| p.player_id))
            .collect();
        let ids: Vec<u32> = ids.into_iter().collect();
        self.get_player_summaries(&ids)
    }

    /// Gameweek from the snapshot. With `include_live`, attaches live player
    /// data; while the gameweek is unfinished the live data also gets
    /// provisional bonus from the fixtures still in play.
    pub fn get_gameweek(&self, gameweek_id: u32, include_live: bool) -> Result<Gameweek> {
        let mut gameweek = self
            .bootstrap
            .gameweeks
            .get(&gameweek_id)
            .cloned()
            .ok_or(FplError::GameweekNotFound(gameweek_id))?;
        if !include_live {
            return Ok(gameweek);
        }

        let raw = self
            .fetch(Endpoint::GameweekLive, &[&gameweek_id])
            .context("live gameweek request failed")?;
        let mut live = LiveGameweek::from_value(raw)?;
        if !gameweek.finished {
            let fixtures = self.get_fixtures(&[], Some(gameweek_id))?;
            let updated = live.apply_provisional_bonus(&fixtures);
            debug!("gameweek {gameweek_id}: provisional bonus applied to {updated} players");
        }
        gameweek.live = Some(live);
        Ok(gameweek)
    }
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}
