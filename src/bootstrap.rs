use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_default;
use crate::gameweek::Gameweek;
use crate::player::{Player, PlayerType, Position};
use crate::team::Team;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: u32,
    pub name: String,
    pub start_event: u32,
    pub stop_event: u32,
}

/// Label/name pair from `element_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub label: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub league_join_private_max: u32,
    pub league_join_public_max: u32,
    pub league_max_size_public_classic: u32,
    pub league_max_size_public_h2h: u32,
    pub league_max_size_private_h2h: u32,
    pub league_max_ko_rounds_private_h2h: u32,
    pub league_prefix_public: String,
    pub league_points_h2h_win: u32,
    pub league_points_h2h_lose: u32,
    pub league_points_h2h_draw: u32,
    pub league_ko_first_instead_of_random: bool,
    pub cup_start_event_id: Option<u32>,
    pub cup_stop_event_id: Option<u32>,
    pub cup_qualifying_method: Option<String>,
    pub cup_type: Option<String>,
    pub squad_squadplay: u32,
    pub squad_squadsize: u32,
    pub squad_team_limit: u32,
    pub squad_total_spend: u32,
    pub ui_currency_multiplier: u32,
    pub ui_use_special_shirts: bool,
    pub stats_form_days: u32,
    pub sys_vice_captain_enabled: bool,
    pub transfers_sell_on_fee: f64,
    #[serde(deserialize_with = "null_default")]
    pub league_h2h_tiebreak_stats: Vec<String>,
    pub timezone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BootstrapRecord {
    #[serde(deserialize_with = "null_default")]
    teams: Vec<Team>,
    #[serde(deserialize_with = "null_default")]
    elements: Vec<Player>,
    #[serde(deserialize_with = "null_default")]
    element_types: Vec<PlayerType>,
    #[serde(deserialize_with = "null_default")]
    element_stats: Vec<PlayerStat>,
    #[serde(deserialize_with = "null_default")]
    events: Vec<Gameweek>,
    #[serde(deserialize_with = "null_default")]
    phases: Vec<Phase>,
    #[serde(deserialize_with = "null_default")]
    game_settings: GameSettings,
    total_players: u64,
}

/// Static season snapshot. Loaded once per client and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bootstrap {
    pub teams: BTreeMap<u32, Team>,
    pub players: BTreeMap<u32, Player>,
    pub player_types: Vec<PlayerType>,
    pub player_stats: Vec<PlayerStat>,
    pub gameweeks: BTreeMap<u32, Gameweek>,
    pub phases: Vec<Phase>,
    pub settings: GameSettings,
    pub total_users: u64,
    pub current_gameweek_id: Option<u32>,
}

impl Bootstrap {
    pub fn from_value(value: Value) -> Result<Self> {
        let record: BootstrapRecord = if value.is_null() {
            BootstrapRecord::default()
        } else {
            serde_json::from_value(value).context("invalid bootstrap-static json")?
        };
        let current_gameweek_id = record.events.iter().find(|g| g.is_current).map(|g| g.id);
        Ok(Self {
            teams: record.teams.into_iter().map(|t| (t.id, t)).collect(),
            players: record.elements.into_iter().map(|p| (p.id, p)).collect(),
            player_types: record.element_types,
            player_stats: record.element_stats,
            gameweeks: record.events.into_iter().map(|g| (g.id, g)).collect(),
            phases: record.phases,
            settings: record.game_settings,
            total_users: record.total_players,
            current_gameweek_id,
        })
    }

    pub fn team_name(&self, team_id: u32) -> Option<&str> {
        self.teams.get(&team_id).map(|t| t.name.as_str())
    }

    pub fn player_position(&self, player_id: u32) -> Option<Position> {
        self.players.get(&player_id).and_then(Player::position)
    }

    pub fn team_players(&self, team_id: u32) -> Vec<&Player> {
        self.players.values().filter(|p| p.team == team_id).collect()
    }
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap> {
    Bootstrap::from_value(crate::http_client::parse_json_body(raw)?)
}
