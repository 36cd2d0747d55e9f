use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::de::{f64_lenient, null_default, opt_f64_lenient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Maps the upstream `element_type` (1..=4).
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerType {
    pub id: u8,
    pub element_count: u32,
    pub plural_name: String,
    pub plural_name_short: String,
    pub singular_name: String,
    pub singular_name_short: String,
    pub squad_select: u32,
    pub squad_min_play: u32,
    pub squad_max_play: u32,
    pub ui_shirt_specific: bool,
}

/// A player entry ("element") from the bootstrap snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: u32,
    pub code: u64,
    pub first_name: String,
    pub second_name: String,
    pub web_name: String,
    pub team: u32,
    pub team_code: u32,
    pub element_type: u8,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub news: String,
    pub news_added: Option<String>,
    pub chance_of_playing_this_round: Option<u8>,
    pub chance_of_playing_next_round: Option<u8>,
    pub now_cost: u32,
    pub cost_change_event: i32,
    pub cost_change_start: i32,
    pub total_points: i32,
    pub event_points: i32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub goals_conceded: u32,
    pub own_goals: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub bonus: u32,
    pub bps: i32,
    pub dreamteam_count: u32,
    pub in_dreamteam: bool,
    pub transfers_in: u64,
    pub transfers_out: u64,
    pub transfers_in_event: u64,
    pub transfers_out_event: u64,
    #[serde(deserialize_with = "f64_lenient")]
    pub form: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub points_per_game: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub selected_by_percent: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub value_form: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub value_season: f64,
    #[serde(deserialize_with = "opt_f64_lenient")]
    pub ep_this: Option<f64>,
    #[serde(deserialize_with = "opt_f64_lenient")]
    pub ep_next: Option<f64>,
    #[serde(deserialize_with = "f64_lenient")]
    pub influence: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub creativity: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub threat: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub ict_index: f64,
}

impl Player {
    pub fn position(&self) -> Option<Position> {
        Position::from_element_type(self.element_type)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    /// Points per 90 minutes played.
    pub fn pp90(&self) -> f64 {
        if self.minutes == 0 {
            return 0.0;
        }
        self.total_points as f64 / self.minutes as f64 * 90.0
    }

    /// Value added per million: points per game above a 2-point baseline,
    /// divided by price in millions.
    pub fn vapm(&self, games_played: u32) -> f64 {
        if games_played == 0 || self.now_cost == 0 {
            return 0.0;
        }
        (self.total_points as f64 / games_played as f64 - 2.0) / (self.now_cost as f64 / 10.0)
    }
}

/// A fixture the player has already played, from the player's summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayedFixture {
    pub element: u32,
    pub fixture: u32,
    pub opponent_team: u32,
    pub total_points: i32,
    pub was_home: bool,
    pub kickoff_time: Option<String>,
    pub team_h_score: Option<u32>,
    pub team_a_score: Option<u32>,
    pub round: u32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub goals_conceded: u32,
    pub own_goals: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub bonus: u32,
    pub bps: i32,
    #[serde(deserialize_with = "f64_lenient")]
    pub influence: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub creativity: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub threat: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub ict_index: f64,
    pub value: u32,
    pub transfers_balance: i64,
    pub selected: u64,
    pub transfers_in: u64,
    pub transfers_out: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FutureFixture {
    pub id: u32,
    pub code: u64,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_score: Option<u32>,
    pub team_a_score: Option<u32>,
    pub event: Option<u32>,
    pub event_name: Option<String>,
    pub finished: bool,
    pub minutes: u32,
    pub provisional_start_time: bool,
    pub kickoff_time: Option<String>,
    pub is_home: bool,
    pub difficulty: u8,
}

impl FutureFixture {
    pub fn opponent(&self) -> u32 {
        if self.is_home { self.team_a } else { self.team_h }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricSeason {
    pub season_name: String,
    pub element_code: u64,
    pub start_cost: u32,
    pub end_cost: u32,
    pub total_points: i32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub goals_conceded: u32,
    pub own_goals: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub bonus: u32,
    pub bps: i32,
    #[serde(deserialize_with = "f64_lenient")]
    pub influence: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub creativity: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub threat: f64,
    #[serde(deserialize_with = "f64_lenient")]
    pub ict_index: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayerSummaryRecord {
    #[serde(deserialize_with = "null_default")]
    history: Vec<PlayedFixture>,
    #[serde(deserialize_with = "null_default")]
    fixtures: Vec<FutureFixture>,
    #[serde(deserialize_with = "null_default")]
    history_past: Vec<HistoricSeason>,
}

/// `element-summary` for one player: this season's played and upcoming
/// fixtures plus past seasons.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player_id: u32,
    /// Keyed by fixture id.
    pub played_fixtures: HashMap<u32, PlayedFixture>,
    pub future_fixtures: HashMap<u32, FutureFixture>,
    pub historic_seasons: Vec<HistoricSeason>,
}

impl PlayerSummary {
    pub fn from_value(player_id: u32, value: serde_json::Value) -> Result<Self> {
        let record: PlayerSummaryRecord = if value.is_null() {
            PlayerSummaryRecord::default()
        } else {
            serde_json::from_value(value)
                .with_context(|| format!("invalid summary json for player {player_id}"))?
        };
        Ok(Self {
            player_id,
            played_fixtures: record
                .history
                .into_iter()
                .map(|f| (f.fixture, f))
                .collect(),
            future_fixtures: record
                .fixtures
                .into_iter()
                .map(|f| (f.id, f))
                .collect(),
            historic_seasons: record.history_past,
        })
    }

    pub fn played_fixture(&self, fixture_id: u32) -> Option<&PlayedFixture> {
        self.played_fixtures.get(&fixture_id)
    }

    /// Fixtures with at least one minute played.
    pub fn games_played(&self) -> u32 {
        self.played_fixtures
            .values()
            .filter(|f| f.minutes > 0)
            .count() as u32
    }
}

pub fn parse_player_summary_json(player_id: u32, raw: &str) -> Result<PlayerSummary> {
    let value = crate::http_client::parse_json_body(raw)?;
    PlayerSummary::from_value(player_id, value)
}
