use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::bonus;
use crate::bootstrap::Bootstrap;
use crate::de::null_default;

/// One player's value for one stat category in one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub player_id: u32,
    pub value: i32,
    /// Id of the team the player turned out for.
    pub team: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSidePair {
    pub home: Vec<PlayerEvent>,
    pub away: Vec<PlayerEvent>,
}

static EMPTY_SIDE_PAIR: FixtureSidePair = FixtureSidePair {
    home: Vec::new(),
    away: Vec::new(),
};

impl FixtureSidePair {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty()
    }

    pub fn len(&self) -> usize {
        self.home.len() + self.away.len()
    }

    /// Home events first, then away.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerEvent> {
        self.home.iter().chain(self.away.iter())
    }

    pub fn side(&self, location: Location) -> &[PlayerEvent] {
        match location {
            Location::Home => &self.home,
            Location::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Home, Location::Away];

    pub fn opposite(self) -> Self {
        match self {
            Location::Home => Location::Away,
            Location::Away => Location::Home,
        }
    }
}

/// Stat identifiers as published upstream. Unknown identifiers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatCategory {
    GoalsScored,
    Assists,
    OwnGoals,
    PenaltiesSaved,
    PenaltiesMissed,
    YellowCards,
    RedCards,
    Saves,
    Bonus,
    Bps,
    Other(String),
}

impl StatCategory {
    pub fn identifier(&self) -> &str {
        match self {
            StatCategory::GoalsScored => "goals_scored",
            StatCategory::Assists => "assists",
            StatCategory::OwnGoals => "own_goals",
            StatCategory::PenaltiesSaved => "penalties_saved",
            StatCategory::PenaltiesMissed => "penalties_missed",
            StatCategory::YellowCards => "yellow_cards",
            StatCategory::RedCards => "red_cards",
            StatCategory::Saves => "saves",
            StatCategory::Bonus => "bonus",
            StatCategory::Bps => "bps",
            StatCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for StatCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "goals_scored" => StatCategory::GoalsScored,
            "assists" => StatCategory::Assists,
            "own_goals" => StatCategory::OwnGoals,
            "penalties_saved" => StatCategory::PenaltiesSaved,
            "penalties_missed" => StatCategory::PenaltiesMissed,
            "yellow_cards" => StatCategory::YellowCards,
            "red_cards" => StatCategory::RedCards,
            "saves" => StatCategory::Saves,
            "bonus" => StatCategory::Bonus,
            "bps" => StatCategory::Bps,
            _ => StatCategory::Other(raw),
        }
    }
}

impl From<StatCategory> for String {
    fn from(category: StatCategory) -> Self {
        category.identifier().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    NotStarted,
    InProgress,
    FinishedProvisional,
    Finished,
}

/// Participant ids per side, taken from the BPS table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidePlayers {
    pub home: Vec<u32>,
    pub away: Vec<u32>,
}

impl SidePlayers {
    pub fn side(&self, location: Location) -> &[u32] {
        match location {
            Location::Home => &self.home,
            Location::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FixtureRecord", into = "FixtureRecord")]
pub struct Fixture {
    pub id: u32,
    pub code: u64,
    pub gameweek: Option<u32>,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub minutes: u32,
    pub started: bool,
    pub finished: bool,
    pub finished_provisional: bool,
    pub provisional_start_time: bool,
    pub team_home: u32,
    pub team_away: u32,
    pub team_home_score: Option<u32>,
    pub team_away_score: Option<u32>,
    pub team_home_difficulty: Option<u8>,
    pub team_away_difficulty: Option<u8>,
    pub stats: BTreeMap<StatCategory, FixtureSidePair>,
}

impl Fixture {
    pub fn status(&self) -> FixtureStatus {
        if self.finished {
            FixtureStatus::Finished
        } else if self.finished_provisional {
            FixtureStatus::FinishedProvisional
        } else if self.started {
            FixtureStatus::InProgress
        } else {
            FixtureStatus::NotStarted
        }
    }

    /// An absent category is an empty pair, never an error.
    pub fn stat(&self, category: &StatCategory) -> &FixtureSidePair {
        self.stats.get(category).unwrap_or(&EMPTY_SIDE_PAIR)
    }

    pub fn goalscorers(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::GoalsScored)
    }

    pub fn assisters(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::Assists)
    }

    pub fn own_goalscorers(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::OwnGoals)
    }

    pub fn yellow_cards(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::YellowCards)
    }

    pub fn red_cards(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::RedCards)
    }

    pub fn penalty_saves(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::PenaltiesSaved)
    }

    pub fn penalty_misses(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::PenaltiesMissed)
    }

    pub fn saves(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::Saves)
    }

    pub fn bps(&self) -> &FixtureSidePair {
        self.stat(&StatCategory::Bps)
    }

    pub fn players(&self) -> SidePlayers {
        let bps = self.bps();
        SidePlayers {
            home: bps.home.iter().map(|p| p.player_id).collect(),
            away: bps.away.iter().map(|p| p.player_id).collect(),
        }
    }

    /// Published bonus once finished; the live 3-2-1 estimate when
    /// `provisional` is set on a started match; empty otherwise.
    pub fn bonus(&self, provisional: bool) -> FixtureSidePair {
        bonus::allocate_bonus(self, provisional)
    }

    pub fn location_of(&self, team_id: u32) -> Option<Location> {
        if team_id == self.team_home {
            Some(Location::Home)
        } else if team_id == self.team_away {
            Some(Location::Away)
        } else {
            None
        }
    }

    pub fn team_at(&self, location: Location) -> u32 {
        match location {
            Location::Home => self.team_home,
            Location::Away => self.team_away,
        }
    }
}

impl Fixture {
    /// "Home vs. Away - kickoff" with team names from the snapshot; ids
    /// stand in for teams the snapshot does not know.
    pub fn describe(&self, bootstrap: &Bootstrap) -> String {
        let name = |team_id: u32| {
            bootstrap
                .team_name(team_id)
                .map(str::to_string)
                .unwrap_or_else(|| team_id.to_string())
        };
        self.label(&name(self.team_home), &name(self.team_away))
    }

    fn label(&self, home: &str, away: &str) -> String {
        match self.kickoff_time {
            Some(kickoff) => format!(
                "{home} vs. {away} - {}",
                kickoff.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => format!("{home} vs. {away}"),
        }
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(&self.team_home.to_string(), &self.team_away.to_string()))
    }
}

/// Upstream fixture shape. `Fixture` reads and writes through this record so
/// serialized fixtures parse back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct FixtureRecord {
    #[serde(deserialize_with = "null_default")]
    id: u32,
    #[serde(deserialize_with = "null_default")]
    code: u64,
    event: Option<u32>,
    kickoff_time: Option<String>,
    #[serde(deserialize_with = "null_default")]
    minutes: u32,
    #[serde(deserialize_with = "null_default")]
    started: bool,
    #[serde(deserialize_with = "null_default")]
    finished: bool,
    #[serde(deserialize_with = "null_default")]
    finished_provisional: bool,
    #[serde(deserialize_with = "null_default")]
    provisional_start_time: bool,
    #[serde(deserialize_with = "null_default")]
    team_h: u32,
    #[serde(deserialize_with = "null_default")]
    team_a: u32,
    team_h_score: Option<u32>,
    team_a_score: Option<u32>,
    team_h_difficulty: Option<u8>,
    team_a_difficulty: Option<u8>,
    #[serde(deserialize_with = "null_default")]
    stats: Vec<StatRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StatRecord {
    #[serde(deserialize_with = "null_default")]
    identifier: String,
    #[serde(deserialize_with = "null_default")]
    a: Vec<StatValue>,
    #[serde(deserialize_with = "null_default")]
    h: Vec<StatValue>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct StatValue {
    #[serde(deserialize_with = "null_default")]
    value: i32,
    #[serde(deserialize_with = "null_default")]
    element: u32,
}

impl From<FixtureRecord> for Fixture {
    fn from(raw: FixtureRecord) -> Self {
        let team_home = raw.team_h;
        let team_away = raw.team_a;
        let side = |values: Vec<StatValue>, team: u32| -> Vec<PlayerEvent> {
            values
                .into_iter()
                .map(|v| PlayerEvent {
                    player_id: v.element,
                    value: v.value,
                    team,
                })
                .collect()
        };

        let mut stats = BTreeMap::new();
        for stat in raw.stats {
            stats.insert(
                StatCategory::from(stat.identifier),
                FixtureSidePair {
                    home: side(stat.h, team_home),
                    away: side(stat.a, team_away),
                },
            );
        }

        let kickoff_time = raw
            .kickoff_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Fixture {
            id: raw.id,
            code: raw.code,
            gameweek: raw.event,
            kickoff_time,
            minutes: raw.minutes,
            started: raw.started,
            finished: raw.finished,
            finished_provisional: raw.finished_provisional,
            provisional_start_time: raw.provisional_start_time,
            team_home,
            team_away,
            team_home_score: raw.team_h_score,
            team_away_score: raw.team_a_score,
            team_home_difficulty: raw.team_h_difficulty,
            team_away_difficulty: raw.team_a_difficulty,
            stats,
        }
    }
}

impl From<Fixture> for FixtureRecord {
    fn from(fixture: Fixture) -> Self {
        let values = |events: Vec<PlayerEvent>| -> Vec<StatValue> {
            events
                .into_iter()
                .map(|e| StatValue {
                    value: e.value,
                    element: e.player_id,
                })
                .collect()
        };
        FixtureRecord {
            id: fixture.id,
            code: fixture.code,
            event: fixture.gameweek,
            kickoff_time: fixture
                .kickoff_time
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            minutes: fixture.minutes,
            started: fixture.started,
            finished: fixture.finished,
            finished_provisional: fixture.finished_provisional,
            provisional_start_time: fixture.provisional_start_time,
            team_h: fixture.team_home,
            team_a: fixture.team_away,
            team_h_score: fixture.team_home_score,
            team_a_score: fixture.team_away_score,
            team_h_difficulty: fixture.team_home_difficulty,
            team_a_difficulty: fixture.team_away_difficulty,
            stats: fixture
                .stats
                .into_iter()
                .map(|(category, pair)| StatRecord {
                    identifier: category.into(),
                    a: values(pair.away),
                    h: values(pair.home),
                })
                .collect(),
        }
    }
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid fixtures json")
}

pub fn parse_fixture_json(raw: &str) -> Result<Fixture> {
    serde_json::from_str(raw.trim()).context("invalid fixture json")
}
