use std::collections::BTreeMap;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_default;
use crate::fixture::Fixture;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekTopPlayer {
    pub id: u32,
    pub points: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipPlayed {
    pub chip_name: String,
    pub num_played: u64,
}

/// A gameweek ("event"), optionally carrying its live per-player data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gameweek {
    pub id: u32,
    pub name: String,
    pub deadline_time: Option<String>,
    pub deadline_time_epoch: i64,
    pub deadline_time_game_offset: i64,
    pub average_entry_score: i32,
    pub highest_score: Option<i32>,
    pub highest_scoring_entry: Option<u64>,
    pub finished: bool,
    pub data_checked: bool,
    pub is_previous: bool,
    pub is_current: bool,
    pub is_next: bool,
    pub most_selected: Option<u32>,
    pub most_transferred_in: Option<u32>,
    pub most_captained: Option<u32>,
    pub most_vice_captained: Option<u32>,
    pub top_element: Option<u32>,
    pub top_element_info: Option<GameweekTopPlayer>,
    pub transfers_made: u64,
    #[serde(deserialize_with = "null_default")]
    pub chip_plays: Vec<ChipPlayed>,
    #[serde(skip_deserializing)]
    pub live: Option<LiveGameweek>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveStats {
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
    pub bonus: i32,
    pub bps: i32,
    pub total_points: i32,
    pub in_dreamteam: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveElement {
    pub id: u32,
    #[serde(default)]
    pub stats: LiveStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiveGameweek {
    /// Keyed by player id.
    pub elements: BTreeMap<u32, LiveElement>,
}

#[derive(Debug, Default, Deserialize)]
struct LiveRecord {
    #[serde(default, deserialize_with = "null_default")]
    elements: Vec<LiveElement>,
}

impl LiveGameweek {
    pub fn from_value(value: Value) -> Result<Self> {
        let record: LiveRecord = if value.is_null() {
            LiveRecord::default()
        } else {
            serde_json::from_value(value).context("invalid live gameweek json")?
        };
        Ok(Self {
            elements: record.elements.into_iter().map(|e| (e.id, e)).collect(),
        })
    }

    /// Adds the provisional bonus of every unfinished fixture to players
    /// whose published bonus is still 0. A player in two unfinished
    /// fixtures gets the sum. Returns how many players were updated.
    pub fn apply_provisional_bonus(&mut self, fixtures: &[Fixture]) -> usize {
        let mut provisional: BTreeMap<u32, i32> = BTreeMap::new();
        for fixture in fixtures.iter().filter(|f| !f.finished) {
            for award in fixture.bonus(true).iter() {
                *provisional.entry(award.player_id).or_default() += award.value;
            }
        }

        let mut updated = 0;
        for (player_id, points) in provisional {
            let Some(element) = self.elements.get_mut(&player_id) else {
                debug!("provisional bonus for unknown player {player_id}");
                continue;
            };
            if element.stats.bonus == 0 {
                element.stats.bonus += points;
                element.stats.total_points += points;
                updated += 1;
            }
        }
        updated
    }
}

pub fn parse_gameweeks_json(raw: &str) -> Result<Vec<Gameweek>> {
    let value = crate::http_client::parse_json_body(raw)?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).context("invalid gameweeks json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::parse_fixture_json;

    fn live_with(elements: &[(u32, i32, i32)]) -> LiveGameweek {
        LiveGameweek {
            elements: elements
                .iter()
                .map(|&(id, bonus, total_points)| {
                    (
                        id,
                        LiveElement {
                            id,
                            stats: LiveStats {
                                bonus,
                                total_points,
                                ..LiveStats::default()
                            },
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn provisional_bonus_only_fills_unpublished() {
        let fixture = parse_fixture_json(
            r#"{"id": 1, "team_h": 1, "team_a": 2, "started": true, "finished": false,
                "stats": [{"identifier": "bps", "h": [{"element": 10, "value": 30}, {"element": 11, "value": 20}],
                                               "a": [{"element": 20, "value": 25}]}]}"#,
        )
        .expect("fixture parses");
        let mut live = live_with(&[(10, 0, 8), (11, 1, 3), (20, 0, 5)]);

        let updated = live.apply_provisional_bonus(&[fixture]);

        assert_eq!(updated, 2);
        assert_eq!(live.elements[&10].stats.bonus, 3);
        assert_eq!(live.elements[&10].stats.total_points, 11);
        assert_eq!(live.elements[&20].stats.bonus, 2);
        assert_eq!(live.elements[&20].stats.total_points, 7);
        // already had published bonus
        assert_eq!(live.elements[&11].stats.bonus, 1);
        assert_eq!(live.elements[&11].stats.total_points, 3);
    }

    #[test]
    fn gameweek_tolerates_nulls() {
        let raw = r#"[{"id": 6, "name": "Gameweek 6", "finished": true, "highest_score": null,
                       "top_element_info": {"id": 494, "points": 17}, "chip_plays": null}]"#;
        let gws = parse_gameweeks_json(raw).expect("gameweeks parse");
        assert_eq!(gws.len(), 1);
        assert_eq!(gws[0].top_element_info, Some(GameweekTopPlayer { id: 494, points: 17 }));
        assert!(gws[0].chip_plays.is_empty());
        assert!(gws[0].live.is_none());
    }
}
