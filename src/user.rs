use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_default;
use crate::endpoints::Endpoint;
use crate::error::FplError;
use crate::fpl::Fpl;
use crate::http_client::Transport;

/// A manager's entry ("team" in the game UI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub player_first_name: String,
    pub player_last_name: String,
    pub player_region_name: Option<String>,
    pub favourite_team: Option<u32>,
    pub started_event: u32,
    pub current_event: Option<u32>,
    pub summary_overall_points: Option<i32>,
    pub summary_overall_rank: Option<u64>,
    pub summary_event_points: Option<i32>,
    pub summary_event_rank: Option<u64>,
    /// League memberships, kept as returned.
    pub leagues: Value,
}

impl User {
    pub fn manager_name(&self) -> String {
        format!("{} {}", self.player_first_name, self.player_last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameweekHistory {
    pub event: u32,
    pub points: i32,
    pub total_points: i32,
    pub rank: Option<u64>,
    pub overall_rank: Option<u64>,
    pub bank: i32,
    pub value: i32,
    pub event_transfers: u32,
    pub event_transfers_cost: i32,
    pub points_on_bench: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonHistory {
    pub season_name: String,
    pub total_points: i32,
    pub rank: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipUsage {
    pub name: String,
    pub time: String,
    pub event: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserHistory {
    #[serde(deserialize_with = "null_default")]
    pub current: Vec<GameweekHistory>,
    #[serde(deserialize_with = "null_default")]
    pub past: Vec<SeasonHistory>,
    #[serde(deserialize_with = "null_default")]
    pub chips: Vec<ChipUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pick {
    pub element: u32,
    pub position: u32,
    pub multiplier: u32,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Picks {
    pub active_chip: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub picks: Vec<Pick>,
    pub entry_history: Option<GameweekHistory>,
    #[serde(deserialize_with = "null_default")]
    pub automatic_subs: Vec<Value>,
}

impl Picks {
    pub fn captain(&self) -> Option<u32> {
        self.picks.iter().find(|p| p.is_captain).map(|p| p.element)
    }

    /// Starting XI; bench slots are positions 12-15.
    pub fn starters(&self) -> impl Iterator<Item = &Pick> {
        self.picks.iter().filter(|p| p.position <= 11)
    }
}

fn decode<D: for<'de> Deserialize<'de> + Default>(raw: Value, what: &str) -> Result<D> {
    if raw.is_null() {
        return Ok(D::default());
    }
    serde_json::from_value(raw).with_context(|| format!("invalid {what} json"))
}

/// Entry id of the logged-in manager from the `me/` payload.
pub fn current_user_id(me: &Value) -> Option<i64> {
    me.get("player")?.get("entry")?.as_i64()
}

impl<T: Transport> Fpl<T> {
    /// Without an id, resolves the logged-in manager's entry.
    pub fn get_user(&self, user_id: Option<i64>) -> Result<User> {
        let user_id = self.resolve_user_id(user_id)?;
        let raw = self
            .fetch(Endpoint::User, &[&user_id])
            .with_context(|| format!("user {user_id} request failed"))?;
        decode(raw, "user")
    }

    pub fn get_user_history(&self, user_id: Option<i64>) -> Result<UserHistory> {
        let user_id = self.resolve_user_id(user_id)?;
        let raw = self
            .fetch(Endpoint::UserHistory, &[&user_id])
            .with_context(|| format!("user {user_id} history request failed"))?;
        decode(raw, "user history")
    }

    pub fn get_user_picks(&self, user_id: Option<i64>, gameweek_id: u32) -> Result<Picks> {
        let user_id = self.resolve_user_id(user_id)?;
        if !self.bootstrap().gameweeks.contains_key(&gameweek_id) {
            return Err(FplError::GameweekNotFound(gameweek_id).into());
        }
        let raw = self
            .fetch(Endpoint::UserPicks, &[&user_id, &gameweek_id])
            .with_context(|| format!("user {user_id} picks request failed"))?;
        decode(raw, "picks")
    }

    fn resolve_user_id(&self, user_id: Option<i64>) -> Result<i64> {
        match user_id {
            Some(id) if id > 0 => Ok(id),
            Some(id) => Err(FplError::InvalidUserId(id).into()),
            None => {
                if !self.transport().is_authenticated() {
                    return Err(FplError::NotLoggedIn.into());
                }
                let me = self.fetch(Endpoint::Me, &[]).context("me request failed")?;
                let id = current_user_id(&me).ok_or(FplError::NotLoggedIn)?;
                debug!("resolved current user to entry {id}");
                Ok(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_payload_yields_entry() {
        let me = serde_json::json!({"player": {"entry": 91928, "first_name": "A"}});
        assert_eq!(current_user_id(&me), Some(91928));
        assert_eq!(current_user_id(&serde_json::json!({"player": null})), None);
    }

    #[test]
    fn picks_expose_captain_and_starters() {
        let picks: Picks = serde_json::from_str(
            r#"{"active_chip": null, "automatic_subs": null,
                "picks": [{"element": 1, "position": 1, "multiplier": 1},
                          {"element": 2, "position": 2, "multiplier": 2, "is_captain": true},
                          {"element": 3, "position": 12, "multiplier": 0}]}"#,
        )
        .expect("picks parse");
        assert_eq!(picks.captain(), Some(2));
        assert_eq!(picks.starters().count(), 2);
        assert!(picks.automatic_subs.is_empty());
    }

    #[test]
    fn history_tolerates_missing_sections() {
        let history: UserHistory =
            serde_json::from_str(r#"{"current": [{"event": 1, "points": 62}], "past": null}"#)
                .expect("history parses");
        assert_eq!(history.current[0].points, 62);
        assert!(history.past.is_empty());
        assert!(history.chips.is_empty());
    }
}
