use std::fmt;

use serde::{Deserialize, Serialize};

use crate::de::f64_lenient;

/// A Premier League club as listed in the bootstrap snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: u32,
    pub code: u32,
    pub name: String,
    pub short_name: String,
    pub pulse_id: u32,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub points: i32,
    pub position: u32,
    #[serde(deserialize_with = "f64_lenient")]
    pub form: f64,
    pub strength: u8,
    pub strength_overall_home: u32,
    pub strength_overall_away: u32,
    pub strength_attack_home: u32,
    pub strength_attack_away: u32,
    pub strength_defence_home: u32,
    pub strength_defence_away: u32,
    pub unavailable: bool,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
