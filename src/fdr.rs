//! Fixture difficulty rating from points conceded.
//!
//! For every team, collect the fantasy points opposing players scored
//! against it (by opponent position and by the team's home/away status),
//! average them per location, then rescale those averages across the league
//! into 1.0..=5.0. The team conceding the fewest points is the hardest
//! fixture (5.0), the one conceding the most is the easiest (1.0).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::bootstrap::Bootstrap;
use crate::fixture::{Fixture, Location};
use crate::fpl::Fpl;
use crate::http_client::Transport;
use crate::player::{PlayerSummary, Position};

pub const FDR_HARDEST: f64 = 5.0;
pub const FDR_EASIEST: f64 = 1.0;

pub type PositionPoints = BTreeMap<Position, Vec<i32>>;

/// Points conceded by one team, per location, per opponent team id, per
/// opposing player's position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConcededPointsTable {
    pub team_id: u32,
    pub home: BTreeMap<u32, PositionPoints>,
    pub away: BTreeMap<u32, PositionPoints>,
}

impl ConcededPointsTable {
    pub fn new(team_id: u32) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    pub fn record(&mut self, location: Location, opponent: u32, position: Position, points: i32) {
        let by_opponent = match location {
            Location::Home => &mut self.home,
            Location::Away => &mut self.away,
        };
        by_opponent
            .entry(opponent)
            .or_default()
            .entry(position)
            .or_default()
            .push(points);
    }

    pub fn at(&self, location: Location) -> &BTreeMap<u32, PositionPoints> {
        match location {
            Location::Home => &self.home,
            Location::Away => &self.away,
        }
    }

    /// Every conceded total at `location`, all positions flattened.
    pub fn points(&self, location: Location) -> impl Iterator<Item = i32> + '_ {
        self.at(location)
            .values()
            .flat_map(|by_position| by_position.values())
            .flat_map(|points| points.iter().copied())
    }

    pub fn average(&self, location: Location) -> Option<f64> {
        average(self.points(location))
    }

    pub fn team_average(&self) -> TeamAverage {
        TeamAverage {
            home: self.average(Location::Home),
            away: self.average(Location::Away),
        }
    }
}

/// Mean points conceded; `None` means no data for that location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamAverage {
    pub home: Option<f64>,
    pub away: Option<f64>,
}

impl TeamAverage {
    pub fn at(&self, location: Location) -> Option<f64> {
        match location {
            Location::Home => self.home,
            Location::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointsExtrema {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LocationExtrema {
    pub home: Option<PointsExtrema>,
    pub away: Option<PointsExtrema>,
}

impl LocationExtrema {
    pub fn at(&self, location: Location) -> Option<PointsExtrema> {
        match location {
            Location::Home => self.home,
            Location::Away => self.away,
        }
    }
}

/// Difficulty per location; `None` when the team has no conceded data there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FdrScore {
    pub home: Option<f64>,
    pub away: Option<f64>,
}

impl FdrScore {
    pub fn at(&self, location: Location) -> Option<f64> {
        match location {
            Location::Home => self.home,
            Location::Away => self.away,
        }
    }
}

/// Keyed by team name.
pub type FdrTable = BTreeMap<String, FdrScore>;

pub fn average(values: impl IntoIterator<Item = i32>) -> Option<f64> {
    let mut sum = 0i64;
    let mut n = 0usize;
    for v in values {
        sum += v as i64;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(sum as f64 / n as f64)
}

/// Linear map of `value` from `[min, max]` onto `[upper, lower]`: `min`
/// lands on `upper`, `max` on `lower`. A zero-width domain yields the
/// midpoint of the target range.
pub fn scale(value: f64, upper: f64, lower: f64, min: f64, max: f64) -> f64 {
    let width = max - min;
    if width == 0.0 {
        return (upper + lower) / 2.0;
    }
    upper + (lower - upper) * (value - min) / width
}

/// Min/max per location over the teams that have data there.
pub fn points_extrema<'a>(averages: impl IntoIterator<Item = &'a TeamAverage>) -> LocationExtrema {
    let mut out = LocationExtrema::default();
    for avg in averages {
        for location in Location::ALL {
            let Some(v) = avg.at(location) else { continue };
            let slot = match location {
                Location::Home => &mut out.home,
                Location::Away => &mut out.away,
            };
            *slot = Some(match *slot {
                Some(e) => PointsExtrema {
                    min: e.min.min(v),
                    max: e.max.max(v),
                },
                None => PointsExtrema { min: v, max: v },
            });
        }
    }
    out
}

/// Scales each team's averages against the league extrema.
pub fn calculate_fdr<F>(
    averages: &BTreeMap<u32, TeamAverage>,
    extrema: &LocationExtrema,
    team_name: F,
) -> FdrTable
where
    F: Fn(u32) -> String,
{
    let score_at = |avg: &TeamAverage, location: Location| -> Option<f64> {
        let v = avg.at(location)?;
        let e = extrema.at(location)?;
        Some(scale(v, FDR_HARDEST, FDR_EASIEST, e.min, e.max))
    };
    averages
        .iter()
        .map(|(team_id, avg)| {
            (
                team_name(*team_id),
                FdrScore {
                    home: score_at(avg, Location::Home),
                    away: score_at(avg, Location::Away),
                },
            )
        })
        .collect()
}

/// Builds one team's conceded table from already-fetched data.
///
/// For each fixture the team took part in, every player on the *opposing*
/// side (participants per the BPS table) contributes the points recorded for
/// that fixture in their summary, bucketed by their position and by this
/// team's location. Players without a known position or without the fixture
/// in their history are skipped.
pub fn build_conceded_points<P>(
    team_id: u32,
    fixtures: &[Fixture],
    summaries: &HashMap<u32, PlayerSummary>,
    position_of: P,
) -> ConcededPointsTable
where
    P: Fn(u32) -> Option<Position>,
{
    let mut table = ConcededPointsTable::new(team_id);
    for fixture in fixtures {
        let Some(location) = fixture.location_of(team_id) else {
            continue;
        };
        let opposing_side = location.opposite();
        let opponent = fixture.team_at(opposing_side);
        for player in fixture.bps().side(opposing_side) {
            let Some(position) = position_of(player.player_id) else {
                debug!("player {} has no known position", player.player_id);
                continue;
            };
            let Some(played) = summaries
                .get(&player.player_id)
                .and_then(|s| s.played_fixture(fixture.id))
            else {
                debug!(
                    "player {} has no history for fixture {}",
                    player.player_id, fixture.id
                );
                continue;
            };
            table.record(location, opponent, position, played.total_points);
        }
    }
    table
}

/// The full pipeline over one snapshot: conceded tables for every bootstrap
/// team, their averages, league extrema, scaled scores.
pub fn fdr_from_snapshot(
    bootstrap: &Bootstrap,
    fixtures: &[Fixture],
    summaries: &HashMap<u32, PlayerSummary>,
) -> FdrTable {
    let team_ids: Vec<u32> = bootstrap.teams.keys().copied().collect();
    let averages: BTreeMap<u32, TeamAverage> = team_ids
        .par_iter()
        .map(|&team_id| {
            let table = build_conceded_points(team_id, fixtures, summaries, |pid| {
                bootstrap.player_position(pid)
            });
            (team_id, table.team_average())
        })
        .collect();

    for (team_id, avg) in &averages {
        if avg.home.is_none() || avg.away.is_none() {
            warn!("team {team_id} lacks conceded data (home: {:?}, away: {:?})", avg.home, avg.away);
        }
    }

    let extrema = points_extrema(averages.values());
    for location in Location::ALL {
        if let Some(e) = extrema.at(location) {
            if e.min == e.max {
                warn!("{location:?}: all teams concede the same average, scoring midpoint");
            }
        }
    }

    calculate_fdr(&averages, &extrema, |team_id| {
        bootstrap
            .team_name(team_id)
            .map(str::to_string)
            .unwrap_or_else(|| team_id.to_string())
    })
}

impl<T: Transport> Fpl<T> {
    /// Points conceded by `team_id` this season, fetched fresh.
    pub fn team_points_against(&self, team_id: u32) -> Result<ConcededPointsTable> {
        let fixtures = self.team_fixtures(team_id)?;
        let played: Vec<Fixture> = fixtures
            .home
            .into_iter()
            .chain(fixtures.away)
            .collect();
        let opposing_ids: Vec<u32> = played
            .iter()
            .flat_map(|f| {
                let side = f.location_of(team_id).map(Location::opposite);
                side.map(|s| f.players().side(s).to_vec()).unwrap_or_default()
            })
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect();
        let summaries = self.get_player_summaries(&opposing_ids)?;
        let summaries: HashMap<u32, PlayerSummary> =
            summaries.into_iter().map(|s| (s.player_id, s)).collect();
        Ok(build_conceded_points(team_id, &played, &summaries, |pid| {
            self.bootstrap().player_position(pid)
        }))
    }

    /// FDR for every team. Any fetch failure fails the whole report.
    pub fn compute_fdr(&self) -> Result<FdrTable> {
        let fixtures = self
            .get_fixtures(&[], None)
            .context("fdr: fixtures fetch failed")?;
        let summaries = self
            .participant_summaries(&fixtures)
            .context("fdr: player summaries fetch failed")?;
        info!(
            "fdr: {} fixtures, {} player summaries",
            fixtures.len(),
            summaries.len()
        );
        let summaries: HashMap<u32, PlayerSummary> =
            summaries.into_iter().map(|s| (s.player_id, s)).collect();
        Ok(fdr_from_snapshot(self.bootstrap(), &fixtures, &summaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avg(home: Option<f64>, away: Option<f64>) -> TeamAverage {
        TeamAverage { home, away }
    }

    #[test]
    fn scale_maps_min_to_upper_and_max_to_lower() {
        assert_eq!(scale(2.0, 5.0, 1.0, 2.0, 6.0), 5.0);
        assert_eq!(scale(6.0, 5.0, 1.0, 2.0, 6.0), 1.0);
        assert_eq!(scale(4.0, 5.0, 1.0, 2.0, 6.0), 3.0);
    }

    #[test]
    fn scale_degenerate_domain_is_midpoint() {
        assert_eq!(scale(3.3, 5.0, 1.0, 3.3, 3.3), 3.0);
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert_eq!(average(Vec::<i32>::new()), None);
        assert_eq!(average(vec![1, 2, 3, 6]), Some(3.0));
        assert_eq!(average(vec![-1, 1]), Some(0.0));
    }

    #[test]
    fn extrema_skip_missing_locations() {
        let averages = [
            avg(Some(2.0), None),
            avg(Some(4.5), Some(1.0)),
            avg(None, Some(3.0)),
        ];
        let e = points_extrema(averages.iter());
        assert_eq!(e.home, Some(PointsExtrema { min: 2.0, max: 4.5 }));
        assert_eq!(e.away, Some(PointsExtrema { min: 1.0, max: 3.0 }));

        let none = points_extrema([avg(None, None)].iter());
        assert_eq!(none, LocationExtrema::default());
    }

    #[test]
    fn fdr_bounds_and_missing_data() {
        let averages: BTreeMap<u32, TeamAverage> = [
            (1, avg(Some(2.0), Some(3.0))),
            (2, avg(Some(3.0), Some(5.0))),
            (3, avg(Some(4.0), None)),
        ]
        .into_iter()
        .collect();
        let extrema = points_extrema(averages.values());
        let fdr = calculate_fdr(&averages, &extrema, |id| format!("T{id}"));

        assert_eq!(fdr["T1"], FdrScore { home: Some(5.0), away: Some(5.0) });
        assert_eq!(fdr["T2"], FdrScore { home: Some(3.0), away: Some(1.0) });
        assert_eq!(fdr["T3"], FdrScore { home: Some(1.0), away: None });
    }

    #[test]
    fn conceded_table_flattens_positions_and_opponents() {
        let mut table = ConcededPointsTable::new(1);
        table.record(Location::Home, 2, Position::Forward, 6);
        table.record(Location::Home, 2, Position::Defender, 1);
        table.record(Location::Home, 3, Position::Midfielder, 2);
        table.record(Location::Away, 4, Position::Goalkeeper, 3);

        assert_eq!(table.points(Location::Home).count(), 3);
        assert_eq!(table.average(Location::Home), Some(3.0));
        assert_eq!(table.team_average(), avg(Some(3.0), Some(3.0)));
        assert_eq!(ConcededPointsTable::new(9).team_average(), avg(None, None));
    }
}
