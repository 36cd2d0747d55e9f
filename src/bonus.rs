use std::collections::BTreeMap;

use crate::fixture::{Fixture, FixtureSidePair, PlayerEvent, StatCategory};

/// Bonus for the highest BPS; each tie group spends one point per member.
pub const BONUS_POOL: i32 = 3;

/// Bonus points for a fixture.
///
/// A finished fixture returns its published `bonus` table unchanged. A
/// started, unfinished fixture with `provisional` set gets the live estimate
/// from [`provisional_bonus`]. Anything else is an empty pair.
pub fn allocate_bonus(fixture: &Fixture, provisional: bool) -> FixtureSidePair {
    if fixture.finished {
        return fixture.stat(&StatCategory::Bonus).clone();
    }
    if fixture.started && provisional {
        return provisional_bonus(fixture.bps(), fixture.team_home);
    }
    FixtureSidePair::empty()
}

/// Ranks every player in the fixture by BPS (both sides pooled) and awards
/// 3-2-1 with ties sharing the same award.
///
/// The remaining pool drops by the size of each tie group, so two players
/// tied on top both get 3 and the next group gets 1. Everyone inside a group
/// receives the same award even when that hands out more than 3 in total.
pub fn provisional_bonus(bps: &FixtureSidePair, team_home: u32) -> FixtureSidePair {
    let mut by_value: BTreeMap<i32, Vec<&PlayerEvent>> = BTreeMap::new();
    for player in bps.iter() {
        by_value.entry(player.value).or_default().push(player);
    }

    let mut out = FixtureSidePair::empty();
    let mut remaining_pool = BONUS_POOL;
    for (_, group) in by_value.iter().rev() {
        if remaining_pool <= 0 {
            break;
        }
        for player in group {
            let award = PlayerEvent {
                player_id: player.player_id,
                value: remaining_pool,
                team: player.team,
            };
            if award.team == team_home {
                out.home.push(award);
            } else {
                out.away.push(award);
            }
        }
        remaining_pool -= group.len() as i32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: u32 = 16;
    const AWAY: u32 = 3;

    fn ev(player_id: u32, value: i32, team: u32) -> PlayerEvent {
        PlayerEvent {
            player_id,
            value,
            team,
        }
    }

    fn awards(pair: &FixtureSidePair) -> Vec<(u32, i32)> {
        let mut out: Vec<(u32, i32)> = pair.iter().map(|p| (p.player_id, p.value)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        out
    }

    #[test]
    fn distinct_top_three_get_three_two_one() {
        let bps = FixtureSidePair {
            home: vec![ev(321, 31, HOME), ev(328, 23, HOME)],
            away: vec![ev(494, 34, AWAY), ev(67, 30, AWAY), ev(59, 26, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(494, 3), (321, 2), (67, 1)]);
        assert_eq!(bonus.home, vec![ev(321, 2, HOME)]);
        assert_eq!(bonus.away, vec![ev(494, 3, AWAY), ev(67, 1, AWAY)]);
    }

    #[test]
    fn two_way_tie_on_top_skips_second_place() {
        let bps = FixtureSidePair {
            home: vec![ev(1, 40, HOME), ev(2, 35, HOME), ev(3, 20, HOME)],
            away: vec![ev(4, 40, AWAY), ev(5, 30, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(1, 3), (4, 3), (2, 1)]);
    }

    #[test]
    fn tie_for_second_both_get_two() {
        let bps = FixtureSidePair {
            home: vec![ev(1, 50, HOME), ev(2, 30, HOME)],
            away: vec![ev(3, 30, AWAY), ev(4, 29, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(1, 3), (2, 2), (3, 2)]);
    }

    #[test]
    fn wide_tie_on_third_all_get_one() {
        let bps = FixtureSidePair {
            home: vec![ev(1, 50, HOME), ev(2, 40, HOME), ev(3, 10, HOME)],
            away: vec![ev(4, 10, AWAY), ev(5, 10, AWAY), ev(6, 5, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(1, 3), (2, 2), (3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn three_way_tie_on_top_exhausts_pool() {
        let bps = FixtureSidePair {
            home: vec![ev(1, 25, HOME), ev(2, 25, HOME)],
            away: vec![ev(3, 25, AWAY), ev(4, 24, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn negative_bps_still_ranks() {
        let bps = FixtureSidePair {
            home: vec![ev(1, -2, HOME), ev(2, 0, HOME)],
            away: vec![ev(3, -5, AWAY), ev(4, -1, AWAY)],
        };
        let bonus = provisional_bonus(&bps, HOME);
        assert_eq!(awards(&bonus), vec![(2, 3), (4, 2), (1, 1)]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = FixtureSidePair {
            home: vec![ev(1, 10, HOME), ev(2, 20, HOME)],
            away: vec![ev(3, 30, AWAY), ev(4, 20, AWAY)],
        };
        let b = FixtureSidePair {
            home: vec![ev(2, 20, HOME), ev(1, 10, HOME)],
            away: vec![ev(4, 20, AWAY), ev(3, 30, AWAY)],
        };
        assert_eq!(
            awards(&provisional_bonus(&a, HOME)),
            awards(&provisional_bonus(&b, HOME))
        );
    }

    #[test]
    fn no_bps_is_empty() {
        let bonus = provisional_bonus(&FixtureSidePair::empty(), HOME);
        assert!(bonus.is_empty());
    }
}
