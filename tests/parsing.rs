use std::fs;
use std::path::PathBuf;

use fpl_client::fixture::{
    Fixture, FixtureStatus, Location, PlayerEvent, StatCategory, parse_fixture_json,
    parse_fixtures_json,
};
use fpl_client::player::parse_player_summary_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn load(name: &str) -> Fixture {
    parse_fixture_json(&read_fixture(name)).expect("fixture should parse")
}

fn ids(events: &[PlayerEvent]) -> Vec<(u32, i32)> {
    events.iter().map(|e| (e.player_id, e.value)).collect()
}

#[test]
fn parses_finished_fixture() {
    let fixture = load("fixture_finished.json");
    assert_eq!(fixture.id, 57);
    assert_eq!(fixture.gameweek, Some(6));
    assert_eq!(fixture.team_home, 16);
    assert_eq!(fixture.team_away, 3);
    assert_eq!(fixture.status(), FixtureStatus::Finished);
    assert_eq!(fixture.to_string(), "16 vs. 3 - 2018-09-23T12:30:00Z");

    assert_eq!(ids(&fixture.goalscorers().away), vec![(494, 1), (67, 1)]);
    assert_eq!(ids(&fixture.saves().home), vec![(314, 2)]);
    assert!(fixture.own_goalscorers().is_empty());
    assert_eq!(fixture.yellow_cards().len(), 3);
    assert!(fixture.bps().home.iter().all(|p| p.team == 16));
    assert!(fixture.bps().away.iter().all(|p| p.team == 3));
}

#[test]
fn missing_categories_read_as_empty() {
    let fixture = load("fixture_in_progress.json");
    assert!(fixture.red_cards().is_empty());
    assert!(fixture.penalty_misses().is_empty());
    assert!(fixture.stat(&StatCategory::Other("threat".into())).is_empty());

    let fixture = load("fixture_not_started.json");
    assert_eq!(fixture.status(), FixtureStatus::NotStarted);
    assert!(fixture.kickoff_time.is_none());
    assert!(fixture.stats.is_empty());
    assert_eq!(fixture.to_string(), "3 vs. 16");
}

#[test]
fn finished_fixture_returns_published_bonus() {
    let fixture = load("fixture_finished.json");
    let bonus = fixture.bonus(true);
    assert_eq!(ids(&bonus.home), vec![(321, 2)]);
    assert_eq!(ids(&bonus.away), vec![(494, 3), (67, 1)]);
    assert_eq!(bonus, fixture.bonus(false));
}

#[test]
fn in_progress_fixture_gets_provisional_bonus() {
    let fixture = load("fixture_in_progress.json");
    assert_eq!(fixture.status(), FixtureStatus::InProgress);

    let bonus = fixture.bonus(true);
    // 321 and 494 tie on 31 and both take 3; 325 and 67 tie on 24 and take 1.
    assert_eq!(ids(&bonus.home), vec![(321, 3), (325, 1)]);
    assert_eq!(ids(&bonus.away), vec![(494, 3), (67, 1)]);
    assert!(bonus.home.iter().all(|p| p.team == 16));
    assert!(bonus.away.iter().all(|p| p.team == 3));

    assert!(fixture.bonus(false).is_empty());
}

#[test]
fn not_started_fixture_has_no_bonus() {
    let fixture = load("fixture_not_started.json");
    assert!(fixture.bonus(true).is_empty());
    assert!(fixture.bonus(false).is_empty());
}

#[test]
fn fixture_list_and_players() {
    let raw = format!(
        "[{}, {}]",
        read_fixture("fixture_finished.json"),
        read_fixture("fixture_in_progress.json")
    );
    let fixtures = parse_fixtures_json(&raw).expect("list should parse");
    assert_eq!(fixtures.len(), 2);
    assert!(parse_fixtures_json("null").expect("null is empty").is_empty());

    let players = fixtures[1].players();
    assert_eq!(players.home, vec![321, 325, 314]);
    assert_eq!(players.side(Location::Away), &[494, 67, 72]);
    assert_eq!(fixtures[1].location_of(3), Some(Location::Away));
    assert_eq!(fixtures[1].location_of(9), None);
}

#[test]
fn parses_player_summary() {
    let summary =
        parse_player_summary_json(321, &read_fixture("element_summary.json")).expect("summary");
    assert_eq!(summary.player_id, 321);
    assert_eq!(summary.played_fixtures.len(), 3);
    assert_eq!(summary.played_fixture(57).map(|f| f.total_points), Some(9));
    assert_eq!(summary.games_played(), 2);
    assert_eq!(summary.future_fixtures[&120].opponent(), 3);
    assert_eq!(summary.historic_seasons[0].season_name, "2017/18");
}

#[test]
fn null_and_missing_fields_default() {
    let fixture = parse_fixture_json(
        r#"{"id": 1, "code": null, "team_h": 1, "team_a": 2, "minutes": null, "stats": [
            {"identifier": "bps", "h": [{"element": 10, "value": null}], "a": null}
        ]}"#,
    )
    .expect("nulls should default");
    assert_eq!(fixture.code, 0);
    assert_eq!(fixture.minutes, 0);
    assert_eq!(ids(&fixture.bps().home), vec![(10, 0)]);
    assert!(fixture.bps().away.is_empty());

    let fixture = parse_fixture_json(r#"{"stats": [{"identifier": "saves", "h": [{}]}]}"#)
        .expect("missing keys should default");
    assert_eq!((fixture.id, fixture.team_home, fixture.team_away), (0, 0, 0));
    assert_eq!(ids(&fixture.saves().home), vec![(0, 0)]);

    let raw = format!(
        r#"[{}, {{"id": null, "team_h": null, "team_a": 4, "stats": null}}]"#,
        read_fixture("fixture_finished.json")
    );
    let fixtures = parse_fixtures_json(&raw).expect("one sparse fixture keeps the list");
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[1].team_away, 4);
    assert!(fixtures[1].stats.is_empty());
}

#[test]
fn serialized_fixture_reads_back() {
    for name in [
        "fixture_finished.json",
        "fixture_in_progress.json",
        "fixture_not_started.json",
    ] {
        let fixture = load(name);
        let json = serde_json::to_string(&fixture).expect("fixture serializes");
        let back: Fixture = serde_json::from_str(&json).expect("serialized fixture parses");
        assert_eq!(back, fixture, "{name}");
    }

    let value = serde_json::to_value(load("fixture_finished.json")).expect("fixture serializes");
    assert_eq!(value["team_h"], 16);
    assert_eq!(value["kickoff_time"], "2018-09-23T12:30:00Z");
}
