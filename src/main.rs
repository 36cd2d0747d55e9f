use anyhow::{Context, Result, anyhow};
use env_logger::Env;
use log::info;
use serde::Serialize;

use fpl_client::config::{ClientConfig, Credentials, load_dotenv};
use fpl_client::fpl::Fpl;
use fpl_client::http_client::HttpSession;

const USAGE: &str = "usage: fpl <command> [args]

commands:
  bonus <gameweek>              bonus per fixture (provisional while in play)
  fdr                           fixture difficulty rating for every team
  gameweek <id> [--live]        gameweek summary, optionally with live data
  league classic|h2h <id>       league standings (needs FPL_EMAIL/FPL_PASSWORD)
  player <id>...                player details with pp90 and vapm";

fn main() -> Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];
    let config = ClientConfig::from_env();

    match command.as_str() {
        "bonus" => run_bonus(config, rest),
        "fdr" => run_fdr(config),
        "gameweek" => run_gameweek(config, rest),
        "league" => run_league(config, rest),
        "player" => run_player(config, rest),
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'\n\n{USAGE}")),
    }
}

fn print_json<S: Serialize>(value: &S) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn parse_id<N: std::str::FromStr>(args: &[String], what: &str) -> Result<N> {
    args.iter()
        .find(|a| !a.starts_with("--"))
        .and_then(|a| a.trim().parse::<N>().ok())
        .ok_or_else(|| anyhow!("missing or invalid {what}\n\n{USAGE}"))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[derive(Serialize)]
struct FixtureBonus {
    fixture_id: u32,
    fixture: String,
    status: fpl_client::fixture::FixtureStatus,
    bonus: fpl_client::fixture::FixtureSidePair,
}

fn run_bonus(config: ClientConfig, args: &[String]) -> Result<()> {
    let gameweek: u32 = parse_id(args, "gameweek id")?;
    let fpl = Fpl::connect_anonymous(config)?;
    let fixtures = fpl.get_fixtures(&[], Some(gameweek))?;
    let rows = fixtures
        .iter()
        .map(|f| FixtureBonus {
            fixture_id: f.id,
            fixture: f.describe(fpl.bootstrap()),
            status: f.status(),
            bonus: f.bonus(true),
        })
        .collect::<Vec<_>>();
    print_json(&rows)
}

fn run_fdr(config: ClientConfig) -> Result<()> {
    let fpl = Fpl::connect_anonymous(config)?;
    let fdr = fpl.compute_fdr()?;
    print_json(&fdr)
}

fn run_gameweek(config: ClientConfig, args: &[String]) -> Result<()> {
    let gameweek: u32 = parse_id(args, "gameweek id")?;
    let fpl = Fpl::connect_anonymous(config)?;
    let gw = fpl.get_gameweek(gameweek, has_flag(args, "--live"))?;
    print_json(&gw)
}

fn logged_in(config: ClientConfig) -> Result<Fpl<HttpSession>> {
    let credentials = Credentials::from_env()?;
    let fpl = Fpl::connect(config)?;
    fpl.login(&credentials)?;
    Ok(fpl)
}

fn run_league(config: ClientConfig, args: &[String]) -> Result<()> {
    let Some(kind) = args.first() else {
        return Err(anyhow!("missing league kind\n\n{USAGE}"));
    };
    let league_id: u64 = parse_id(&args[1..], "league id")?;
    let fpl = logged_in(config)?;
    match kind.as_str() {
        "classic" => print_json(&fpl.get_classic_league(league_id)?),
        "h2h" => {
            let league = fpl.get_h2h_league(league_id)?;
            let matches = fpl.h2h_matches(&league, None)?;
            info!("h2h league {league_id}: {} matches", matches.len());
            print_json(&H2hReport { league, matches })
        }
        other => Err(anyhow!("unknown league kind '{other}'\n\n{USAGE}")),
    }
}

#[derive(Serialize)]
struct H2hReport {
    league: fpl_client::league::H2hLeague,
    matches: Vec<fpl_client::league::H2hMatch>,
}

#[derive(Serialize)]
struct PlayerReport<'a> {
    player: &'a fpl_client::player::Player,
    position: Option<fpl_client::player::Position>,
    team: Option<&'a str>,
    pp90: f64,
    vapm: f64,
}

fn run_player(config: ClientConfig, args: &[String]) -> Result<()> {
    let ids = args
        .iter()
        .filter_map(|a| a.trim().parse::<u32>().ok())
        .collect::<Vec<_>>();
    if ids.is_empty() {
        return Err(anyhow!("missing player id\n\n{USAGE}"));
    }
    let fpl = Fpl::connect_anonymous(config)?;
    let summaries = fpl.get_player_summaries(&ids)?;
    let mut reports = Vec::with_capacity(ids.len());
    for summary in &summaries {
        let player = fpl
            .player(summary.player_id)
            .with_context(|| format!("player {} not found", summary.player_id))?;
        reports.push(PlayerReport {
            player,
            position: player.position(),
            team: fpl.bootstrap().team_name(player.team),
            pp90: player.pp90(),
            vapm: player.vapm(summary.games_played()),
        });
    }
    print_json(&reports)
}
