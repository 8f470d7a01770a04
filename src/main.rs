//! Play one seeded bot-vs-bot game and print its event stream.
//!
//! Usage:
//!   cargo run --bin halfcourt -- --p1 hard --p2 easy --seed 7
//!   cargo run --bin halfcourt -- --p1 sharp --p1-archetype shooter --json

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use halfcourt_engine::engine::bot_profiles::{load_default_profiles, load_profiles};
use halfcourt_engine::engine::models::GameEvent;
use halfcourt_engine::engine::simulator::{Controller, GameSession};
use halfcourt_engine::games::halfcourt::court;
use halfcourt_engine::games::halfcourt::rules::initialize_game;
use halfcourt_engine::games::halfcourt::types::{Archetype, GameMode, PlayerSeed, Selection, Side};

#[derive(Parser)]
#[command(name = "halfcourt", about = "Simulate a half-court one-on-one game between two bots")]
struct Cli {
    /// Random seed
    #[arg(long, default_value = "42", env = "HALFCOURT_SEED")]
    seed: u64,

    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, env = "HALFCOURT_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    /// Player 1 bot: a tier (easy, medium, hard) or a profile name
    #[arg(long, default_value = "hard")]
    p1: String,

    /// Player 2 bot: a tier (easy, medium, hard) or a profile name
    #[arg(long, default_value = "medium")]
    p2: String,

    #[arg(long, value_enum, default_value = "shooter")]
    p1_archetype: Archetype,

    #[arg(long, value_enum, default_value = "midrange")]
    p2_archetype: Archetype,

    /// Stop after this many exchanges even if nobody has won
    #[arg(long, default_value = "2000")]
    max_exchanges: u32,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

fn describe(event: &GameEvent) -> String {
    let seat = |s: &Side| match s {
        Side::Player1 => "P1",
        Side::Player2 => "P2",
    };
    let spot = |id: u8| court::position(id).map(|p| p.name).unwrap_or("?");
    match event {
        GameEvent::GameStarted { possession, .. } => format!("tip-off, {} has the ball", seat(possession)),
        GameEvent::OffenseSelected { side, selection, .. } => match selection {
            Selection::ShootNow => format!("{} pulls up", seat(side)),
            Selection::Position(p) => format!("{} drives to {}", seat(side), spot(*p)),
        },
        GameEvent::DefenseSelected { side, position, .. } => {
            format!("{} guards {}", seat(side), spot(*position))
        }
        GameEvent::Blocked { position, move_count } => {
            format!("  cut off at {} (dribbles now {})", spot(*position), move_count)
        }
        GameEvent::ShotTaken { shooter, position, result } => format!(
            "  {} shoots from {}: {} ({:.0}%, {} pts)",
            seat(shooter),
            spot(*position),
            if result.made { "GOOD" } else { "miss" },
            result.probability * 100.0,
            result.points
        ),
        GameEvent::ExchangeResolved { entry } => format!(
            "  [{}] {}-{}",
            entry.turn_number, entry.player1_score, entry.player2_score
        ),
        GameEvent::PossessionChanged { possession } => format!("  ball to {}", seat(possession)),
        GameEvent::GameOver { winner, player1_score, player2_score } => {
            format!("game over: {} wins {}-{}", seat(winner), player1_score, player2_score)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path)?,
        None => load_default_profiles(None),
    };
    let p1 = profiles
        .named_strategy(&cli.p1)
        .ok_or_else(|| format!("unknown bot '{}'", cli.p1))?;
    let p2 = profiles
        .named_strategy(&cli.p2)
        .ok_or_else(|| format!("unknown bot '{}'", cli.p2))?;

    let state = initialize_game(
        PlayerSeed::new("p1", cli.p1.clone(), cli.p1_archetype),
        PlayerSeed::new("p2", cli.p2.clone(), cli.p2_archetype),
        GameMode::Local,
        None,
    );
    let mut session = GameSession::new(
        state,
        Controller::Bot(p1),
        Controller::Bot(p2),
        StdRng::seed_from_u64(cli.seed),
    );
    tracing::info!(seed = cli.seed, p1 = %cli.p1, p2 = %cli.p2, "simulating game");

    let mut events = vec![session.started_event()];
    events.extend(session.play_out(cli.max_exchanges));

    for event in &events {
        if cli.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", describe(event));
        }
    }

    if session.state().is_playing() {
        tracing::warn!(exchanges = session.exchanges(), "exchange limit reached before a winner");
    }
    Ok(())
}
