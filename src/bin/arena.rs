//! Arena CLI: run bot-vs-bot experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 500 --p1 hard --p2 easy
//!   cargo run --release --bin arena -- --games 200 --p1 sharp --p1-archetype defender --profiles bot_profiles.toml

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use halfcourt_engine::engine::arena::{run_arena, Entrant};
use halfcourt_engine::engine::bot_profiles::{load_default_profiles, load_profiles, BotProfilesFile};
use halfcourt_engine::games::halfcourt::types::Archetype;

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for half-court one-on-one")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed; game i uses seed + i
    #[arg(long, default_value = "42", env = "HALFCOURT_SEED")]
    seed: u64,

    /// Alternate who starts with the ball between games
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    alternate_seats: bool,

    /// Path to bot_profiles.toml
    #[arg(long, env = "HALFCOURT_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    /// P1 bot: a tier (easy, medium, hard) or a profile name
    #[arg(long, default_value = "hard")]
    p1: String,

    #[arg(long, value_enum, default_value = "shooter")]
    p1_archetype: Archetype,

    /// P2 bot: a tier (easy, medium, hard) or a profile name
    #[arg(long, default_value = "easy")]
    p2: String,

    #[arg(long, value_enum, default_value = "shooter")]
    p2_archetype: Archetype,
}

fn build_entrant(
    profiles: &BotProfilesFile,
    bot: &str,
    archetype: Archetype,
    label: &str,
) -> Result<Entrant, String> {
    let strategy = profiles.named_strategy(bot).ok_or_else(|| {
        let mut known: Vec<&String> = profiles.profiles.keys().collect();
        known.sort();
        format!("unknown bot '{bot}' (tiers: easy, medium, hard; profiles: {known:?})")
    })?;
    eprintln!("  {label}: bot={bot}, strategy={}, archetype={}", strategy.name(), archetype.as_str());
    Ok(Entrant {
        name: format!("{label}:{bot}"),
        archetype,
        strategy,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path)?,
        None => load_default_profiles(None),
    };

    eprintln!("Arena: {} games, seed={}, alternate_seats={}", cli.games, cli.seed, cli.alternate_seats);
    let entrants = [
        build_entrant(&profiles, &cli.p1, cli.p1_archetype, "p1")?,
        build_entrant(&profiles, &cli.p2, cli.p2_archetype, "p2")?,
    ];
    eprintln!();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        if done % 10 == 0 || done == total {
            eprint!("\r  [{}/{}] games completed", done, total);
        }
    };

    let result = run_arena(&entrants, cli.games, cli.seed, cli.alternate_seats, Some(&progress_cb));

    eprintln!("\r                                    ");
    println!("{}", result.summary());
    Ok(())
}
