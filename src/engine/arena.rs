//! Bot-vs-bot arena runner.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::bot_strategy::BotStrategy;
use crate::engine::simulator::{Controller, GameSession};
use crate::games::halfcourt::rules::initialize_game;
use crate::games::halfcourt::types::{Archetype, GameMode, GameStatus, PlayerSeed, Side};

/// Games still running after this many exchanges count as unfinished.
pub const MAX_EXCHANGES: u32 = 2_000;

/// One side of an arena matchup.
#[derive(Clone)]
pub struct Entrant {
    pub name: String,
    pub archetype: Archetype,
    pub strategy: Arc<dyn BotStrategy>,
}

/// Aggregated results from an arena run.
pub struct ArenaResult {
    pub num_games: usize,
    pub wins: HashMap<String, usize>,
    pub unfinished: usize,
    pub total_scores: HashMap<String, Vec<f64>>,
    pub exchanges_per_game: Vec<u32>,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, name: &str) -> f64 {
        match self.total_scores.get(name) {
            Some(s) if !s.is_empty() => s.iter().sum::<f64>() / s.len() as f64,
            _ => 0.0,
        }
    }

    pub fn score_stddev(&self, name: &str) -> f64 {
        let scores = match self.total_scores.get(name) {
            Some(s) if s.len() >= 2 => s,
            _ => return 0.0,
        };
        let avg = self.avg_score(name);
        let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (scores.len() - 1) as f64;
        variance.sqrt()
    }

    /// Wilson score interval for the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn avg_exchanges(&self) -> f64 {
        if self.exchanges_per_game.is_empty() {
            return 0.0;
        }
        self.exchanges_per_game.iter().map(|&e| e as f64).sum::<f64>() / self.exchanges_per_game.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        let mut names: Vec<&String> = self.wins.keys().collect();
        names.sort();
        for name in names {
            let wr = self.win_rate(name);
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]  avg={:5.1} +/- {:4.1}",
                name,
                self.wins[name],
                wr * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
                self.avg_score(name),
                self.score_stddev(name),
            ));
        }
        lines.push(format!("  {:>12}: {}", "Unfinished", self.unfinished));
        lines.push(format!("  Avg exchanges/game: {:.1}", self.avg_exchanges()));
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            lines.push(format!(
                "  Avg game: {:.2}ms  |  Total CPU: {:.1}s",
                total_ms / self.game_durations_ms.len() as f64,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

struct GameRecord {
    winner: Option<usize>,
    scores: [f64; 2],
    exchanges: u32,
    duration_ms: f64,
}

/// Play one seeded game. `first` is the entrant index seated as player1.
fn play_one_game(entrants: &[Entrant; 2], first: usize, seed: u64) -> GameRecord {
    let seats = [first, 1 - first];
    let seed_for = |i: usize| PlayerSeed::new(format!("bot-{i}"), entrants[seats[i]].name.clone(), entrants[seats[i]].archetype);
    let state = initialize_game(seed_for(0), seed_for(1), GameMode::Local, None);

    let t0 = Instant::now();
    let mut session = GameSession::new(
        state,
        Controller::Bot(Arc::clone(&entrants[seats[0]].strategy)),
        Controller::Bot(Arc::clone(&entrants[seats[1]].strategy)),
        StdRng::seed_from_u64(seed),
    );
    session.play_out(MAX_EXCHANGES);
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let state = session.state();
    let mut scores = [0.0; 2];
    scores[seats[0]] = state.player1.score as f64;
    scores[seats[1]] = state.player2.score as f64;
    let winner = match (state.status, state.winner) {
        (GameStatus::Finished, Some(Side::Player1)) => Some(seats[0]),
        (GameStatus::Finished, Some(Side::Player2)) => Some(seats[1]),
        _ => None,
    };
    GameRecord {
        winner,
        scores,
        exchanges: session.exchanges(),
        duration_ms,
    }
}

/// Run `num_games` between two entrants in parallel and aggregate the results.
///
/// Game `i` is seeded with `base_seed + i` (wrapping), so results do not depend on
/// scheduling. With `alternate_seats`, odd games swap who starts as player1.
pub fn run_arena(
    entrants: &[Entrant; 2],
    num_games: usize,
    base_seed: u64,
    alternate_seats: bool,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    let completed = AtomicUsize::new(0);
    let records: Vec<GameRecord> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let first = if alternate_seats { game_idx % 2 } else { 0 };
            let record = play_one_game(entrants, first, base_seed.wrapping_add(game_idx as u64));
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, num_games);
            }
            record
        })
        .collect();

    let mut result = ArenaResult {
        num_games,
        wins: entrants.iter().map(|e| (e.name.clone(), 0)).collect(),
        unfinished: 0,
        total_scores: entrants.iter().map(|e| (e.name.clone(), Vec::with_capacity(num_games))).collect(),
        exchanges_per_game: Vec::with_capacity(num_games),
        game_durations_ms: Vec::with_capacity(num_games),
    };

    for record in records {
        match record.winner {
            Some(i) => *result.wins.entry(entrants[i].name.clone()).or_default() += 1,
            None => result.unfinished += 1,
        }
        for (i, e) in entrants.iter().enumerate() {
            result.total_scores.entry(e.name.clone()).or_default().push(record.scores[i]);
        }
        result.exchanges_per_game.push(record.exchanges);
        result.game_durations_ms.push(record.duration_ms);
    }

    tracing::info!(games = num_games, unfinished = result.unfinished, "arena finished");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bot_strategy::{EvStrategy, RandomStrategy};

    fn entrants() -> [Entrant; 2] {
        [
            Entrant {
                name: "hard".into(),
                archetype: Archetype::Shooter,
                strategy: Arc::new(EvStrategy::hard()),
            },
            Entrant {
                name: "random".into(),
                archetype: Archetype::Shooter,
                strategy: Arc::new(RandomStrategy),
            },
        ]
    }

    #[test]
    fn test_arena_accounts_for_every_game() {
        let result = run_arena(&entrants(), 8, 42, true, None);
        let wins: usize = result.wins.values().sum();
        assert_eq!(wins + result.unfinished, 8);
        assert_eq!(result.exchanges_per_game.len(), 8);
        assert_eq!(result.total_scores["hard"].len(), 8);
        assert!(result.summary().contains("Arena Results (8 games)"));
    }

    #[test]
    fn test_arena_is_reproducible() {
        let a = run_arena(&entrants(), 6, 7, true, None);
        let b = run_arena(&entrants(), 6, 7, true, None);
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.exchanges_per_game, b.exchanges_per_game);
        assert_eq!(a.total_scores, b.total_scores);
    }

    #[test]
    fn test_seed_near_max_wraps() {
        let result = run_arena(&entrants(), 3, u64::MAX - 1, true, None);
        assert_eq!(result.exchanges_per_game.len(), 3);
    }

    #[test]
    fn test_wilson_interval_bounds() {
        let result = run_arena(&entrants(), 4, 1, false, None);
        let (lo, hi) = result.confidence_interval_95("hard");
        assert!(0.0 <= lo && lo <= hi && hi <= 1.0);
    }
}
