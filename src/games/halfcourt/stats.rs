//! Per-mode career stats, keyed by a closed set of mode keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{AiDifficulty, GameMode, GameState, GameStatus, PlayerState, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKey {
    Local,
    Online,
    PracticeEasy,
    PracticeMedium,
    PracticeHard,
}

impl ModeKey {
    pub fn for_game(mode: GameMode, difficulty: Option<AiDifficulty>) -> Self {
        match mode {
            GameMode::Local => ModeKey::Local,
            GameMode::Online => ModeKey::Online,
            GameMode::Ai => match difficulty.unwrap_or_default() {
                AiDifficulty::Easy => ModeKey::PracticeEasy,
                AiDifficulty::Medium => ModeKey::PracticeMedium,
                AiDifficulty::Hard => ModeKey::PracticeHard,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_scored: u32,
    pub shots_made: u32,
    pub shots_attempted: u32,
    pub threes_made: u32,
    pub threes_attempted: u32,
}

impl ModeStats {
    pub fn record(&mut self, player: &PlayerState, won: bool) {
        self.games_played += 1;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points_scored += player.score;
        self.shots_made += player.shots_made;
        self.shots_attempted += player.shots_attempted;
        self.threes_made += player.threes_made;
        self.threes_attempted += player.threes_attempted;
    }

    pub fn shooting_pct(&self) -> f64 {
        if self.shots_attempted == 0 {
            0.0
        } else {
            self.shots_made as f64 / self.shots_attempted as f64
        }
    }
}

/// Stats for one player across every mode they have played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsBook {
    pub modes: BTreeMap<ModeKey, ModeStats>,
}

impl StatsBook {
    /// Fold a finished game into the book from `side`'s point of view.
    /// Games still in progress are ignored; returns whether anything was recorded.
    pub fn record_game(&mut self, state: &GameState, side: Side) -> bool {
        if state.status != GameStatus::Finished {
            return false;
        }
        let key = ModeKey::for_game(state.mode, state.ai_difficulty);
        let won = state.winner == Some(side);
        self.modes.entry(key).or_default().record(state.player(side), won);
        true
    }

    pub fn get(&self, key: ModeKey) -> Option<&ModeStats> {
        self.modes.get(&key)
    }
}
