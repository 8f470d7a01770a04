//! Event stream emitted by a game session for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::games::halfcourt::types::{
    AiDifficulty, GameMode, MoveHistory, PositionId, Role, Selection, ShotResult, Side,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        mode: GameMode,
        #[serde(default)]
        ai_difficulty: Option<AiDifficulty>,
        possession: Side,
    },
    OffenseSelected {
        side: Side,
        selection: Selection,
        by_ai: bool,
    },
    DefenseSelected {
        side: Side,
        position: PositionId,
        by_ai: bool,
    },
    /// Offense dribbled onto the spot the defense picked.
    Blocked {
        position: PositionId,
        move_count: u32,
    },
    ShotTaken {
        shooter: Side,
        position: PositionId,
        result: ShotResult,
    },
    ExchangeResolved {
        entry: MoveHistory,
    },
    PossessionChanged {
        possession: Side,
    },
    GameOver {
        winner: Side,
        player1_score: u32,
        player2_score: u32,
    },
}

impl GameEvent {
    /// Role the event speaks for, when it is a selection.
    pub fn role(&self) -> Option<Role> {
        match self {
            GameEvent::OffenseSelected { .. } => Some(Role::Offense),
            GameEvent::DefenseSelected { .. } => Some(Role::Defense),
            _ => None,
        }
    }
}
