//! Game session loop: couples the turn state machine with the AI policy.
//! Used by the CLIs and the arena.
//!
//! The session owns the one authoritative `GameState`, a per-seat `AiMemory`
//! and the injected random source. Each accepted selection advances the
//! state and returns the events it produced; the caller decides pacing.

use std::sync::Arc;

use rand::RngCore;

use crate::engine::bot_strategy::{AiMemory, AiPolicy, BotStrategy};
use crate::engine::models::GameEvent;
use crate::games::halfcourt::rules::{self, legal_targets, validate_selection};
use crate::games::halfcourt::types::{GameMode, GameState, MoveHistory, Role, Selection, Side};

/// Who fills a seat.
#[derive(Clone)]
pub enum Controller {
    Human,
    Bot(Arc<dyn BotStrategy>),
}

impl Controller {
    pub fn is_bot(&self) -> bool {
        matches!(self, Controller::Bot(_))
    }
}

fn seat(side: Side) -> usize {
    match side {
        Side::Player1 => 0,
        Side::Player2 => 1,
    }
}

pub struct GameSession<R: RngCore> {
    state: GameState,
    controllers: [Controller; 2],
    memories: [AiMemory; 2],
    history: Vec<MoveHistory>,
    exchanges: u32,
    rng: R,
}

impl<R: RngCore> GameSession<R> {
    pub fn new(state: GameState, player1: Controller, player2: Controller, rng: R) -> Self {
        Self {
            state,
            controllers: [player1, player2],
            memories: [AiMemory::new(), AiMemory::new()],
            history: Vec::new(),
            exchanges: 0,
            rng,
        }
    }

    /// Seats filled the way `state.mode` implies: in `ai` mode player2 is the
    /// computer at the state's difficulty; `local` and `online` are all human.
    pub fn for_mode(state: GameState, policy: &AiPolicy, rng: R) -> Self {
        let player2 = match state.mode {
            GameMode::Ai => Controller::Bot(policy.strategy(state.difficulty())),
            GameMode::Local | GameMode::Online => Controller::Human,
        };
        Self::new(state, Controller::Human, player2, rng)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[MoveHistory] {
        &self.history
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    pub fn memory(&self, side: Side) -> &AiMemory {
        &self.memories[seat(side)]
    }

    pub fn controller(&self, side: Side) -> &Controller {
        &self.controllers[seat(side)]
    }

    pub fn started_event(&self) -> GameEvent {
        GameEvent::GameStarted {
            mode: self.state.mode,
            ai_difficulty: self.state.ai_difficulty,
            possession: self.state.possession,
        }
    }

    /// Role whose decision is pending, or `None` once the game is over.
    pub fn pending_role(&self) -> Option<Role> {
        self.state.is_playing().then_some(self.state.current_turn)
    }

    /// Pending role when a bot holds that seat.
    pub fn pending_ai_role(&self) -> Option<Role> {
        let role = self.pending_role()?;
        self.controllers[seat(self.state.side_for(role))].is_bot().then_some(role)
    }

    /// Input for whichever role is pending. `None` when the selection is
    /// illegal or the game is over; the state is left untouched.
    pub fn select_position(&mut self, selection: Selection) -> Option<Vec<GameEvent>> {
        self.apply(selection, false)
    }

    /// Ask the bot holding the pending seat for its move and apply it.
    pub fn step_ai(&mut self) -> Option<Vec<GameEvent>> {
        let role = self.pending_ai_role()?;
        let idx = seat(self.state.side_for(role));
        let strategy = match &self.controllers[idx] {
            Controller::Bot(s) => Arc::clone(s),
            Controller::Human => return None,
        };

        let mut selection = strategy.choose_move(&self.state, role, &mut self.memories[idx], &mut self.rng);
        if !validate_selection(&self.state, selection, role) {
            tracing::warn!(?selection, ?role, strategy = strategy.name(), "bot proposed an illegal move");
            selection = match legal_targets(&self.state, role).last() {
                Some(&p) => Selection::Position(p),
                None => Selection::ShootNow,
            };
        }
        self.apply(selection, true)
    }

    /// Let bots act until a human is up or the game ends.
    pub fn run_until_human(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Some(mut step) = self.step_ai() {
            events.append(&mut step);
        }
        events
    }

    /// Drive a bot-vs-bot game to the end, or until `max_exchanges` resolve.
    pub fn play_out(&mut self, max_exchanges: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while self.exchanges < max_exchanges {
            match self.step_ai() {
                Some(mut step) => events.append(&mut step),
                None => break,
            }
        }
        events
    }

    /// New game with the same seats and settings, possession alternated.
    /// AI memory and the history log start over.
    pub fn restart_current_game(&mut self) -> GameEvent {
        self.state = rules::rematch(&self.state);
        for m in &mut self.memories {
            m.clear();
        }
        self.history.clear();
        self.exchanges = 0;
        self.started_event()
    }

    fn apply(&mut self, selection: Selection, by_ai: bool) -> Option<Vec<GameEvent>> {
        let role = self.pending_role()?;
        let side = self.state.side_for(role);
        match role {
            Role::Offense => {
                self.state = rules::select_offense(&self.state, selection)?;
                Some(vec![GameEvent::OffenseSelected { side, selection, by_ai }])
            }
            Role::Defense => {
                let target = match selection {
                    Selection::Position(p) => p,
                    Selection::ShootNow => return None,
                };
                let offense_side = self.state.possession;
                let outcome = rules::select_defense(&self.state, target, self.exchanges, &mut self.rng)?;

                let mut events = vec![GameEvent::DefenseSelected { side, position: target, by_ai }];
                let entry = &outcome.history;
                if entry.blocked {
                    events.push(GameEvent::Blocked {
                        position: target,
                        move_count: self.state.move_count + 2,
                    });
                }
                if let Some(result) = outcome.shot {
                    events.push(GameEvent::ShotTaken {
                        shooter: offense_side,
                        position: entry.offense_position,
                        result,
                    });
                }
                events.push(GameEvent::ExchangeResolved { entry: entry.clone() });

                let next = &outcome.state;
                match next.winner {
                    Some(winner) if !next.is_playing() => events.push(GameEvent::GameOver {
                        winner,
                        player1_score: next.player1.score,
                        player2_score: next.player2.score,
                    }),
                    _ if next.possession != offense_side => {
                        events.push(GameEvent::PossessionChanged { possession: next.possession })
                    }
                    _ => {}
                }

                self.exchanges += 1;
                self.history.push(outcome.history);
                self.state = outcome.state;
                Some(events)
            }
        }
    }
}
