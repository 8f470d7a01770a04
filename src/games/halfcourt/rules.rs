//! Turn state machine: move validation, exchange resolution, scoring and win checks.
//!
//! Every operation takes the current `GameState` by reference and hands back a
//! new value. Nothing here mutates a state the caller still holds.

use rand::Rng;

use super::court;
use super::scoring::attempt_shot;
use super::types::*;

/// A made shot at or past this score ends the game.
pub const SUDDEN_DEATH_SCORE: u32 = 30;
/// Minimum score for a win-by-two finish.
pub const WINNING_SCORE: u32 = 11;
pub const WIN_MARGIN: u32 = 2;

/// Result of resolving one offense+defense exchange.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub state: GameState,
    pub shot: Option<ShotResult>,
    pub history: MoveHistory,
}

pub fn initialize_game(
    player1: PlayerSeed,
    player2: PlayerSeed,
    mode: GameMode,
    ai_difficulty: Option<AiDifficulty>,
) -> GameState {
    GameState {
        mode,
        player1: PlayerState::from_seed(player1, OFFENSE_START),
        player2: PlayerState::from_seed(player2, DEFENSE_START),
        possession: Side::Player1,
        move_count: 0,
        actual_dribbles: 0,
        current_turn: Role::Offense,
        offense_selection: None,
        status: GameStatus::Playing,
        winner: None,
        ai_difficulty,
    }
}

/// Fresh game with the same players and settings. Whoever had the ball when
/// the last game ended starts this one on defense.
pub fn rematch(previous: &GameState) -> GameState {
    let mut state = initialize_game(
        previous.player1.seed(),
        previous.player2.seed(),
        previous.mode,
        previous.ai_difficulty,
    );
    if previous.possession == Side::Player1 {
        state.possession = Side::Player2;
        state.player2.current_position = OFFENSE_START;
        state.player1.current_position = DEFENSE_START;
    }
    state
}

/// Can the side playing `role` move to `target`? Never mutates `state`.
///
/// Offense must dribble to an adjacent spot. Defense may stay put to contest
/// or step to an adjacent spot, three-point territory included.
pub fn validate_move(state: &GameState, target: PositionId, role: Role) -> bool {
    if !state.is_playing() {
        return false;
    }
    let current = state.position_of(role);
    match role {
        Role::Offense => court::is_adjacent(current, target),
        Role::Defense => target == current || court::is_adjacent(current, target),
    }
}

/// Like [`validate_move`], but understands the offense's shoot-now choice.
pub fn validate_selection(state: &GameState, selection: Selection, role: Role) -> bool {
    match (selection, role) {
        (Selection::ShootNow, Role::Offense) => state.is_playing(),
        (Selection::ShootNow, Role::Defense) => false,
        (Selection::Position(p), _) => validate_move(state, p, role),
    }
}

/// Every legal target for `role`, in adjacency order. Defense's stay option comes last.
pub fn legal_targets(state: &GameState, role: Role) -> Vec<PositionId> {
    let current = state.position_of(role);
    let mut targets = court::adjacent(current).to_vec();
    if role == Role::Defense {
        targets.push(current);
    }
    targets
}

/// Record the offense's choice and hand the turn to the defense.
///
/// Shoot-now is stored as the offense's current position. Returns `None`
/// when the selection is illegal or the defense is already up.
pub fn select_offense(state: &GameState, selection: Selection) -> Option<GameState> {
    if state.current_turn != Role::Offense || !validate_selection(state, selection, Role::Offense) {
        tracing::debug!(?selection, "offense selection rejected");
        return None;
    }
    let mut next = state.clone();
    next.offense_selection = Some(selection.target(state.position_of(Role::Offense)));
    next.current_turn = Role::Defense;
    Some(next)
}

/// Validate the defense's choice against the pending offense choice and
/// resolve the exchange.
pub fn select_defense<R: Rng + ?Sized>(
    state: &GameState,
    target: PositionId,
    exchange_number: u32,
    rng: &mut R,
) -> Option<ExchangeOutcome> {
    let offense_move = match (state.current_turn, state.offense_selection) {
        (Role::Defense, Some(m)) => m,
        _ => return None,
    };
    if !validate_move(state, target, Role::Defense) {
        tracing::debug!(target, "defense selection rejected");
        return None;
    }
    let force_shot = offense_move == state.position_of(Role::Offense);
    Some(process_move(state, offense_move, target, exchange_number, force_shot, rng))
}

/// Resolve one exchange. Callers validate both moves first.
pub fn process_move<R: Rng + ?Sized>(
    state: &GameState,
    offense_move: PositionId,
    defense_move: PositionId,
    exchange_number: u32,
    force_shot: bool,
    rng: &mut R,
) -> ExchangeOutcome {
    let offense_side = state.possession;
    let defense_side = offense_side.other();
    let offense_from = state.player(offense_side).current_position;
    let defense_from = state.player(defense_side).current_position;

    if !state.is_playing() {
        tracing::warn!(exchange_number, "exchange submitted to a finished game");
        return unchanged(state, exchange_number);
    }
    if court::position(offense_move).is_err() || court::position(defense_move).is_err() {
        tracing::warn!(
            exchange_number,
            offense = offense_move,
            defense = defense_move,
            "exchange names an unknown court position"
        );
        return unchanged(state, exchange_number);
    }

    let mut next = state.clone();
    next.player_mut(offense_side).current_position = offense_move;
    next.player_mut(defense_side).current_position = defense_move;
    next.move_count += 1;
    next.actual_dribbles += 1;

    // Defender beat the offense to the spot: one dribble burned.
    if offense_move == defense_move {
        next.move_count += 1;
    }
    let blocked = offense_move == defense_move && !force_shot;

    let mut shot = None;
    if force_shot || next.move_count >= MAX_DRIBBLES {
        let result = attempt_shot(
            rng,
            offense_move,
            defense_move,
            next.player(offense_side).archetype,
            next.player(defense_side).archetype,
            defense_from != defense_move,
        );
        apply_shot(&mut next, offense_side, offense_move, &result);
        shot = Some(result);
    }

    next.offense_selection = None;
    next.current_turn = Role::Offense;

    tracing::debug!(
        exchange_number,
        offense = offense_move,
        defense = defense_move,
        move_count = next.move_count,
        blocked,
        shot = shot.is_some(),
        "exchange resolved"
    );

    let history = history_entry(
        &next,
        exchange_number,
        offense_from,
        defense_from,
        offense_move,
        defense_move,
        force_shot,
        blocked,
        shot,
    );
    ExchangeOutcome { state: next, shot, history }
}

/// Rejected exchange: same state, no shot, positions recorded as they stand.
fn unchanged(state: &GameState, exchange_number: u32) -> ExchangeOutcome {
    let offense_from = state.position_of(Role::Offense);
    let defense_from = state.position_of(Role::Defense);
    ExchangeOutcome {
        state: state.clone(),
        shot: None,
        history: history_entry(state, exchange_number, offense_from, defense_from, offense_from, defense_from, false, false, None),
    }
}

fn apply_shot(state: &mut GameState, shooter: Side, spot: PositionId, result: &ShotResult) {
    let player = state.player_mut(shooter);
    player.score += result.points;
    player.shots_attempted += 1;
    if result.made {
        player.shots_made += 1;
    }
    if court::is_three_point(spot) {
        player.threes_attempted += 1;
        if result.made {
            player.threes_made += 1;
        }
    }

    if let Some(winner) = check_winner(state, shooter, result.made) {
        state.status = GameStatus::Finished;
        state.winner = Some(winner);
        tracing::info!(
            ?winner,
            player1 = state.player1.score,
            player2 = state.player2.score,
            "game over"
        );
        return;
    }

    // Make it, take it. Miss and the ball changes hands.
    state.possession = if result.made { shooter } else { shooter.other() };
    let offense = state.possession;
    state.player_mut(offense).current_position = OFFENSE_START;
    state.player_mut(offense.other()).current_position = DEFENSE_START;
    state.move_count = 0;
    state.actual_dribbles = 0;
}

/// Scores already include the shot. Sudden death is checked before win-by-two.
fn check_winner(state: &GameState, shooter: Side, made: bool) -> Option<Side> {
    let (p1, p2) = (state.player1.score, state.player2.score);
    if p1 >= SUDDEN_DEATH_SCORE || p2 >= SUDDEN_DEATH_SCORE {
        return made.then_some(shooter);
    }
    if p1 >= WINNING_SCORE && p1 >= p2 + WIN_MARGIN {
        return Some(Side::Player1);
    }
    if p2 >= WINNING_SCORE && p2 >= p1 + WIN_MARGIN {
        return Some(Side::Player2);
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn history_entry(
    state: &GameState,
    turn_number: u32,
    offense_from: PositionId,
    defense_from: PositionId,
    offense_position: PositionId,
    defense_position: PositionId,
    forced_shot: bool,
    blocked: bool,
    shot_result: Option<ShotResult>,
) -> MoveHistory {
    MoveHistory {
        turn_number,
        offense_from,
        defense_from,
        offense_position,
        defense_position,
        player1_position: state.player1.current_position,
        player2_position: state.player2.current_position,
        player1_score: state.player1.score,
        player2_score: state.player2.score,
        possession: state.possession,
        move_count: state.move_count,
        forced_shot,
        blocked,
        shot_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn make() -> StepRng {
        StepRng::new(0, 0)
    }

    fn miss() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn new_game() -> GameState {
        initialize_game(
            PlayerSeed::new("u1", "alice", Archetype::Shooter),
            PlayerSeed::new("u2", "bob", Archetype::Midrange),
            GameMode::Local,
            None,
        )
    }

    #[test]
    fn test_initial_state() {
        let s = new_game();
        assert_eq!(s.player1.current_position, 3);
        assert_eq!(s.player2.current_position, 8);
        assert_eq!(s.possession, Side::Player1);
        assert_eq!(s.move_count, 0);
        assert_eq!(s.actual_dribbles, 0);
        assert_eq!(s.current_turn, Role::Offense);
        assert_eq!(s.status, GameStatus::Playing);
        assert_eq!(s.difficulty(), AiDifficulty::Medium);
    }

    #[test]
    fn test_validate_offense_must_be_adjacent() {
        let s = new_game();
        assert!(validate_move(&s, 2, Role::Offense));
        assert!(validate_move(&s, 4, Role::Offense));
        assert!(!validate_move(&s, 3, Role::Offense));
        assert!(!validate_move(&s, 8, Role::Offense));
        assert!(validate_selection(&s, Selection::ShootNow, Role::Offense));
    }

    #[test]
    fn test_validate_defense_stay_or_adjacent() {
        let s = new_game();
        assert!(validate_move(&s, 8, Role::Defense));
        assert!(validate_move(&s, 2, Role::Defense));
        assert!(validate_move(&s, 11, Role::Defense));
        assert!(!validate_move(&s, 3, Role::Defense));
        assert!(!validate_selection(&s, Selection::ShootNow, Role::Defense));
    }

    #[test]
    fn test_validate_rejects_finished_game() {
        let mut s = new_game();
        s.status = GameStatus::Finished;
        assert!(!validate_move(&s, 2, Role::Offense));
        assert!(!validate_move(&s, 8, Role::Defense));
    }

    #[test]
    fn test_legal_targets() {
        let s = new_game();
        assert_eq!(legal_targets(&s, Role::Offense), vec![2, 4]);
        assert_eq!(legal_targets(&s, Role::Defense), vec![2, 4, 7, 9, 11, 8]);
    }

    #[test]
    fn test_plain_dribble_no_shot() {
        let s = new_game();
        let out = process_move(&s, 2, 7, 0, false, &mut make());
        assert!(out.shot.is_none());
        assert_eq!(out.state.move_count, 1);
        assert_eq!(out.state.actual_dribbles, 1);
        assert_eq!(out.state.player1.current_position, 2);
        assert_eq!(out.state.player2.current_position, 7);
        assert_eq!(out.history.offense_from, 3);
        assert_eq!(out.history.defense_from, 8);
        // Input untouched.
        assert_eq!(s.move_count, 0);
        assert_eq!(s.player1.current_position, 3);
    }

    #[test]
    fn test_block_burns_extra_dribble() {
        let mut s = new_game();
        s.player1.current_position = 8;
        s.player2.current_position = 9;
        let out = process_move(&s, 7, 7, 0, false, &mut make());
        assert_eq!(out.state.move_count, 2);
        assert_eq!(out.state.actual_dribbles, 1);
        assert!(out.shot.is_none());
        assert!(out.history.blocked);
    }

    #[test]
    fn test_third_dribble_triggers_shot() {
        let mut s = new_game();
        s.move_count = 2;
        s.actual_dribbles = 2;
        let out = process_move(&s, 2, 8, 2, false, &mut miss());
        let shot = out.shot.expect("shot clock should force a shot");
        assert!(!shot.made);
        assert_eq!(out.state.player1.shots_attempted, 1);
        assert_eq!(out.state.player1.threes_attempted, 1);
        assert_eq!(out.state.possession, Side::Player2);
        assert_eq!(out.state.move_count, 0);
        assert_eq!(out.state.actual_dribbles, 0);
        assert_eq!(out.state.player2.current_position, 3);
        assert_eq!(out.state.player1.current_position, 8);
    }

    #[test]
    fn test_block_can_trigger_shot() {
        let mut s = new_game();
        s.player1.current_position = 8;
        s.player2.current_position = 9;
        s.move_count = 1;
        let out = process_move(&s, 7, 7, 1, false, &mut miss());
        assert!(out.shot.is_some());
    }

    #[test]
    fn test_shoot_now_with_defender_standing() {
        let s = new_game();
        let picked = select_offense(&s, Selection::ShootNow).unwrap();
        assert_eq!(picked.offense_selection, Some(3));
        assert_eq!(picked.current_turn, Role::Defense);

        let out = select_defense(&picked, 8, 0, &mut make()).unwrap();
        let shot = out.shot.expect("shoot now always shoots");
        assert!(out.history.forced_shot);
        // Defender stayed at 8: full stand-still contest from 10 away.
        assert!((shot.probability - 0.40).abs() < 1e-9);
        assert!(shot.made);
        assert_eq!(shot.points, 2);
        assert_eq!(out.state.player1.score, 2);
        assert_eq!(out.state.possession, Side::Player1);
        assert_eq!(out.state.player1.current_position, 3);
        assert_eq!(out.state.player2.current_position, 8);
    }

    #[test]
    fn test_shoot_now_defender_moved_is_closeout() {
        let mut s = new_game();
        s.player2.current_position = 2;
        let picked = select_offense(&s, Selection::ShootNow).unwrap();
        let out = select_defense(&picked, 8, 0, &mut miss()).unwrap();
        let shot = out.shot.unwrap();
        assert!((shot.probability - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_select_defense_requires_pending_offense() {
        let s = new_game();
        assert!(select_defense(&s, 8, 0, &mut make()).is_none());
        let picked = select_offense(&s, Selection::Position(2)).unwrap();
        assert!(select_offense(&picked, Selection::Position(4)).is_none());
        assert!(select_defense(&picked, 5, 0, &mut make()).is_none());
        assert!(select_offense(&s, Selection::Position(9)).is_none());
    }

    #[test]
    fn test_make_keeps_possession_miss_flips() {
        let mut s = new_game();
        s.move_count = 2;
        let made = process_move(&s, 4, 8, 0, false, &mut make());
        assert!(made.shot.unwrap().made);
        assert_eq!(made.state.possession, Side::Player1);

        let missed = process_move(&s, 4, 8, 0, false, &mut miss());
        assert_eq!(missed.state.possession, Side::Player2);
    }

    #[test]
    fn test_sudden_death_precedence() {
        let mut s = new_game();
        s.player1.score = 29;
        s.player2.score = 20;
        let out = process_move(&s, 2, 8, 0, true, &mut make());
        // Forced shot from the wing, made for 2.
        assert_eq!(out.state.player1.score, 31);
        assert_eq!(out.state.status, GameStatus::Finished);
        assert_eq!(out.state.winner, Some(Side::Player1));
    }

    #[test]
    fn test_sudden_death_miss_continues() {
        let mut s = new_game();
        s.player1.score = 30;
        s.player2.score = 29;
        s.possession = Side::Player2;
        s.player2.current_position = 3;
        s.player1.current_position = 8;
        let out = process_move(&s, 2, 8, 0, true, &mut miss());
        assert_eq!(out.state.status, GameStatus::Playing);
        assert_eq!(out.state.possession, Side::Player1);
        assert_eq!(out.state.player1.current_position, 3);
    }

    #[test]
    fn test_win_by_two() {
        let mut s = new_game();
        s.player1.score = 10;
        s.player2.score = 9;
        s.player1.current_position = 8;
        s.player2.current_position = 2;
        s.move_count = 2;
        // Dribble to the paint; defender far away on the wing.
        let out = process_move(&s, 11, 2, 5, false, &mut make());
        let shot = out.shot.unwrap();
        assert_eq!(shot.points, 1);
        assert_eq!(out.state.player1.score, 11);
        assert_eq!(out.state.status, GameStatus::Finished);
        assert_eq!(out.state.winner, Some(Side::Player1));
        // Finished games keep their final positions.
        assert_eq!(out.state.player1.current_position, 11);
    }

    #[test]
    fn test_eleven_without_margin_continues() {
        let mut s = new_game();
        s.player1.score = 10;
        s.player2.score = 10;
        s.player1.current_position = 8;
        s.player2.current_position = 4;
        s.move_count = 2;
        // Elbow jumper is worth one: 11-10 is short of the margin.
        let out = process_move(&s, 7, 4, 0, false, &mut make());
        let shot = out.shot.unwrap();
        assert!(shot.made);
        assert_eq!(shot.points, 1);
        assert_eq!(out.state.player1.score, 11);
        assert_eq!(out.state.status, GameStatus::Playing);
        assert_eq!(out.state.winner, None);
        assert_eq!(out.state.possession, Side::Player1);
    }

    #[test]
    fn test_finished_game_is_frozen() {
        let mut s = new_game();
        s.status = GameStatus::Finished;
        s.winner = Some(Side::Player2);
        let out = process_move(&s, 2, 8, 3, true, &mut make());
        assert_eq!(out.state, s);
        assert!(out.shot.is_none());
    }

    #[test]
    fn test_unknown_position_leaves_state_untouched() {
        let s = new_game();
        let dribble = process_move(&s, 42, 8, 0, false, &mut make());
        assert_eq!(dribble.state, s);
        assert!(dribble.shot.is_none());
        assert_eq!(dribble.history.offense_position, 3);

        let forced = process_move(&s, 3, 0, 0, true, &mut make());
        assert_eq!(forced.state, s);
        assert!(forced.shot.is_none());
        assert_eq!(forced.history.defense_position, 8);
    }

    #[test]
    fn test_rematch_alternates_possession() {
        let mut s = new_game();
        s.player1.score = 11;
        s.status = GameStatus::Finished;
        let again = rematch(&s);
        assert_eq!(again.possession, Side::Player2);
        assert_eq!(again.player2.current_position, 3);
        assert_eq!(again.player1.current_position, 8);
        assert_eq!(again.player1.score, 0);
        assert_eq!(again.player1.username, "alice");

        let third = rematch(&again);
        assert_eq!(third.possession, Side::Player1);
        assert_eq!(third.player1.current_position, 3);
    }
}
