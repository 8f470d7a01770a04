//! Expected-value heuristics used by the computer opponent.

use rand::Rng;

use crate::engine::sampling::argmax_random;

use super::court;
use super::scoring::calculate_shot_probability;
use super::types::{Archetype, PositionId};

/// Anti-repetition penalty for a position the role used recently.
pub const REPETITION_PENALTY: f64 = -0.05;

pub fn points_for_position(id: PositionId) -> f64 {
    court::zone_of(id).points() as f64
}

/// Make probability times point value.
pub fn shot_ev(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
    defender_moved: bool,
) -> f64 {
    let p = calculate_shot_probability(offense, defense, offense_archetype, defense_archetype, defender_moved);
    p.final_probability * points_for_position(offense)
}

/// EV of shooting from `offense` when the defense answers with its best move
/// from `defense`: every legal defensive reply is tried and the minimum kept.
pub fn best_defense_ev(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
) -> f64 {
    court::adjacent(defense)
        .iter()
        .copied()
        .chain(std::iter::once(defense))
        .map(|reply| shot_ev(offense, reply, offense_archetype, defense_archetype, reply != defense))
        .fold(f64::INFINITY, f64::min)
}

/// Nudges each archetype toward the zones it shoots best from.
pub fn archetype_zone_bias(archetype: Archetype, id: PositionId) -> f64 {
    let three = court::is_three_point(id);
    let paint = id == court::PAINT;
    match archetype {
        Archetype::Shooter => {
            if three {
                0.10
            } else if paint {
                -0.05
            } else {
                0.0
            }
        }
        Archetype::Midrange => {
            if paint || three {
                -0.02
            } else {
                0.08
            }
        }
        Archetype::Defender => {
            if paint {
                0.10
            } else if three {
                -0.03
            } else {
                0.04
            }
        }
    }
}

/// EV of each dribble the offense can make from `offense`, in adjacency order.
pub fn offense_move_evs(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
) -> Vec<(PositionId, f64)> {
    court::adjacent(offense)
        .iter()
        .map(|&next| (next, best_defense_ev(next, defense, offense_archetype, defense_archetype)))
        .collect()
}

/// The offense's most dangerous next dribble against a defender at `defense`.
/// Ties are broken uniformly at random. Falls back to `offense` itself when
/// it has nowhere to go.
pub fn predict_offense_move<R: Rng + ?Sized>(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
    rng: &mut R,
) -> PositionId {
    let evs = offense_move_evs(offense, defense, offense_archetype, defense_archetype);
    argmax_random(&evs, rng).unwrap_or(offense)
}
