//! Shot probability model and shot resolution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::court::{self, CourtError};
use super::types::{Archetype, PositionId, ShotResult, Zone};

/// Defender three or more circles away: wide open.
pub const WIDE_OPEN_DISTANCE: f64 = 25.0;
pub const WIDE_OPEN_BONUS: f64 = 0.15;
/// Defender closer than this contests the shot.
pub const CONTEST_DISTANCE: f64 = 15.0;
pub const DEFENDER_ARCHETYPE_PENALTY: f64 = 0.05;
/// Defender stayed home and contested.
pub const STAND_CONTEST_PENALTY: f64 = 0.35;
/// Defender closed out to the shooter.
pub const CLOSEOUT_PENALTY: f64 = 0.20;
/// Contest from behind the shooter costs half.
pub const BEHIND_FACTOR: f64 = 0.5;

/// Base make rates for one archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRates {
    pub three: f64,
    pub mid: f64,
    pub paint: f64,
}

impl ZoneRates {
    pub fn for_zone(&self, zone: Zone) -> f64 {
        match zone {
            Zone::Three => self.three,
            Zone::Mid => self.mid,
            Zone::Paint => self.paint,
        }
    }
}

pub fn archetype_rates(archetype: Archetype) -> ZoneRates {
    match archetype {
        Archetype::Shooter => ZoneRates { three: 0.75, mid: 0.50, paint: 0.25 },
        Archetype::Midrange => ZoneRates { three: 0.50, mid: 0.75, paint: 0.50 },
        Archetype::Defender => ZoneRates { three: 0.25, mid: 0.50, paint: 0.75 },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotProbability {
    #[serde(rename = "final")]
    pub final_probability: f64,
    pub base: f64,
}

/// Defender sits next to the shooter but farther from the basket.
pub fn is_defender_behind(offense: PositionId, defense: PositionId) -> bool {
    court::is_adjacent(offense, defense)
        && court::distance_to_basket(defense) > court::distance_to_basket(offense)
}

fn base_probability(
    zone: Zone,
    distance: f64,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
) -> f64 {
    let mut p = archetype_rates(offense_archetype).for_zone(zone);
    if distance >= WIDE_OPEN_DISTANCE {
        p += WIDE_OPEN_BONUS;
    }
    if defense_archetype == Archetype::Defender {
        p -= DEFENDER_ARCHETYPE_PENALTY;
    }
    p.clamp(0.0, 1.0)
}

pub fn try_shot_probability(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
    defender_moved: bool,
) -> Result<ShotProbability, CourtError> {
    let zone = court::position(offense)?.zone();
    let distance = court::try_distance(offense, defense)?;
    let base = base_probability(zone, distance, offense_archetype, defense_archetype);

    let mut p = base;
    if distance < CONTEST_DISTANCE {
        let penalty = if defender_moved { CLOSEOUT_PENALTY } else { STAND_CONTEST_PENALTY };
        let scale = if is_defender_behind(offense, defense) { BEHIND_FACTOR } else { 1.0 };
        p -= penalty * scale;
    }

    Ok(ShotProbability {
        final_probability: p.clamp(0.0, 1.0),
        base,
    })
}

/// Make probability for a shot from `offense` with the defender at `defense`.
///
/// Both ids must be valid court positions.
pub fn calculate_shot_probability(
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
    defender_moved: bool,
) -> ShotProbability {
    try_shot_probability(offense, defense, offense_archetype, defense_archetype, defender_moved)
        .unwrap_or_else(|e| panic!("shot probability: {e}"))
}

/// Resolve one shot with a single uniform draw.
pub fn attempt_shot<R: Rng + ?Sized>(
    rng: &mut R,
    offense: PositionId,
    defense: PositionId,
    offense_archetype: Archetype,
    defense_archetype: Archetype,
    defender_moved: bool,
) -> ShotResult {
    let prob = calculate_shot_probability(
        offense,
        defense,
        offense_archetype,
        defense_archetype,
        defender_moved,
    );
    let made = rng.gen::<f64>() < prob.final_probability;
    let points = if made { court::zone_of(offense).points() } else { 0 };
    let distance = court::distance(offense, defense);

    tracing::debug!(
        offense,
        defense,
        probability = prob.final_probability,
        made,
        points,
        "shot attempted"
    );

    ShotResult {
        made,
        points,
        probability: prob.final_probability,
        base_probability: prob.base,
        distance,
    }
}
