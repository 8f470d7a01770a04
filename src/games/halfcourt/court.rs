//! Court graph: the 11 fixed positions, their coordinates and who can reach whom.
//!
//! The adjacency lists are kept exactly as authored. They are not symmetric
//! (2 lists 6, 6 does not list 2) and nothing here tries to repair that.

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

use super::types::{PositionId, Zone};

/// Basket center on the court plane.
pub const BASKET: (f64, f64) = (35.0, 72.0);

pub const POSITION_COUNT: usize = 11;
pub const PAINT: PositionId = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CourtError {
    #[error("unknown court position: {0}")]
    UnknownPosition(PositionId),
}

#[derive(Debug, Clone, Serialize)]
pub struct CourtPosition {
    pub id: PositionId,
    pub x: f64,
    pub y: f64,
    pub is_three_point: bool,
    pub name: &'static str,
    pub adjacent_positions: &'static [PositionId],
}

impl CourtPosition {
    pub fn zone(&self) -> Zone {
        if self.is_three_point {
            Zone::Three
        } else if self.id == PAINT {
            Zone::Paint
        } else {
            Zone::Mid
        }
    }

    pub fn distance_to_basket(&self) -> f64 {
        ((self.x - BASKET.0).powi(2) + (self.y - BASKET.1).powi(2)).sqrt()
    }
}

fn pos(
    id: PositionId,
    x: f64,
    y: f64,
    is_three_point: bool,
    name: &'static str,
    adjacent_positions: &'static [PositionId],
) -> CourtPosition {
    CourtPosition { id, x, y, is_three_point, name, adjacent_positions }
}

pub static COURT_POSITIONS: Lazy<[CourtPosition; POSITION_COUNT]> = Lazy::new(|| {
    [
        pos(1, 10.0, 73.0, true, "Left Corner 3", &[2, 6]),
        pos(2, 15.0, 52.0, true, "Left Wing 3", &[1, 3, 6, 7, 8]),
        pos(3, 35.0, 38.0, true, "Top of Key 3", &[2, 4]),
        pos(4, 55.0, 52.0, true, "Right Wing 3", &[3, 5, 8, 9, 10]),
        pos(5, 60.0, 73.0, true, "Right Corner 3", &[4, 10]),
        pos(6, 18.0, 73.0, false, "Left Block", &[1, 7, 11]),
        pos(7, 23.0, 55.0, false, "Left Elbow", &[1, 2, 6, 8, 9, 11]),
        pos(8, 35.0, 48.0, false, "Free Throw Line", &[2, 4, 7, 9, 11]),
        pos(9, 47.0, 55.0, false, "Right Elbow", &[4, 5, 7, 8, 10, 11]),
        pos(10, 52.0, 73.0, false, "Right Block", &[5, 9, 11]),
        pos(11, 35.0, 68.0, false, "Paint", &[6, 7, 9, 10]),
    ]
});

/// Look up a position by id.
pub fn position(id: PositionId) -> Result<&'static CourtPosition, CourtError> {
    match id {
        1..=11 => Ok(&COURT_POSITIONS[(id - 1) as usize]),
        _ => Err(CourtError::UnknownPosition(id)),
    }
}

pub fn all_positions() -> impl Iterator<Item = &'static CourtPosition> {
    COURT_POSITIONS.iter()
}

pub fn try_distance(a: PositionId, b: PositionId) -> Result<f64, CourtError> {
    let pa = position(a)?;
    let pb = position(b)?;
    Ok(((pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2)).sqrt())
}

/// Euclidean distance between two positions.
///
/// Panics on an unknown id; use [`try_distance`] for unchecked input.
pub fn distance(a: PositionId, b: PositionId) -> f64 {
    try_distance(a, b).unwrap_or_else(|e| panic!("{e}"))
}

pub fn try_is_adjacent(from: PositionId, to: PositionId) -> Result<bool, CourtError> {
    Ok(position(from)?.adjacent_positions.contains(&to))
}

/// `to` is in the adjacency list of `from`. Unknown ids are never adjacent.
pub fn is_adjacent(from: PositionId, to: PositionId) -> bool {
    try_is_adjacent(from, to).unwrap_or(false)
}

pub fn adjacent(id: PositionId) -> &'static [PositionId] {
    position(id).map(|p| p.adjacent_positions).unwrap_or(&[])
}

pub fn zone_of(id: PositionId) -> Zone {
    position(id).map(|p| p.zone()).unwrap_or(Zone::Mid)
}

pub fn is_three_point(id: PositionId) -> bool {
    position(id).map(|p| p.is_three_point).unwrap_or(false)
}

pub fn distance_to_basket(id: PositionId) -> f64 {
    position(id).map(|p| p.distance_to_basket()).unwrap_or(f64::INFINITY)
}

pub fn is_left_side(id: PositionId) -> bool {
    matches!(id, 1 | 2 | 6 | 7)
}
