//! Half-court one-on-one: a two-seat, turn-based basketball mini-game.

pub mod court;
pub mod evaluator;
pub mod rules;
pub mod scoring;
pub mod stats;
pub mod types;
