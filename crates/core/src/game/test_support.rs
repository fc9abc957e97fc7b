//! Shared helpers for engine tests.

pub(crate) use crate::state::{Enemy, GameState, Node};
pub(crate) use crate::types::Point;

use crate::loader::parse_level;
use crate::state::IdAlloc;

/// Parse a level or panic. Test levels are literals, so a parse failure is
/// a broken test.
pub(crate) fn load(level: &str) -> GameState {
    let mut ids = IdAlloc::new();
    parse_level(level, &mut ids).expect("test level parses")
}

pub(crate) fn node_at(state: &GameState, x: i32, y: i32) -> &Node {
    state.at(Point::new(x, y)).expect("cell exists")
}

pub(crate) fn enemy_at(state: &GameState, x: i32, y: i32) -> &Enemy {
    node_at(state, x, y).enemies.first().expect("an enemy stands there")
}
