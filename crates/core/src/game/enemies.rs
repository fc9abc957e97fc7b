//! The enemy half of a turn: one decision per enemy, resolved in a single
//! sweep over the map. This module exists so every enemy archetype's rule
//! lives next to the others and the sweep order stays in one place. It does
//! not own operative movement.

use std::collections::BTreeMap;
use std::mem;

use crate::game::InvariantError;
use crate::game::pathfinding::{direction_towards, direction_towards_goal};
use crate::route::RouteError;
use crate::state::{Enemy, EnemyKind, GameState, NodeKind};
use crate::types::{Direction, Point};

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyMoveResult {
    Nothing,
    KilledOperative,
}

/// Advance every enemy by one turn. Cells are swept in row-major order and
/// each enemy takes exactly one decision: pursue a noise goal if it has
/// one, otherwise act per its archetype. Enemies that end up on a walkway
/// ride it to the end. After all movement settles, contact lethality is
/// checked once, then sniper lasers.
pub fn move_enemies(state: &mut GameState) -> Result<EnemyMoveResult, InvariantError> {
    let mut new_assignments: BTreeMap<Point, Vec<Enemy>> = BTreeMap::new();

    let occupied: Vec<Point> =
        state.map.iter().filter(|(_, node)| node.has_enemies()).map(|(&p, _)| p).collect();
    for position in occupied {
        let Some(node) = state.map.get_mut(&position) else {
            continue;
        };
        let old_enemies = mem::take(&mut node.enemies);
        let node = node.clone();

        for old_enemy in old_enemies {
            let mut enemy = old_enemy;
            let old_pos = position;
            let mut pos = old_pos;

            if let Some(goal) = enemy.goal {
                if let Some((dir, steps)) = direction_towards(state, pos, goal) {
                    pos = pos.offset(dir);
                    enemy.facing = dir;
                    if steps <= 1 {
                        // Arrived; drop alert mode. A patroller that lands
                        // on its route falls straight back into step.
                        enemy.goal = None;
                        if let EnemyKind::Patrol { route } = &enemy.kind
                            && let Ok(facing) = route.facing(pos, true)
                        {
                            enemy.facing = facing;
                        }
                    }
                } else {
                    enemy.goal = None;
                }
            }

            if old_pos == pos {
                match enemy.kind.clone() {
                    EnemyKind::Blue => {
                        if let Some(new_pos) = node.neighbor(pos, enemy.facing)
                            && new_pos == state.operative.position
                            && state.operative.costume.operative_killed_by(&enemy.kind)
                        {
                            pos = new_pos;
                        }
                    }
                    EnemyKind::Green => {
                        if let Some(new_pos) = node.neighbor(pos, enemy.facing)
                            && new_pos == state.operative.position
                            && state.operative.costume.operative_killed_by(&enemy.kind)
                        {
                            pos = new_pos;
                        }
                        if pos == old_pos {
                            enemy.facing = enemy.facing.opposite();
                        }
                    }
                    EnemyKind::Yellow => {
                        if let Some(new_pos) = node.neighbor(pos, enemy.facing) {
                            pos = new_pos;
                        }
                    }
                    EnemyKind::Flashlight => {
                        if let Some(new_pos) = node.neighbor(pos, enemy.facing.clockwise())
                            && new_pos == state.operative.position
                            && state.operative.costume.operative_killed_by(&enemy.kind)
                        {
                            pos = new_pos;
                        }
                        if pos == old_pos
                            && let Some(new_pos) = node.neighbor(pos, enemy.facing)
                        {
                            pos = new_pos;
                        }
                    }
                    EnemyKind::Duo => {
                        for d in [enemy.facing, enemy.facing.opposite()] {
                            if let Some(new_pos) = node.neighbor(pos, d)
                                && new_pos == state.operative.position
                                && state.operative.costume.operative_killed_by(&enemy.kind)
                            {
                                pos = new_pos;
                                break;
                            }
                        }
                    }
                    EnemyKind::Dog { chasing } if !chasing.is_empty() => {
                        let mut chasing = chasing;
                        let new_pos = chasing[0];
                        let Some(dir) = pos.direction_to_adjacent(new_pos) else {
                            return Err(InvariantError::ChaseQueueGap { from: pos, to: new_pos });
                        };
                        enemy.facing = dir;
                        pos = new_pos;
                        chasing.remove(0);
                        // Keep the scent trail alive while the operative
                        // stays adjacent to its tail.
                        if let Some(&tail) = chasing.last()
                            && tail.direction_to_adjacent(state.operative.position).is_some()
                        {
                            chasing.push(state.operative.position);
                        }
                        enemy.kind = EnemyKind::Dog { chasing };
                    }
                    EnemyKind::Dog { .. } => {
                        if let Some(new_pos) = node.neighbor(pos, enemy.facing) {
                            if new_pos == state.operative.position
                                && state.operative.costume.operative_killed_by(&enemy.kind)
                            {
                                pos = new_pos;
                            } else if let Some(new_node) = state.at(new_pos)
                                && let Some(two_ahead) = new_node.neighbor(new_pos, enemy.facing)
                                && two_ahead == state.operative.position
                                && state.operative.costume.operative_killed_by(&enemy.kind)
                            {
                                // Spotted two cells ahead: start a chase.
                                enemy.kind =
                                    EnemyKind::Dog { chasing: vec![new_pos, two_ahead] };
                            }
                        }
                    }
                    EnemyKind::Patrol { route } => {
                        match route.advance(pos, enemy.facing, &node.edges) {
                            Ok((next, facing)) => {
                                pos = next;
                                enemy.facing = facing;
                            }
                            Err(RouteError::NotOnRoute { .. }) => {
                                let step = direction_towards_goal(state, pos, |p| {
                                    route.contains(p)
                                });
                                let Some((dir, steps)) = step else {
                                    return Err(InvariantError::PatrolStranded {
                                        position: pos,
                                    });
                                };
                                pos = pos.offset(dir);
                                enemy.facing = dir;
                                if steps <= 1 {
                                    enemy.facing =
                                        route.facing(pos, true).map_err(|_| {
                                            InvariantError::PatrolStranded { position: pos }
                                        })?;
                                }
                            }
                        }
                    }
                    EnemyKind::Mark | EnemyKind::Sniper => {}
                }
            }

            pos = end_of_walkway(state, pos);

            // Runners check for a dead end wherever they land, not only
            // after moving themselves.
            if matches!(enemy.kind, EnemyKind::Yellow | EnemyKind::Flashlight)
                && enemy.goal.is_none()
                && state.neighbor(pos, enemy.facing).is_none()
            {
                enemy.facing = enemy.facing.opposite();
            }

            new_assignments.entry(pos).or_default().push(enemy);
        }
    }

    for (pos, enemies) in &new_assignments {
        if let Some(node) = state.map.get_mut(pos) {
            node.enemies = enemies.clone();
        }
    }

    if enemies_would_kill_operative(state) {
        return Ok(EnemyMoveResult::KilledOperative);
    }

    // Lasers scan only after everyone is in their final cell.
    for (&pos, enemies) in &new_assignments {
        for enemy in enemies {
            if enemy.kind == EnemyKind::Sniper
                && enemy.goal.is_none()
                && laser_sees_operative(state, pos, enemy.facing)
            {
                return Ok(EnemyMoveResult::KilledOperative);
            }
        }
    }

    Ok(EnemyMoveResult::Nothing)
}

/// Follow consecutive walkway cells from `start`. No lethality applies to
/// enemies riding walkways.
pub(crate) fn end_of_walkway(state: &GameState, start: Point) -> Point {
    let mut p = start;
    loop {
        let Some(node) = state.at(p) else {
            return p;
        };
        let NodeKind::Walkway { facing } = node.kind else {
            return p;
        };
        p = p.offset(facing);
    }
}

/// A laser travels along open connections in the sniper's facing until it
/// hits the operative, an occupied or planted cell, or the map edge.
fn laser_sees_operative(state: &GameState, start: Point, facing: Direction) -> bool {
    if !state.operative.costume.operative_killed_by(&EnemyKind::Sniper) {
        return false;
    }
    let mut p = start;
    loop {
        let Some(next) = state.at(p).and_then(|node| node.neighbor(p, facing)) else {
            return false;
        };
        if state.operative.position == next {
            return true;
        }
        let Some(node) = state.at(next) else {
            return false;
        };
        if node.has_plant() || node.has_enemies() {
            return false;
        }
        p = next;
    }
}

/// Contact check on the operative's cell; a plant there shelters them.
pub(crate) fn enemies_would_kill_operative(state: &GameState) -> bool {
    let Some(node) = state.at(state.operative.position) else {
        return false;
    };
    if node.has_plant() {
        return false;
    }
    node.enemies.iter().any(|enemy| state.operative.costume.operative_killed_by(&enemy.kind))
}
