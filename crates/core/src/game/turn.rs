//! Operative-side turn resolution: movement, walkway slides, cell-entry
//! effects, and the free weapon actions. This module exists to keep the
//! "what happens when the operative does X" rules in one place. It does not
//! own enemy decisions; those live in `enemies`.

use crate::game::enemies::{self, EnemyMoveResult};
use crate::game::pathfinding::direction_towards;
use crate::game::{ActionError, InvariantError};
use crate::state::{Costume, Enemy, EnemyKind, GameState, ItemKind, Node, NodeKind, find_node};
use crate::types::{Direction, EdgeKind, Point};


/// Outcome of the operative's half of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    NoPath,
    WouldDie,
    Done,
}

/// Connectivity check only; a legal move may still be fatal.
pub fn can_move_operative(state: &GameState, direction: Direction) -> bool {
    state.neighbor(state.operative.position, direction).is_some()
}

/// One full move turn: the operative steps, then every enemy responds.
/// Resolved on a working copy that is committed only if the operative
/// survives, so a fatal or impossible move leaves the state untouched.
pub fn move_action(state: &mut GameState, direction: Direction) -> Result<(), InvariantError> {
    let Some(node) = state.at(state.operative.position) else {
        return Ok(());
    };
    if !node.edges.contains_key(&direction) {
        return Ok(());
    }
    let mut working = state.clone();
    if move_operative(&mut working, direction)? == MoveResult::Done
        && enemies::move_enemies(&mut working)? == EnemyMoveResult::Nothing
    {
        *state = working;
    }
    Ok(())
}

/// Step the operative one cell, sliding along walkways and applying
/// cell-entry effects. Walkways may not be boarded against their flow.
pub fn move_operative(
    state: &mut GameState,
    direction: Direction,
) -> Result<MoveResult, InvariantError> {
    let pos = state.operative.position;
    let Some(new_pos) = state.neighbor(pos, direction) else {
        return Ok(MoveResult::NoPath);
    };
    let Some(new_node) = state.at(new_pos) else {
        return Ok(MoveResult::NoPath);
    };
    if let NodeKind::Walkway { facing } = new_node.kind
        && facing == direction.opposite()
    {
        return Ok(MoveResult::NoPath);
    }
    let entering_walkway = matches!(new_node.kind, NodeKind::Walkway { .. });
    state.operative.position = new_pos;

    let mut just_exited_walkway = false;
    if entering_walkway {
        // The whole slide is probed first so a mid-slide lunge rejects the
        // move without moving anything.
        let mut probe = state.clone();
        if slide_operative_along_walkways(&mut probe) == EnemyMoveResult::KilledOperative {
            return Ok(MoveResult::WouldDie);
        }
        *state = probe;
        just_exited_walkway = true;
    }

    enter_node(state, just_exited_walkway)
}

/// Carry the operative along consecutive walkway cells until a non-walkway
/// cell is reached. Each cell passed is checked for enemies one open
/// connection away that face the walkway and lunge; the connection behind
/// the direction of travel is exempt.
pub fn slide_operative_along_walkways(state: &mut GameState) -> EnemyMoveResult {
    loop {
        let p = state.operative.position;
        let Some(node) = state.at(p) else {
            return EnemyMoveResult::Nothing;
        };
        let NodeKind::Walkway { facing: dir } = node.kind else {
            return EnemyMoveResult::Nothing;
        };
        let next = p.offset(dir);
        state.operative.position = next;
        let Some(next_node) = state.at(next) else {
            continue;
        };
        for (&edge_dir, &edge_value) in &next_node.edges {
            if edge_dir == dir.opposite() || edge_value != EdgeKind::Open {
                continue;
            }
            let Some(neighbor) = state.at(next.offset(edge_dir)) else {
                continue;
            };
            for enemy in &neighbor.enemies {
                if enemy.facing == edge_dir.opposite()
                    && state.operative.costume.operative_killed_by(&enemy.kind)
                    && enemy.kind.lunges()
                {
                    return EnemyMoveResult::KilledOperative;
                }
            }
        }
    }
}

/// A kill credited to the operative. A trenchcoat is lost with the first
/// kill; a kill landed straight off a walkway latches the speed-kill flag.
pub fn record_operative_kill(state: &mut GameState, just_exited_walkway: bool) {
    if state.operative.costume == Costume::Trenchcoat {
        state.operative.costume = Costume::Normal;
    }
    if just_exited_walkway {
        state.operative.speed_kill = true;
    }
}

/// Resolve what the cell under the operative does to them: contact kills
/// (suppressed by a plant), then the item, if any. A wait point forces a
/// full extra enemy turn while the operative stands still.
pub fn enter_node(
    state: &mut GameState,
    just_exited_walkway: bool,
) -> Result<MoveResult, InvariantError> {
    let pos = state.operative.position;
    let Some(mut node) = state.map.get(&pos).cloned() else {
        return Ok(MoveResult::NoPath);
    };

    if node.has_enemies() && !node.has_plant() {
        let survivors: Vec<Enemy> = node
            .enemies
            .iter()
            .filter(|enemy| !state.operative.costume.operative_kills(&enemy.kind))
            .cloned()
            .collect();
        if survivors != node.enemies {
            record_operative_kill(state, just_exited_walkway);
            node.enemies = survivors;
        }
    }

    match node.item.as_ref().map(|item| item.kind.clone()) {
        Some(ItemKind::Briefcase) => {
            state.operative.has_briefcase = true;
            node.item = None;
        }
        Some(ItemKind::Key { color }) => {
            open_doors(state, color);
            // This cell's own edges may have been opened too.
            if let Some(current) = state.at(pos) {
                node.edges = current.edges.clone();
            }
            node.item = None;
        }
        Some(ItemKind::Pistols) => {
            fire_pistols(state);
            node.item = None;
        }
        Some(ItemKind::Suit { kind }) => {
            state.operative.costume = Costume::Suit { kind };
            node.item = None;
        }
        Some(ItemKind::WaitPoint) => {
            node.item = None;
            if enemies::move_enemies(state)? == EnemyMoveResult::KilledOperative {
                return Ok(MoveResult::WouldDie);
            }
        }
        _ => {}
    }
    state.map.insert(pos, node);

    Ok(MoveResult::Done)
}

/// Unlock every connection of the given color, map-wide.
pub fn open_doors(state: &mut GameState, color: EdgeKind) {
    for node in state.map.values_mut() {
        for edge in node.edges.values_mut() {
            if *edge == color {
                *edge = EdgeKind::Open;
            }
        }
    }
}

/// Dual pistols reach exactly one cell along each open connection and kill
/// every enemy there, armor permitting.
pub fn fire_pistols(state: &mut GameState) {
    let pos = state.operative.position;
    let Some(node) = state.at(pos) else {
        return;
    };
    let open: Vec<Direction> =
        node.edges.iter().filter(|&(_, &kind)| kind == EdgeKind::Open).map(|(&d, _)| d).collect();
    for direction in open {
        bullet_damage(state, pos.offset(direction));
    }
}

pub fn bullet_damage(state: &mut GameState, target: Point) {
    let killed = state.map.get_mut(&target).is_some_and(Node::administer_bullet_damage);
    if killed {
        record_operative_kill(state, false);
    }
}

/// Teleport to the named peer platform and resolve the arrival cell. The
/// caller owns the follow-up enemy turn.
pub fn use_subway(state: &mut GameState, peer: char) -> Result<(), InvariantError> {
    let peer_pos = find_node(&state.map, |node| {
        matches!(&node.kind, NodeKind::Subway { name, .. } if *name == peer)
    });
    let Some(peer_pos) = peer_pos else {
        return Err(InvariantError::MissingSubwayPeer { peer });
    };
    state.operative.position = peer_pos;
    let _ = enter_node(state, false)?;
    Ok(())
}

/// One full subway turn, with the same working-copy commit as `move_action`.
pub fn subway_action(state: &mut GameState, peer: char) -> Result<(), InvariantError> {
    let mut working = state.clone();
    use_subway(&mut working, peer)?;
    if enemies::move_enemies(&mut working)? == EnemyMoveResult::Nothing {
        *state = working;
    }
    Ok(())
}

/// A rock may be tossed one cell in a direction if that cell exists, holds
/// no enemy, and the connection towards it is open or absent. Rocks fly
/// over gaps; they do not fly through doors.
pub fn can_toss_rock(state: &GameState, direction: Direction) -> bool {
    let pos = state.operative.position;
    let Some(node) = state.at(pos) else {
        return false;
    };
    let Some(target) = state.at(pos.offset(direction)) else {
        return false;
    };
    if !target.enemies.is_empty() {
        return false;
    }
    match node.edges.get(&direction) {
        Some(&edge) => edge == EdgeKind::Open,
        None => true,
    }
}

/// Toss the held rock. Every enemy within the 3x3 block around the landing
/// cell (except marks) is alerted: it turns towards the noise and adopts
/// the landing cell as its goal. Dogs drop any chase in progress.
pub fn toss_rock(state: &mut GameState, direction: Direction) -> Result<(), ActionError> {
    let pos = state.operative.position;
    let holding_rock = state
        .at(pos)
        .and_then(|node| node.item.as_ref())
        .is_some_and(|item| item.kind == ItemKind::Rock);
    if !holding_rock {
        return Err(ActionError::NoRock);
    }
    if let Some(node) = state.at(pos)
        && let Some(&edge) = node.edges.get(&direction)
        && edge != EdgeKind::Open
    {
        return Err(ActionError::TossBlocked { from: pos, direction });
    }
    let noise = pos.offset(direction);
    if state.at(noise).is_none() {
        return Err(ActionError::TossOffMap { from: pos, direction });
    }
    if let Some(node) = state.map.get_mut(&pos) {
        node.item = None;
    }

    for dx in -1..=1 {
        for dy in -1..=1 {
            let position = Point::new(noise.x + dx, noise.y + dy);
            let Some(node) = state.at(position) else {
                continue;
            };
            if node.enemies.is_empty() {
                continue;
            }
            let mut node = node.clone();
            for enemy in &mut node.enemies {
                if enemy.kind == EnemyKind::Mark {
                    continue;
                }
                enemy.goal = Some(noise);
                if let Some((dir, _)) = direction_towards(state, position, noise) {
                    enemy.facing = dir;
                }
                if enemy.kind.is_dog() {
                    enemy.kind = EnemyKind::Dog { chasing: Vec::new() };
                }
            }
            state.map.insert(position, node);
        }
    }
    Ok(())
}

/// Fire the sniper rifle at a target or statue cell. Shooting a statue
/// collapses it and the cell beyond into rubble, severing the beyond
/// cell's connections; yellow guards left staring at the new rubble turn
/// around. Either use consumes the rifle and counts as a kill.
pub fn fire_gun(state: &mut GameState, target: Point) -> Result<(), ActionError> {
    let operative_pos = state.operative.position;
    let holding_gun = state
        .at(operative_pos)
        .and_then(|node| node.item.as_ref())
        .is_some_and(|item| item.kind == ItemKind::Gun);
    if !holding_gun {
        return Err(ActionError::NoGun);
    }

    match state.at(target).map(|node| node.kind.clone()) {
        Some(NodeKind::Statue { facing }) => {
            state.map.insert(target, Node::new(NodeKind::Rubble));
            let beyond = target.offset(facing);
            let dirs: Vec<Direction> = state
                .at(beyond)
                .map(|node| node.edges.keys().copied().collect())
                .unwrap_or_default();
            for dir in dirs {
                if let Some(neighbor) = state.map.get_mut(&beyond.offset(dir)) {
                    neighbor.edges.remove(&dir.opposite());
                    for enemy in &mut neighbor.enemies {
                        if enemy.kind == EnemyKind::Yellow && enemy.facing == dir.opposite() {
                            enemy.facing = enemy.facing.opposite();
                        }
                    }
                }
            }
            state.map.insert(beyond, Node::new(NodeKind::Rubble));
            record_operative_kill(state, false);
        }
        Some(NodeKind::Target) => {
            bullet_damage(state, target);
        }
        _ => return Err(ActionError::InvalidFireTarget { target }),
    }

    if let Some(node) = state.map.get_mut(&operative_pos) {
        node.item = None;
    }
    Ok(())
}
