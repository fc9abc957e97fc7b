//! World data model: cells, items, enemies, costume rules, and the state
//! value the simulation transforms. This module exists so every rule engine
//! component shares one definition of "the world". It does not own turn
//! resolution or enemy behavior.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::route::Route;
use crate::types::{Direction, EdgeKind, EdgeMap, Point};

/// What a cell is, beyond its connections and contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Exit,
    Plain,
    Rubble,
    Statue { facing: Direction },
    Subway { name: char, peers: String },
    Target,
    Walkway { facing: Direction },
}

impl NodeKind {
    /// Cell kinds the sniper rifle may be fired at.
    pub fn is_targetable(&self) -> bool {
        matches!(self, NodeKind::Statue { .. } | NodeKind::Target)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Briefcase,
    /// Sniper rifle.
    Gun,
    Key { color: EdgeKind },
    Pistols,
    Plant,
    Rock,
    Suit { kind: EnemyKind },
    WaitPoint,
}

/// An item on a cell. The id exists only so an external UI can track a
/// piece across states; it is deliberately excluded from equality and
/// hashing so that states differing only in ids compare equal.
#[derive(Clone, Debug)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.kind.hash(hasher);
    }
}

/// Enemy behavior class. `Dog` and `Patrol` carry their extra AI state in
/// the tag itself, so switching modes is a tag replacement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Blue,
    Yellow,
    Green,
    Duo,
    Dog { chasing: Vec<Point> },
    Flashlight,
    Patrol { route: Route },
    Mark,
    Sniper,
}

impl EnemyKind {
    /// Whether this kind steps into an adjacent cell to kill, which makes
    /// walking a walkway past it fatal.
    pub fn lunges(&self) -> bool {
        matches!(
            self,
            EnemyKind::Blue | EnemyKind::Green | EnemyKind::Dog { .. } | EnemyKind::Duo
        )
    }

    pub fn is_dog(&self) -> bool {
        matches!(self, EnemyKind::Dog { .. })
    }
}

/// A single enemy. Like `Item`, the id is display-only and excluded from
/// equality and hashing: state deduplication must treat two worlds that
/// differ only in enemy numbering as the same world.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub armored: bool,
    pub facing: Direction,
    /// Set when the enemy has heard a noise; the point it is moving towards.
    pub goal: Option<Point>,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, armored: bool, facing: Direction) -> Self {
        Self { id, kind, armored, facing, goal: None }
    }
}

impl PartialEq for Enemy {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.armored == other.armored
            && self.facing == other.facing
            && self.goal == other.goal
    }
}

impl Eq for Enemy {}

impl Hash for Enemy {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.kind.hash(hasher);
        self.armored.hash(hasher);
        self.facing.hash(hasher);
        self.goal.hash(hasher);
    }
}

/// Allocator for display ids, threaded explicitly through construction so
/// producers stay deterministic and free of global state.
#[derive(Clone, Copy, Debug)]
pub struct IdAlloc {
    next: u32,
}

impl IdAlloc {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAlloc {
    fn default() -> Self {
        Self::new()
    }
}

/// The operative's lethality-interaction mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Costume {
    Normal,
    Trenchcoat,
    Suit { kind: EnemyKind },
}

impl Costume {
    /// Does walking into an enemy of `kind` kill it?
    pub fn operative_kills(&self, kind: &EnemyKind) -> bool {
        match self {
            Costume::Normal | Costume::Trenchcoat => true,
            Costume::Suit { kind: suit } => suit != kind,
        }
    }

    /// Does contact with an enemy of `kind` kill the operative?
    pub fn operative_killed_by(&self, kind: &EnemyKind) -> bool {
        match self {
            Costume::Normal => true,
            Costume::Trenchcoat => false,
            Costume::Suit { kind: suit } => suit != kind,
        }
    }
}

/// One grid cell: its kind, its outgoing connections, at most one item,
/// and the enemies standing on it (normally at most one; transiently more
/// while movement resolves).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub edges: EdgeMap,
    pub item: Option<Item>,
    pub enemies: Vec<Enemy>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, edges: EdgeMap::new(), item: None, enemies: Vec::new() }
    }

    /// The adjacent point in `direction`, if the connection is open.
    pub fn neighbor(&self, position: Point, direction: Direction) -> Option<Point> {
        if self.edges.get(&direction) == Some(&EdgeKind::Open) {
            Some(position.offset(direction))
        } else {
            None
        }
    }

    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }

    /// A plant doubles as cover: it suppresses contact kills and stops
    /// sniper beams.
    pub fn has_plant(&self) -> bool {
        self.item.as_ref().is_some_and(|item| item.kind == ItemKind::Plant)
    }

    /// Apply one volley to this cell. Armor on any occupant protects every
    /// occupant. Returns whether anything died.
    pub(crate) fn administer_bullet_damage(&mut self) -> bool {
        if self.enemies.is_empty() {
            return false;
        }
        if self.enemies.iter().any(|enemy| enemy.armored) {
            return false;
        }
        self.enemies.clear();
        true
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(NodeKind::Plain)
    }
}

// Edges are slow to hash and rarely change after doors open, so they are
// left out of the hash. They still participate in equality.
impl Hash for Node {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.kind.hash(hasher);
        self.item.hash(hasher);
        self.enemies.hash(hasher);
    }
}

/// The player-controlled agent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operative {
    pub position: Point,
    pub has_briefcase: bool,
    pub costume: Costume,
    /// Latched when a kill lands immediately after a walkway slide.
    pub speed_kill: bool,
}

impl Operative {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            position: Point::new(x, y),
            has_briefcase: false,
            costume: Costume::Normal,
            speed_kill: false,
        }
    }
}

/// Sparse cell storage. The BTreeMap keeps every whole-map sweep in
/// row-major order, which the determinism guarantee depends on.
pub type NodeMap = BTreeMap<Point, Node>;

/// The unit of simulation: one whole world value. Supports value equality
/// and hashing so downstream search can deduplicate states.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    pub map: NodeMap,
    pub operative: Operative,
}

impl GameState {
    pub fn at(&self, p: Point) -> Option<&Node> {
        self.map.get(&p)
    }

    pub fn neighbor(&self, p: Point, direction: Direction) -> Option<Point> {
        self.at(p)?.neighbor(p, direction)
    }
}

pub fn find_node(map: &NodeMap, test: impl Fn(&Node) -> bool) -> Option<Point> {
    map.iter().find(|(_, node)| test(node)).map(|(&p, _)| p)
}

pub fn find_all_nodes(map: &NodeMap, test: impl Fn(&Node) -> bool) -> Vec<Point> {
    map.iter().filter(|(_, node)| test(node)).map(|(&p, _)| p).collect()
}

pub fn count_enemies(map: &NodeMap) -> usize {
    map.values().map(|node| node.enemies.len()).sum()
}

pub fn has_enemies(map: &NodeMap) -> bool {
    map.values().any(Node::has_enemies)
}

pub fn count_dogs(map: &NodeMap) -> usize {
    map.values()
        .flat_map(|node| node.enemies.iter())
        .filter(|enemy| enemy.kind.is_dog())
        .count()
}

/// Every cell the sniper rifle may target, in row-major order.
pub fn targetable_points(map: &NodeMap) -> Vec<Point> {
    find_all_nodes(map, |node| node.kind.is_targetable())
}

pub fn find_briefcase(map: &NodeMap) -> Option<Point> {
    find_node(map, |node| {
        node.item.as_ref().is_some_and(|item| item.kind == ItemKind::Briefcase)
    })
}

pub fn find_mark(map: &NodeMap) -> Option<Point> {
    find_node(map, |node| node.enemies.iter().any(|enemy| enemy.kind == EnemyKind::Mark))
}

pub fn find_exit(map: &NodeMap) -> Option<Point> {
    find_node(map, |node| node.kind == NodeKind::Exit)
}

pub fn has_exit(map: &NodeMap) -> bool {
    find_exit(map).is_some()
}

pub fn has_walkways(map: &NodeMap) -> bool {
    find_node(map, |node| matches!(node.kind, NodeKind::Walkway { .. })).is_some()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalError {
    NoBriefcaseToPickUp,
}

/// The operative state a winning run ends in: standing on the exit, with
/// the briefcase if one was asked for. Used by solvers and tests as a
/// target value.
pub fn goal_operative(state: &GameState, pickup_briefcase: bool) -> Result<Operative, GoalError> {
    if pickup_briefcase && find_briefcase(&state.map).is_none() {
        return Err(GoalError::NoBriefcaseToPickUp);
    }
    let mut operative = Operative::new(-1, -1);
    operative.has_briefcase = pickup_briefcase;
    if let Some(exit) = find_exit(&state.map) {
        operative.position = exit;
    }
    Ok(operative)
}
