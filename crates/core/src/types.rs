//! Grid geometry and the closed enumerations shared by the whole engine.
//! This module exists so coordinate and connection vocabulary stays in one place.
//! It does not own cell contents or simulation rules.

use std::collections::BTreeMap;
use std::fmt;

/// Integer grid coordinate. Field order gives the derived `Ord` the
/// row-major "display" ordering (y first, then x), which every
/// deterministic enumeration in the engine relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub y: i32,
    pub x: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, direction: Direction) -> Self {
        Self { x: self.x + direction.dx(), y: self.y + direction.dy() }
    }

    /// Direction from `self` to `other`, or `None` if `other` is not one of
    /// the four orthogonal neighbors.
    pub fn direction_to_adjacent(self, other: Point) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Four-way compass direction. Closed set; discriminant order matters only
/// for the derived `Ord` used by deterministic edge-map iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn counter_clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    pub fn dx(self) -> i32 {
        match self {
            Direction::East => 1,
            Direction::West => -1,
            Direction::North | Direction::South => 0,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Direction::North => -1,
            Direction::South => 1,
            Direction::East | Direction::West => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        };
        write!(f, "{c}")
    }
}

/// Connection kind between two adjacent cells. `Open` is traversable;
/// the colored kinds are locked doors opened by the matching key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeKind {
    Open,
    Red,
    Green,
    Blue,
    Yellow,
}

/// Outgoing connections of a single cell, keyed by the direction from
/// that cell. Levels are built symmetric, but each cell stores its own map.
pub type EdgeMap = BTreeMap<Direction, EdgeKind>;
