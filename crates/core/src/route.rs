//! Rectangular patrol perimeters and the facing rules for walking them.
//! This module exists so perimeter bookkeeping stays independent of enemy AI.
//! It does not own pathfinding or off-route recovery.

use crate::types::{Direction, EdgeKind, EdgeMap, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteError {
    NotOnRoute { position: Point },
}

/// Position bucket on a route perimeter: the four corners plus the four
/// edge midsections, clockwise from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Octant {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

/// Canonical facing per octant when walking the perimeter clockwise.
const OCTANT_FACING_CW: [Direction; 8] = [
    Direction::East,
    Direction::East,
    Direction::South,
    Direction::South,
    Direction::West,
    Direction::West,
    Direction::North,
    Direction::North,
];

/// Canonical facing per octant when walking counter-clockwise.
const OCTANT_FACING_CCW: [Direction; 8] = [
    Direction::South,
    Direction::West,
    Direction::West,
    Direction::North,
    Direction::North,
    Direction::East,
    Direction::East,
    Direction::South,
];

/// An axis-aligned rectangle whose perimeter is a patrol path.
/// Always strictly non-degenerate: left < right and top < bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    top_left: Point,
    bottom_right: Point,
}

impl Route {
    pub fn new(top_left: Point, bottom_right: Point) -> Option<Self> {
        if top_left.x >= bottom_right.x || top_left.y >= bottom_right.y {
            return None;
        }
        Some(Self { top_left, bottom_right })
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn contains(&self, p: Point) -> bool {
        ((p.x == self.left() || p.x == self.right()) && self.top() <= p.y && p.y <= self.bottom())
            || ((self.left() <= p.x && p.x <= self.right())
                && (p.y == self.top() || p.y == self.bottom()))
    }

    /// One patrol step from `p` with the given facing. Keeps the current
    /// rotation sense while the way ahead is open, reverses sense when
    /// blocked, and stays put (facing reversed) when pinned both ways.
    pub fn advance(
        &self,
        p: Point,
        facing: Direction,
        edges: &EdgeMap,
    ) -> Result<(Point, Direction), RouteError> {
        let clockwise = facing == self.facing(p, true)?;
        if edges.get(&facing) == Some(&EdgeKind::Open) {
            let next = p.offset(facing);
            return Ok((next, self.facing(next, clockwise)?));
        }
        // Blocked. Reverse the patrol route.
        let reversed = self.facing(p, !clockwise)?;
        if edges.get(&reversed) == Some(&EdgeKind::Open) {
            let next = p.offset(reversed);
            return Ok((next, self.facing(next, !clockwise)?));
        }
        Ok((p, reversed))
    }

    /// Canonical facing for a perimeter point in the given rotation sense.
    pub fn facing(&self, p: Point, clockwise: bool) -> Result<Direction, RouteError> {
        let octant = self.octant(p)? as usize;
        if clockwise { Ok(OCTANT_FACING_CW[octant]) } else { Ok(OCTANT_FACING_CCW[octant]) }
    }

    fn left(&self) -> i32 {
        self.top_left.x
    }

    fn top(&self) -> i32 {
        self.top_left.y
    }

    fn right(&self) -> i32 {
        self.bottom_right.x
    }

    fn bottom(&self) -> i32 {
        self.bottom_right.y
    }

    fn octant(&self, p: Point) -> Result<Octant, RouteError> {
        if p.y < self.top() || self.bottom() < p.y || p.x < self.left() || self.right() < p.x {
            return Err(RouteError::NotOnRoute { position: p });
        }
        if p.y == self.top() {
            if p.x == self.left() {
                return Ok(Octant::TopLeft);
            } else if p.x < self.right() {
                return Ok(Octant::Top);
            }
            return Ok(Octant::TopRight);
        } else if p.y < self.bottom() {
            if p.x == self.left() {
                return Ok(Octant::Left);
            } else if p.x == self.right() {
                return Ok(Octant::Right);
            }
        } else if p.y == self.bottom() {
            if p.x == self.left() {
                return Ok(Octant::BottomLeft);
            } else if p.x < self.right() {
                return Ok(Octant::Bottom);
            }
            return Ok(Octant::BottomRight);
        }
        // Strictly inside the rectangle.
        Err(RouteError::NotOnRoute { position: p })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn all_open() -> EdgeMap {
        Direction::ALL.iter().map(|&d| (d, EdgeKind::Open)).collect()
    }

    fn sample_route() -> Route {
        Route::new(Point::new(1, 2), Point::new(3, 4)).expect("non-degenerate")
    }

    /// The documented 8-point perimeter cycle of a 3x3 rectangle.
    fn perimeter_cycle() -> [Point; 8] {
        [
            Point::new(1, 2),
            Point::new(2, 2),
            Point::new(3, 2),
            Point::new(3, 3),
            Point::new(3, 4),
            Point::new(2, 4),
            Point::new(1, 4),
            Point::new(1, 3),
        ]
    }

    #[test]
    fn degenerate_rectangles_are_rejected() {
        assert!(Route::new(Point::new(2, 2), Point::new(2, 4)).is_none());
        assert!(Route::new(Point::new(2, 2), Point::new(4, 2)).is_none());
        assert!(Route::new(Point::new(3, 3), Point::new(1, 1)).is_none());
    }

    #[test]
    fn clockwise_walk_visits_the_perimeter_cycle() {
        let route = sample_route();
        let points = perimeter_cycle();
        let edges = all_open();
        let mut state = (points[0], Direction::East);
        for i in 0..8 {
            state = route.advance(state.0, state.1, &edges).expect("on route");
            assert_eq!(state.0, points[(i + 1) & 7]);
        }
    }

    #[test]
    fn counter_clockwise_walk_visits_the_cycle_in_reverse() {
        let route = sample_route();
        let points = perimeter_cycle();
        let edges = all_open();
        let mut state = (points[0], Direction::South);
        for i in 0..8 {
            state = route.advance(state.0, state.1, &edges).expect("on route");
            assert_eq!(state.0, points[7 - i]);
        }
    }

    #[test]
    fn blocked_ahead_reverses_rotation_sense() {
        let route = sample_route();
        // Top edge midpoint moving clockwise (east), with east blocked.
        let mut edges = all_open();
        edges.insert(Direction::East, EdgeKind::Red);
        let (p, facing) =
            route.advance(Point::new(2, 2), Direction::East, &edges).expect("on route");
        assert_eq!(p, Point::new(1, 2));
        assert_eq!(facing, Direction::South);
    }

    #[test]
    fn pinned_both_ways_stays_in_place_with_reversed_facing() {
        let route = sample_route();
        let mut edges = EdgeMap::new();
        edges.insert(Direction::North, EdgeKind::Open);
        let (p, facing) =
            route.advance(Point::new(2, 2), Direction::East, &edges).expect("on route");
        assert_eq!(p, Point::new(2, 2));
        assert_eq!(facing, Direction::West);
    }

    #[test]
    fn off_perimeter_points_are_not_on_route() {
        let route = sample_route();
        assert!(!route.contains(Point::new(2, 3)));
        assert_eq!(
            route.facing(Point::new(2, 3), true),
            Err(RouteError::NotOnRoute { position: Point::new(2, 3) })
        );
        assert_eq!(
            route.facing(Point::new(0, 0), true),
            Err(RouteError::NotOnRoute { position: Point::new(0, 0) })
        );
    }

    proptest! {
        #[test]
        fn full_perimeter_walk_returns_to_start(
            left in -3i32..3,
            top in -3i32..3,
            width in 1i32..4,
            height in 1i32..4,
            start_clockwise in any::<bool>(),
        ) {
            let top_left = Point::new(left, top);
            let bottom_right = Point::new(left + width, top + height);
            let route = Route::new(top_left, bottom_right).expect("non-degenerate");
            let edges = all_open();

            let start = top_left;
            let mut facing = route.facing(start, start_clockwise).expect("corner is on route");
            let mut p = start;
            let perimeter_len = 2 * (width + height);
            for _ in 0..perimeter_len {
                let (np, nf) = route.advance(p, facing, &edges).expect("stays on route");
                p = np;
                facing = nf;
            }
            prop_assert_eq!(p, start);
            prop_assert_eq!(facing, route.facing(start, start_clockwise).expect("on route"));
        }
    }
}
