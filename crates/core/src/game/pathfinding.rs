//! Fixed-order breadth-first search over open connections.
//! This module exists so noise propagation and enemy goal-seeking share one
//! notion of distance. It does not own any per-enemy movement policy.

use std::collections::{BTreeSet, VecDeque};

use crate::state::GameState;
use crate::types::{Direction, Point};

/// Neighbor expansion order. This exact order decides the tie-break when
/// several shortest paths exist; it was settled empirically against
/// recorded level playthroughs (a rock tossed south on 6-1 turns a blue
/// guard west, a second rock on 4-13 picks a green guard's turn
/// direction). Orders tried and rejected: ENSW, ENWS, ESNW, ESWN, EWNS,
/// EWSN, NESW, NEWS, NSEW, NSWE, NWSE. Do not reorder.
const SEARCH_ORDER: [Direction; 4] =
    [Direction::North, Direction::West, Direction::East, Direction::South];

/// Breadth-first path from `start` to the first point satisfying `goal`,
/// walking open connections only. Locked doors and non-adjacent links such
/// as subways are never traversed. Returns the full point sequence
/// including both endpoints, or `None` if no goal point is reachable.
pub fn path_to(
    state: &GameState,
    start: Point,
    goal: impl Fn(Point) -> bool,
) -> Option<Vec<Point>> {
    let mut visited = BTreeSet::new();
    let mut queue: VecDeque<Vec<Point>> = VecDeque::new();
    visited.insert(start);
    queue.push_back(vec![start]);

    while let Some(path) = queue.pop_front() {
        let Some(&last) = path.last() else { continue };
        if goal(last) {
            return Some(path);
        }
        let Some(node) = state.at(last) else { continue };
        for d in SEARCH_ORDER {
            if let Some(neighbor) = node.neighbor(last, d)
                && visited.insert(neighbor)
            {
                let mut extended = path.clone();
                extended.push(neighbor);
                queue.push_back(extended);
            }
        }
    }
    None
}

/// Same as `path_to`, but only the point count of the path.
pub fn steps_to(state: &GameState, start: Point, goal: impl Fn(Point) -> bool) -> Option<usize> {
    path_to(state, start, goal).map(|path| path.len())
}

/// First step direction and remaining step count towards a single point.
pub fn direction_towards(state: &GameState, from: Point, to: Point) -> Option<(Direction, usize)> {
    direction_towards_goal(state, from, |p| p == to)
}

/// First step direction and remaining step count towards the nearest goal
/// point. `None` when unreachable or already standing on a goal.
pub fn direction_towards_goal(
    state: &GameState,
    from: Point,
    goal: impl Fn(Point) -> bool,
) -> Option<(Direction, usize)> {
    let path = path_to(state, from, goal)?;
    if path.len() < 2 {
        return None;
    }
    let next = path[1];
    let remaining = path.len() - 1;
    let dx = next.x - from.x;
    if dx < 0 {
        return Some((Direction::West, remaining));
    } else if dx > 0 {
        return Some((Direction::East, remaining));
    }
    let dy = next.y - from.y;
    if dy < 0 {
        Some((Direction::North, remaining))
    } else if dy > 0 {
        Some((Direction::South, remaining))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;
    use crate::types::EdgeKind;

    #[test]
    fn straight_corridor_path_has_true_graph_distance() {
        let state = load("A-+-+-X");
        let exit = Point::new(3, 0);
        let path = path_to(&state, Point::new(0, 0), |p| p == exit).expect("reachable");
        assert_eq!(path.len(), 4);
        for pair in path.windows(2) {
            assert!(pair[0].direction_to_adjacent(pair[1]).is_some());
        }
        assert_eq!(steps_to(&state, Point::new(0, 0), |p| p == exit), Some(4));
    }

    #[test]
    fn locked_doors_are_never_traversed() {
        let state = load("ArX");
        assert!(path_to(&state, Point::new(0, 0), |p| p == Point::new(1, 0)).is_none());
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let state = load("A-+ X");
        assert!(path_to(&state, Point::new(0, 0), |p| p == Point::new(3, 0)).is_none());
        assert_eq!(direction_towards(&state, Point::new(0, 0), Point::new(3, 0)), None);
    }

    #[test]
    fn ties_break_in_nwes_order() {
        // A ring: both ways around are the same length, so the first
        // expansion (north before west before east before south) wins.
        let state = load(concat!("+-+\n", "| |\n", "A-+\n", "| |\n", "+-+"));
        let far = Point::new(1, 2);
        let path = path_to(&state, Point::new(0, 2), |p| p == far).expect("reachable");
        assert_eq!(path.len(), 2);

        let corner = Point::new(1, 0);
        let path = path_to(&state, Point::new(0, 2), |p| p == corner).expect("reachable");
        // North first, then east along the top; never the southern loop.
        assert_eq!(path, vec![Point::new(0, 2), Point::new(0, 1), Point::new(0, 0), corner]);
    }

    #[test]
    fn direction_towards_prefers_west_over_east_on_equal_paths() {
        // Noise equidistant from both horizontal sides of a ring favors the
        // west step because of the locked expansion order.
        let state = load(concat!("+-A-+\n", "|   |\n", "+-X-+"));
        let noise = Point::new(2, 2);
        let (direction, steps) =
            direction_towards(&state, Point::new(2, 0), noise).expect("reachable");
        assert_eq!(direction, Direction::West);
        assert_eq!(steps, 3);
    }

    #[test]
    fn already_at_goal_yields_no_direction() {
        let state = load("A-X");
        assert_eq!(direction_towards(&state, Point::new(0, 0), Point::new(0, 0)), None);
    }

    #[test]
    fn paths_reopen_after_doors_unlock() {
        let mut state = load("AyX");
        assert!(direction_towards(&state, Point::new(0, 0), Point::new(1, 0)).is_none());
        for node in state.map.values_mut() {
            for edge in node.edges.values_mut() {
                if *edge == EdgeKind::Yellow {
                    *edge = EdgeKind::Open;
                }
            }
        }
        assert_eq!(
            direction_towards(&state, Point::new(0, 0), Point::new(1, 0)),
            Some((Direction::East, 1))
        );
    }
}
