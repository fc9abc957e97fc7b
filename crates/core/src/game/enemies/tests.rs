//! Behavior tests for the enemy turn, one archetype at a time.

use super::*;
use crate::game::test_support::*;

#[test]
fn blue_guards_attack_only_what_they_face() {
    let mut state = load("A-1\n\n1: e(b,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));

    let mut state = load("A-1\n\n1: e(b,e)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(enemy_at(&state, 1, 0).facing, Direction::East);
}

#[test]
fn green_guards_flip_when_they_cannot_attack() {
    let mut state = load("A-+-1\n\n1: e(g,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(enemy_at(&state, 2, 0).facing, Direction::East);
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(enemy_at(&state, 2, 0).facing, Direction::West);

    let mut state = load("A-1\n\n1: e(g,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));
}

#[test]
fn yellow_guards_run_forward_and_turn_at_dead_ends() {
    let mut state = load("A +-1\n\n1: e(y,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 1, 0).enemies.len(), 1);
    assert_eq!(enemy_at(&state, 1, 0).facing, Direction::East);

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 2, 0).enemies.len(), 1);
    assert_eq!(enemy_at(&state, 2, 0).facing, Direction::West);
}

#[test]
fn a_yellow_guard_tramples_the_operative_in_its_path() {
    let mut state = load("A-1\n\n1: e(y,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));
}

#[test]
fn flashlight_guards_attack_clockwise_of_their_facing() {
    let mut state = load("A-1\n\n1: e(f,s)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));

    // No victim clockwise: walks forward instead.
    let mut state = load("A +-1\n\n1: e(f,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 1, 0).enemies.len(), 1);
}

#[test]
fn duo_guards_attack_forward_and_backward() {
    let mut state = load("A-1\n\n1: e(2,e)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));
}

#[test]
fn dogs_spot_the_operative_two_cells_ahead_and_chase() {
    let mut state = load("A-+-1\n\n1: e(d,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(
        enemy_at(&state, 2, 0).kind,
        EnemyKind::Dog { chasing: vec![Point::new(1, 0), Point::new(0, 0)] }
    );

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 1, 0).enemies.len(), 1);

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));
}

#[test]
fn a_chase_trail_extends_while_the_operative_stays_adjacent_to_its_tail() {
    let mut state = load("+-+-1\n|\nA\n\n1: e(d,w)");
    state.map.get_mut(&Point::new(2, 0)).unwrap().enemies[0].kind =
        EnemyKind::Dog { chasing: vec![Point::new(1, 0), Point::new(0, 0)] };

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(
        enemy_at(&state, 1, 0).kind,
        EnemyKind::Dog { chasing: vec![Point::new(0, 0), Point::new(0, 1)] }
    );
}

#[test]
fn a_broken_chase_trail_is_an_invariant_error() {
    let mut state = load("A-+-1\n\n1: e(d,w)");
    state.map.get_mut(&Point::new(2, 0)).unwrap().enemies[0].kind =
        EnemyKind::Dog { chasing: vec![Point::new(0, 0)] };
    assert_eq!(
        move_enemies(&mut state),
        Err(InvariantError::ChaseQueueGap { from: Point::new(2, 0), to: Point::new(0, 0) })
    );
}

#[test]
fn patrol_guards_walk_their_rectangle_clockwise() {
    let mut state = load("A 1-+\n  | |\n  +-+\n\n1: e(p,1,0,2,1)");
    let expected = [
        (Point::new(2, 0), Direction::South),
        (Point::new(2, 1), Direction::West),
        (Point::new(1, 1), Direction::North),
        (Point::new(1, 0), Direction::East),
    ];
    for (pos, facing) in expected {
        assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
        assert_eq!(node_at(&state, pos.x, pos.y).enemies.len(), 1);
        assert_eq!(enemy_at(&state, pos.x, pos.y).facing, facing);
    }
}

#[test]
fn a_patrol_guard_off_its_route_walks_back_and_resumes() {
    let mut state = load("A-+-1-+\n    | |\n    +-+\n\n1: e(p,2,0,3,1)");
    let guard = state.map.get_mut(&Point::new(2, 0)).unwrap().enemies.remove(0);
    state.map.get_mut(&Point::new(1, 0)).unwrap().enemies.push(guard);

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 2, 0).enemies.len(), 1);
    assert_eq!(enemy_at(&state, 2, 0).facing, Direction::East);
}

#[test]
fn a_patrol_guard_cut_off_from_its_route_is_an_invariant_error() {
    let mut state = load("A-+-1-+\n    | |\n    +-+\n\n1: e(p,2,0,3,1)");
    let guard = state.map.get_mut(&Point::new(2, 0)).unwrap().enemies.remove(0);
    state.map.get_mut(&Point::new(1, 0)).unwrap().enemies.push(guard);
    state.map.get_mut(&Point::new(1, 0)).unwrap().edges.clear();

    assert_eq!(
        move_enemies(&mut state),
        Err(InvariantError::PatrolStranded { position: Point::new(1, 0) })
    );
}

#[test]
fn sniper_lasers_travel_open_connections_until_blocked() {
    let mut state = load("A-+-1\n\n1: e(s,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::KilledOperative));

    let mut state = load("A-P-1\n\n1: e(s,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));

    let mut state = load("A-2-1\n\n1: e(s,w)\n2: e(m,s)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));

    let mut state = load("a-+-1\n\n1: e(s,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
}

#[test]
fn an_alerted_sniper_moves_instead_of_firing() {
    let mut state = load("A-+-+-1\n\n1: e(s,w)");
    state.map.get_mut(&Point::new(3, 0)).unwrap().enemies[0].goal = Some(Point::new(1, 0));

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    let sniper = enemy_at(&state, 2, 0);
    assert_eq!(sniper.goal, Some(Point::new(1, 0)));
    assert_eq!(sniper.facing, Direction::West);
}

#[test]
fn alerted_guards_walk_to_the_noise_and_then_stand_down() {
    let mut state = load("A +-+-1\n\n1: e(b,w)");
    state.map.get_mut(&Point::new(3, 0)).unwrap().enemies[0].goal = Some(Point::new(1, 0));

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(enemy_at(&state, 2, 0).goal, Some(Point::new(1, 0)));

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    let guard = enemy_at(&state, 1, 0);
    assert_eq!(guard.goal, None);
    assert_eq!(guard.facing, Direction::West);
}

#[test]
fn an_unreachable_goal_is_dropped() {
    let mut state = load("A-1 +\n\n1: e(b,e)");
    state.map.get_mut(&Point::new(1, 0)).unwrap().enemies[0].goal = Some(Point::new(2, 0));

    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(enemy_at(&state, 1, 0).goal, None);
}

#[test]
fn enemies_ride_walkways_to_the_end() {
    let mut state = load("A 1-2-+\n\n1: e(y,e)\n2: walkway(e)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 3, 0).enemies.len(), 1);
    assert_eq!(enemy_at(&state, 3, 0).facing, Direction::West);
}

#[test]
fn a_plant_shelters_the_operative_from_contact() {
    let mut state = load("1-2\n\n1: operative(); plant()\n2: e(y,w)");
    assert_eq!(move_enemies(&mut state), Ok(EnemyMoveResult::Nothing));
    assert_eq!(node_at(&state, 0, 0).enemies.len(), 1);
}
