//! The action surface of the engine: what a player may do in a state and
//! how doing it transforms the state. This module exists so callers see a
//! single `legal_actions` / `apply_action` pair; the mechanics live in the
//! submodules.

use std::collections::BTreeSet;
use std::fmt;

use crate::state::{GameState, ItemKind, NodeKind, targetable_points};
use crate::types::{Direction, Point};

pub mod enemies;
pub mod hash;
pub mod pathfinding;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_support;

/// One player action. Derives `Ord` so action sets enumerate in a stable
/// order: moves, then fires, then tosses, then subway rides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Move { direction: Direction },
    Fire { target: Point },
    Toss { direction: Direction },
    Subway { peer: char },
}

impl Action {
    /// How many turns the action consumes. Firing the rifle and tossing a
    /// rock are free; enemies do not move in response.
    pub fn turns(&self) -> u32 {
        match self {
            Action::Move { .. } | Action::Subway { .. } => 1,
            Action::Fire { .. } | Action::Toss { .. } => 0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { direction } => write!(f, "{direction}"),
            Action::Fire { target } => write!(f, "fire {target}"),
            Action::Toss { direction } => write!(f, "toss {direction}"),
            Action::Subway { peer } => write!(f, "subway {peer}"),
        }
    }
}

/// A request the rules reject outright. The state is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionError {
    NoGun,
    InvalidFireTarget { target: Point },
    NoRock,
    TossBlocked { from: Point, direction: Direction },
    TossOffMap { from: Point, direction: Direction },
}

/// A well-formedness breach in the state itself, detected mid-simulation.
/// These indicate a corrupt level or a bug upstream, not a bad action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvariantError {
    MissingSubwayPeer { peer: char },
    PatrolStranded { position: Point },
    ChaseQueueGap { from: Point, to: Point },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    Illegal(ActionError),
    Invariant(InvariantError),
}

impl From<ActionError> for GameError {
    fn from(e: ActionError) -> Self {
        GameError::Illegal(e)
    }
}

impl From<InvariantError> for GameError {
    fn from(e: InvariantError) -> Self {
        GameError::Invariant(e)
    }
}

/// Every action the rules allow in `state`, including ones that get the
/// operative killed. A held sniper rifle with live targets preempts all
/// other actions, as does a held rock with at least one throwable
/// direction. Standing on a wait point never happens between turns, so
/// that case yields no actions.
pub fn legal_actions(state: &GameState) -> BTreeSet<Action> {
    let mut actions = BTreeSet::new();
    let node = state.at(state.operative.position);

    match node.and_then(|n| n.item.as_ref()).map(|item| &item.kind) {
        Some(ItemKind::Gun) => {
            let targets = targetable_points(&state.map);
            if !targets.is_empty() {
                for target in targets {
                    actions.insert(Action::Fire { target });
                }
                return actions;
            }
        }
        Some(ItemKind::Rock) => {
            for direction in Direction::ALL {
                if turn::can_toss_rock(state, direction) {
                    actions.insert(Action::Toss { direction });
                }
            }
            if !actions.is_empty() {
                return actions;
            }
        }
        Some(ItemKind::WaitPoint) => {
            debug_assert!(false, "operative never rests on a wait point between turns");
            return actions;
        }
        _ => {}
    }

    if let Some(node) = node
        && let NodeKind::Subway { peers, .. } = &node.kind
    {
        for peer in peers.chars() {
            actions.insert(Action::Subway { peer });
        }
    }

    for direction in Direction::ALL {
        if turn::can_move_operative(state, direction) {
            actions.insert(Action::Move { direction });
        }
    }
    actions
}

/// Apply one action. Moves and subway rides that go nowhere, or that would
/// get the operative killed, leave the state unchanged and return `Ok`;
/// fires and tosses that are not allowed fail loudly instead, since the
/// player explicitly named a target.
pub fn apply_action(state: &mut GameState, action: &Action) -> Result<(), GameError> {
    match *action {
        Action::Move { direction } => turn::move_action(state, direction)?,
        Action::Fire { target } => turn::fire_gun(state, target)?,
        Action::Toss { direction } => turn::toss_rock(state, direction)?,
        Action::Subway { peer } => turn::subway_action(state, peer)?,
    }
    Ok(())
}
