//! Objective judging and the five-valued decision algebra used to score a
//! run across turns. Each objective is judged independently against the
//! initial state, the current state, and the elapsed turn count; callers
//! combine verdicts with `&`.

use std::fmt;
use std::ops::BitAnd;

use serde::{Deserialize, Serialize};

use crate::state::{
    GameState, count_dogs, count_enemies, find_briefcase, find_exit, find_mark, has_enemies,
    has_walkways,
};

/// Progress verdict for one objective at one point in time. `Success` and
/// `Failure` are terminal; the "currently" pair can still flip on a later
/// turn; `NotApplicable` means the level lacks the objective's subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Decision {
    NotApplicable,
    CurrentlyFailing,
    CurrentlySucceeding,
    Success,
    Failure,
}

/// Commutative, associative merge: `NotApplicable` is the identity,
/// `Failure` absorbs, and a terminal `Success` met by a later
/// `CurrentlyFailing` hardens into `Failure`.
impl BitAnd for Decision {
    type Output = Decision;

    fn bitand(self, rhs: Decision) -> Decision {
        use Decision::*;
        match (self, rhs) {
            (NotApplicable, r) => r,
            (l, NotApplicable) => l,
            (Failure, _) | (_, Failure) => Failure,
            (Success, CurrentlyFailing) | (CurrentlyFailing, Success) => Failure,
            (Success, _) | (_, Success) => Success,
            (CurrentlySucceeding, CurrentlySucceeding) => CurrentlySucceeding,
            _ => CurrentlyFailing,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::NotApplicable => "n/a",
            Decision::CurrentlyFailing => "F?",
            Decision::CurrentlySucceeding => "T?",
            Decision::Success => "T",
            Decision::Failure => "F",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Objective {
    CollectBriefcase,
    DontKillDogs,
    KillYourMark,
    KillAllEnemies,
    LevelComplete,
    LevelCompleteWithin { turns: u32 },
    NoKill,
    SpeedKill,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::CollectBriefcase => write!(f, "Collect Briefcase"),
            Objective::DontKillDogs => write!(f, "Don't Kill Dogs"),
            Objective::KillYourMark => write!(f, "Kill Your Mark"),
            Objective::KillAllEnemies => write!(f, "Kill All Enemies"),
            Objective::LevelComplete => write!(f, "Level Complete"),
            Objective::LevelCompleteWithin { turns } => write!(f, "{turns} Turns or Fewer"),
            Objective::NoKill => write!(f, "No Kill"),
            Objective::SpeedKill => write!(f, "Speed Kill"),
        }
    }
}

impl Objective {
    pub fn judge(&self, initial: &GameState, current: &GameState, turns: u32) -> Decision {
        match *self {
            Objective::CollectBriefcase => {
                if current.operative.has_briefcase {
                    return Decision::CurrentlySucceeding;
                }
                if find_briefcase(&current.map).is_none() {
                    return Decision::NotApplicable;
                }
                Decision::CurrentlyFailing
            }

            Objective::DontKillDogs => {
                let initial_dogs = count_dogs(&initial.map);
                if initial_dogs == 0 {
                    return Decision::NotApplicable;
                }
                let current_dogs = count_dogs(&current.map);
                debug_assert!(current_dogs <= initial_dogs);
                if current_dogs == initial_dogs {
                    Decision::CurrentlySucceeding
                } else {
                    Decision::Failure
                }
            }

            Objective::KillYourMark => {
                if find_mark(&initial.map).is_none() {
                    return Decision::NotApplicable;
                }
                if find_mark(&current.map).is_none() {
                    return Decision::Success;
                }
                Decision::CurrentlyFailing
            }

            Objective::KillAllEnemies => {
                if count_enemies(&initial.map) == 0 {
                    return Decision::NotApplicable;
                }
                if count_enemies(&current.map) == 0 {
                    Decision::CurrentlySucceeding
                } else {
                    Decision::CurrentlyFailing
                }
            }

            Objective::LevelComplete => {
                let Some(exit) = find_exit(&initial.map) else {
                    return Decision::NotApplicable;
                };
                if exit == current.operative.position {
                    Decision::Success
                } else {
                    Decision::CurrentlyFailing
                }
            }

            Objective::LevelCompleteWithin { turns: limit } => {
                let Some(exit) = find_exit(&initial.map) else {
                    return Decision::NotApplicable;
                };
                if exit == current.operative.position {
                    if turns <= limit { Decision::Success } else { Decision::Failure }
                } else {
                    Decision::CurrentlyFailing
                }
            }

            Objective::NoKill => {
                let initial_enemies = count_enemies(&initial.map);
                if initial_enemies == 0 {
                    return Decision::NotApplicable;
                }
                if count_enemies(&current.map) == initial_enemies {
                    Decision::CurrentlySucceeding
                } else {
                    Decision::Failure
                }
            }

            Objective::SpeedKill => {
                if !(has_enemies(&initial.map) && has_walkways(&initial.map)) {
                    return Decision::NotApplicable;
                }
                if current.operative.speed_kill {
                    Decision::CurrentlySucceeding
                } else {
                    Decision::CurrentlyFailing
                }
            }
        }
    }
}
