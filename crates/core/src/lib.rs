pub mod game;
pub mod loader;
pub mod objective;
pub mod replay;
pub mod route;
pub mod state;
pub mod types;

pub use game::{Action, ActionError, GameError, InvariantError, apply_action, legal_actions};
pub use objective::{Decision, Objective};
pub use replay::*;
pub use state::{GameState, IdAlloc, Operative};
pub use types::*;
