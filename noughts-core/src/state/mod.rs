pub mod phase;
mod turn;

pub use phase::SessionPhase;
pub use turn::{LocalMoveResult, Rejection, TurnController};
