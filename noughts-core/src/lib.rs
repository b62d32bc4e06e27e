//! # noughts-core
//!
//! Core library for two-player tic-tac-toe over a single TCP link.
//!
//! This crate contains:
//! - **Board**: `Board`, `Mark`, `GameOutcome` and the eight winning lines
//! - **Wire format**: `Move`, `FrameHeader`, and `MoveCodec` for framed I/O via `tokio_util`
//! - **Network**: symmetric `Rendezvous` on one shared port, `MoveChannel`, `RemoteLauncher`
//! - **State**: `SessionPhase` lifecycle and the `TurnController` that owns the turn flag
//! - **Session**: `GameSession`, the actor that serializes local and remote moves
//! - **Error**: `NoughtsError`, a `thiserror`-based error hierarchy tagged by phase

pub mod board;
pub mod codec;
pub mod error;
pub mod header;
pub mod message;
pub mod network;
pub mod session;
pub mod state;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use board::{Board, CELL_COUNT, GameOutcome, Mark, WINNING_LINES};
pub use codec::{MAX_PAYLOAD_SIZE, MoveCodec};
pub use error::{NoughtsError, Phase};
pub use header::{FrameHeader, HEADER_SIZE};
pub use message::{Move, Role};
pub use network::{
    MIN_PORT, MoveChannel, MoveReceiver, MoveSender, MoveSink, RemoteLauncher, Rendezvous,
    RendezvousConfig,
};
pub use session::{GameSession, SessionCommand, SessionEvent, SessionHandle};
pub use state::{LocalMoveResult, Rejection, SessionPhase, TurnController};
