//! Turn synchronization.
//!
//! [`TurnController`] is the only thing allowed to touch the board and
//! the turn flag. It has exactly three entry points: a local move
//! request, a remote move notification, and a restart. Whoever owns the
//! controller serializes calls to them; the session actor does.

use tracing::{debug, warn};

use crate::board::{Board, GameOutcome, Mark};
use crate::error::NoughtsError;
use crate::message::{Move, Role};
use crate::network::channel::MoveSink;

/// Why a local move request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The counterpart has the move.
    NotYourTurn,
    /// The cell already holds a mark.
    Occupied,
    /// The cell index is not on the board.
    OutOfRange,
    /// The current game already has a result.
    GameOver,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NotYourTurn => write!(f, "not your turn"),
            Rejection::Occupied => write!(f, "cell occupied"),
            Rejection::OutOfRange => write!(f, "cell out of range"),
            Rejection::GameOver => write!(f, "game over"),
        }
    }
}

/// Result of a local move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMoveResult {
    /// The move was applied and sent; carries the board's new outcome.
    Accepted(GameOutcome),
    /// Nothing changed.
    Rejected(Rejection),
}

/// Owns the board, the turn flag and the outbound half of the link.
pub struct TurnController<S> {
    role: Role,
    board: Board,
    my_turn: bool,
    sink: S,
}

impl<S: MoveSink> TurnController<S> {
    /// Fresh board, turn flag taken from `role`.
    pub fn new(role: Role, sink: S) -> Self {
        Self {
            role,
            board: Board::new(),
            my_turn: role.initial_turn(),
            sink,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// `true` when the local process may move now.
    pub fn my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn outcome(&self) -> GameOutcome {
        self.board.outcome()
    }

    /// Play `cell` for the local side.
    ///
    /// On success the cell is marked [`Mark::Mine`], the turn passes to
    /// the counterpart, and the move is sent. A rejected request leaves
    /// everything untouched. Only a failed send is an error.
    pub async fn request_local_move(&mut self, cell: u8) -> Result<LocalMoveResult, NoughtsError> {
        let rejection = if self.board.outcome().is_over() {
            Some(Rejection::GameOver)
        } else if !self.my_turn {
            Some(Rejection::NotYourTurn)
        } else if Move::new(cell).is_err() {
            Some(Rejection::OutOfRange)
        } else if !self.board.is_empty_cell(cell) {
            Some(Rejection::Occupied)
        } else {
            None
        };
        if let Some(reason) = rejection {
            debug!("local move at {cell} rejected: {reason}");
            return Ok(LocalMoveResult::Rejected(reason));
        }

        let mv = Move::new(cell)?;
        self.board.mark(cell, Mark::Mine);
        self.my_turn = false;
        self.sink.send_move(mv).await?;
        debug!("sent {mv}");
        Ok(LocalMoveResult::Accepted(self.board.outcome()))
    }

    /// Apply a move received from the counterpart.
    ///
    /// A move onto a marked cell, out of turn, or after the game ended
    /// means the two boards disagree; that is a fatal
    /// [`NoughtsError::ProtocolViolation`].
    pub fn apply_remote_move(&mut self, mv: Move) -> Result<GameOutcome, NoughtsError> {
        if self.board.outcome().is_over() {
            return Err(violation(format!("{mv} received after the game ended")));
        }
        if self.my_turn {
            return Err(violation(format!("{mv} received out of turn")));
        }
        if !self.board.mark(mv.cell(), Mark::Theirs) {
            return Err(violation(format!("{mv} is already marked")));
        }
        self.my_turn = true;
        debug!("received {mv}");
        Ok(self.board.outcome())
    }

    /// Clear the board and hand the first move back to whoever the role
    /// says moves first.
    pub fn restart(&mut self) {
        self.board.reset();
        self.my_turn = self.role.initial_turn();
    }
}

fn violation(message: String) -> NoughtsError {
    warn!("protocol violation: {message}");
    NoughtsError::ProtocolViolation(message)
}
