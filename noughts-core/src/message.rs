//! The move message and the negotiated role.
//!
//! A [`Move`] is the only thing that ever crosses the wire. It carries
//! no mark and no sender: a move we send is ours, a move we receive is
//! theirs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::CELL_COUNT;
use crate::error::NoughtsError;

// ── Move ─────────────────────────────────────────────────────────

/// A single cell index exchanged once per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    cell: u8,
}

impl Move {
    /// Build a move, rejecting cells outside `0..=8`.
    pub fn new(cell: u8) -> Result<Self, NoughtsError> {
        if (cell as usize) < CELL_COUNT {
            Ok(Self { cell })
        } else {
            Err(NoughtsError::CellOutOfRange(cell))
        }
    }

    /// The cell index, always in `0..=8`.
    pub fn cell(&self) -> u8 {
        self.cell
    }
}

impl TryFrom<u8> for Move {
    type Error = NoughtsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Move::new(value)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}", self.cell)
    }
}

// ── Role ─────────────────────────────────────────────────────────

/// Which side of the rendezvous this process ended up on.
///
/// The Host accepted an inbound connection and moves second. The Peer
/// connected out and moves first. A role never changes for the lifetime
/// of a session, restarts included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Host,
    Peer,
}

impl Role {
    /// Returns `true` for the side that plays the opening move.
    pub fn moves_first(&self) -> bool {
        matches!(self, Role::Peer)
    }

    /// The turn flag a fresh board starts with.
    pub fn initial_turn(&self) -> bool {
        self.moves_first()
    }

    /// The complementary role.
    pub fn opposite(&self) -> Role {
        match self {
            Role::Host => Role::Peer,
            Role::Peer => Role::Host,
        }
    }

    /// Display symbol for our own marks. The first mover draws `O`.
    pub fn symbol(&self) -> char {
        match self {
            Role::Peer => 'O',
            Role::Host => 'X',
        }
    }

    /// Display symbol for the counterpart's marks.
    pub fn opponent_symbol(&self) -> char {
        self.opposite().symbol()
    }

    /// "former" for the first mover, "latter" for the second.
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Role::Peer => "former",
            Role::Host => "latter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "Host"),
            Role::Peer => write!(f, "Peer"),
        }
    }
}
