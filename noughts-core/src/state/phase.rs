//! Session lifecycle state machine.
//!
//! Provides a `SessionPhase` enum that models a game session from
//! rendezvous to exit, with validated transitions that return `Result`
//! instead of panicking.

use crate::error::NoughtsError;

// ── SessionPhase ─────────────────────────────────────────────────

/// The current phase of a game session.
///
/// ```text
///  Negotiating ──► Playing ◄──► AwaitingDecision   (finish / restart)
///       │             │                │
///       ▼             ▼                ▼
///       └────────────► Ended ◄─────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Rendezvous or launch in progress. Initial state.
    #[default]
    Negotiating,

    /// Link is up and moves are flowing.
    Playing {
        /// How many games have been started on this link.
        game: u32,
    },

    /// A game finished; remote moves are held back until the local
    /// player chooses to restart or quit.
    AwaitingDecision {
        /// Number of the game that just finished.
        game: u32,
    },

    /// Terminal state: voluntary quit or fatal error.
    Ended,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negotiating => write!(f, "Negotiating"),
            Self::Playing { .. } => write!(f, "Playing"),
            Self::AwaitingDecision { .. } => write!(f, "AwaitingDecision"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

impl SessionPhase {
    /// Returns `true` while a finished game waits for restart or quit.
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::AwaitingDecision { .. })
    }

    /// Number of the current or last game, `0` before the first.
    pub fn game(&self) -> u32 {
        match self {
            Self::Playing { game } | Self::AwaitingDecision { game } => *game,
            _ => 0,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Playing` with the first game.
    ///
    /// Valid from: `Negotiating`.
    pub fn begin_play(&mut self) -> Result<(), NoughtsError> {
        match self {
            Self::Negotiating => {
                *self = Self::Playing { game: 1 };
                Ok(())
            }
            _ => Err(NoughtsError::InvalidTransition(
                "cannot start play: not in Negotiating state",
            )),
        }
    }

    /// Transition to `AwaitingDecision`.
    ///
    /// Valid from: `Playing`.
    pub fn finish_game(&mut self) -> Result<(), NoughtsError> {
        match self {
            Self::Playing { game } => {
                let game = *game;
                *self = Self::AwaitingDecision { game };
                Ok(())
            }
            _ => Err(NoughtsError::InvalidTransition(
                "cannot finish game: not in Playing state",
            )),
        }
    }

    /// Transition back to `Playing` with the next game number.
    ///
    /// Valid from: `AwaitingDecision`. A running game cannot be
    /// restarted on one side only.
    pub fn restart(&mut self) -> Result<(), NoughtsError> {
        match self {
            Self::AwaitingDecision { game } => {
                let next = *game + 1;
                *self = Self::Playing { game: next };
                Ok(())
            }
            _ => Err(NoughtsError::InvalidTransition(
                "cannot restart: no finished game to restart",
            )),
        }
    }

    /// Force the terminal state regardless of current state.
    pub fn end(&mut self) {
        *self = Self::Ended;
    }
}

// ── Tests ────────────────────────────────────────────────────────
