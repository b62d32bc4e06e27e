//! Domain-specific error types for the noughts protocol.
//!
//! All fallible operations return `Result<T, NoughtsError>`.
//! Every error is typed and knows which phase of a game it belongs to,
//! so callers can report "failed during rendezvous" vs "failed in game".

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// The canonical error type for the noughts protocol.
#[derive(Debug, Error)]
pub enum NoughtsError {
    // ── Usage Errors ─────────────────────────────────────────────
    /// The rendezvous target could not be parsed or resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The rendezvous port is below the accepted range.
    #[error("invalid port {port}: must be at least {min}")]
    InvalidPort { port: u16, min: u16 },

    // ── Rendezvous Errors ────────────────────────────────────────
    /// Binding the listening socket failed for a reason other than the
    /// port already being in use.
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Accepting an inbound connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The counterpart process could not be launched.
    #[error("launch failed: {0}")]
    Launch(String),

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Link Errors ──────────────────────────────────────────────
    /// The TCP/IO layer reported an error after the link was up.
    #[error("link error: {0}")]
    Link(#[from] std::io::Error),

    /// The peer closed the connection.
    #[error("link closed by peer")]
    LinkClosed,

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    // ── Protocol Errors ──────────────────────────────────────────
    /// The peer sent a move that cannot be applied to our board.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A session phase transition was attempted from the wrong phase.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    // ── Framing Errors ───────────────────────────────────────────
    /// Received bytes that do not start with the frame magic.
    #[error("invalid magic bytes: expected NGT0")]
    InvalidMagic,

    /// The frame payload failed checksum verification.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// The payload exceeds the codec limit.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A move referenced a cell outside the board.
    #[error("cell index {0} out of range (0..=8)")]
    CellOutOfRange(u8),

    /// Encoding or decoding of a payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    // ── Other ────────────────────────────────────────────────────
    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Phase ────────────────────────────────────────────────────────

/// The part of a game's lifetime an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before any network activity (argument and config checks).
    Startup,
    /// Binding, accepting, connecting or launching the counterpart.
    Rendezvous,
    /// After the link is established.
    InGame,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Startup => write!(f, "startup"),
            Phase::Rendezvous => write!(f, "rendezvous"),
            Phase::InGame => write!(f, "in-game"),
        }
    }
}

impl NoughtsError {
    /// Classify this error by the phase it can occur in.
    pub fn phase(&self) -> Phase {
        match self {
            NoughtsError::InvalidAddress(_) | NoughtsError::InvalidPort { .. } => Phase::Startup,
            NoughtsError::Bind { .. }
            | NoughtsError::Accept(_)
            | NoughtsError::Launch(_)
            | NoughtsError::Timeout(_) => Phase::Rendezvous,
            _ => Phase::InGame,
        }
    }

    /// Returns `true` for errors that mean the two peers no longer agree
    /// on the game state.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, NoughtsError::ProtocolViolation(_))
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for NoughtsError {
    fn from(s: String) -> Self {
        NoughtsError::Other(s)
    }
}

impl From<&str> for NoughtsError {
    fn from(s: &str) -> Self {
        NoughtsError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for NoughtsError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        NoughtsError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for NoughtsError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        NoughtsError::Encoding(e.to_string())
    }
}
