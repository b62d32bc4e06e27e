//! The move channel: an ordered, framed, bidirectional stream of moves.
//!
//! A [`MoveChannel`] wraps any byte stream pair in [`MoveCodec`] framing.
//! It can be built from a `TcpStream` after rendezvous, or from the
//! halves of some other duplex stream (stdio, a child process's pipes).

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::MoveCodec;
use crate::error::NoughtsError;
use crate::message::Move;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

// ── MoveSink ─────────────────────────────────────────────────────

/// Anything a turn controller can push outbound moves into.
#[async_trait]
pub trait MoveSink: Send {
    /// Deliver `mv` to the counterpart, in order.
    async fn send_move(&mut self, mv: Move) -> Result<(), NoughtsError>;
}

// ── MoveChannel ──────────────────────────────────────────────────

/// A connected, framed move stream to exactly one counterpart.
pub struct MoveChannel {
    sender: MoveSender,
    receiver: MoveReceiver,
}

impl MoveChannel {
    /// Frame a connected TCP stream.
    pub fn new(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self::from_halves(reader, writer)
    }

    /// Frame an arbitrary reader/writer pair.
    pub fn from_halves<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            sender: MoveSender {
                inner: FramedWrite::new(Box::new(writer), MoveCodec),
            },
            receiver: MoveReceiver {
                inner: FramedRead::new(Box::new(reader), MoveCodec),
            },
        }
    }

    /// Send one move and flush it.
    pub async fn send(&mut self, mv: Move) -> Result<(), NoughtsError> {
        self.sender.send(mv).await
    }

    /// Wait for the next move from the counterpart.
    pub async fn receive(&mut self) -> Result<Move, NoughtsError> {
        self.receiver.receive().await
    }

    /// Separate the two directions so they can be driven independently.
    pub fn split(self) -> (MoveSender, MoveReceiver) {
        (self.sender, self.receiver)
    }
}

impl std::fmt::Debug for MoveChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveChannel").finish_non_exhaustive()
    }
}

// ── Halves ───────────────────────────────────────────────────────

/// Outbound half of a [`MoveChannel`].
pub struct MoveSender {
    inner: FramedWrite<BoxedWriter, MoveCodec>,
}

impl MoveSender {
    /// Send one move and flush it.
    pub async fn send(&mut self, mv: Move) -> Result<(), NoughtsError> {
        self.inner.send(mv).await
    }
}

#[async_trait]
impl MoveSink for MoveSender {
    async fn send_move(&mut self, mv: Move) -> Result<(), NoughtsError> {
        self.send(mv).await
    }
}

/// Inbound half of a [`MoveChannel`].
pub struct MoveReceiver {
    inner: FramedRead<BoxedReader, MoveCodec>,
}

impl MoveReceiver {
    /// Wait for the next move.
    ///
    /// A clean end of stream is reported as [`NoughtsError::LinkClosed`].
    /// Cancel safe: dropping the future never loses a buffered move.
    pub async fn receive(&mut self) -> Result<Move, NoughtsError> {
        match self.inner.next().await {
            Some(result) => result,
            None => Err(NoughtsError::LinkClosed),
        }
    }
}
