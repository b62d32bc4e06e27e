//! Seam for bootstrapping a counterpart on another machine.
//!
//! Instead of a rendezvous, a launcher starts the counterpart process
//! itself and hands back a duplex byte stream already connected to it.
//! The launching side always moves first.

use async_trait::async_trait;

use crate::error::NoughtsError;
use crate::message::Role;
use crate::network::channel::MoveChannel;

/// Starts a counterpart on `host` and returns a channel to it.
#[async_trait]
pub trait RemoteLauncher: Send + Sync {
    /// Launch the counterpart and connect to its stdin/stdout (or
    /// whatever duplex stream the implementation provides).
    async fn launch(&self, host: &str) -> Result<MoveChannel, NoughtsError>;

    /// Role of the launching process.
    fn local_role(&self) -> Role {
        Role::Peer
    }
}
