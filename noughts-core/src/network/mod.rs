//! Networking: the framed move channel, the symmetric rendezvous that
//! produces it, and the seam for launching a counterpart remotely.

pub mod channel;
pub mod launcher;
pub mod rendezvous;

pub use channel::{MoveChannel, MoveReceiver, MoveSender, MoveSink};
pub use launcher::RemoteLauncher;
pub use rendezvous::{MIN_PORT, Rendezvous, RendezvousConfig};
