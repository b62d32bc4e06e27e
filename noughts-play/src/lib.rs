//! # noughts-play — networked tic-tac-toe front end
//!
//! Wires a [`noughts_core::GameSession`] to a local player.
//!
//! ## Modes
//!
//! - **Rendezvous**: two copies started with the same address and port
//!   find each other; one becomes Host, the other Peer.
//! - **Auto**: start an autoplaying counterpart on a remote machine over
//!   `ssh` and play first against it.
//! - **Stdio**: the far end of auto mode; plays second over stdin/stdout.

pub mod app;
pub mod autoplay;
pub mod config;
pub mod console;
pub mod launcher;
pub mod player;
