//! Game session: one link, one role, any number of consecutive games.
//!
//! A single actor task owns the [`TurnController`] and the inbound half
//! of the link. Local input reaches it as [`SessionCommand`]s on a queue,
//! remote moves arrive on the [`MoveReceiver`], and the actor handles
//! one of either at a time, so board and turn flag are never touched
//! concurrently. Everything the UI needs to show comes back as
//! [`SessionEvent`]s.
//!
//! While a finished game waits for the local player's restart/quit
//! answer, the actor stops reading the link: remote moves for the next
//! game stay queued in the socket until the local board is cleared.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::board::{Board, GameOutcome, Mark};
use crate::error::NoughtsError;
use crate::message::{Move, Role};
use crate::network::channel::{MoveChannel, MoveReceiver, MoveSender};
use crate::network::launcher::RemoteLauncher;
use crate::network::rendezvous::{Rendezvous, RendezvousConfig};
use crate::state::{LocalMoveResult, Rejection, SessionPhase, TurnController};

// ── Commands & events ────────────────────────────────────────────

/// Input from the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// The local player picked a cell.
    LocalMove(u8),
    /// Answer "yes" to the restart prompt.
    Restart,
    /// Answer "no": end the session.
    Quit,
}

/// Notifications for the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is live with this role.
    Started { role: Role },
    /// The board changed (a move was applied or the board was reset).
    Board { board: Board, my_turn: bool },
    /// A local move request was ignored.
    Rejected { cell: u8, reason: Rejection },
    /// The game ended. Answer with [`SessionCommand::Restart`] or
    /// [`SessionCommand::Quit`].
    GameOver(GameOutcome),
}

// ── SessionHandle ────────────────────────────────────────────────

/// Cloneable UI-side handle used to drive a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    role: Role,
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn role(&self) -> Role {
        self.role
    }

    /// Ask to play `cell`. The answer arrives as a `Board` or `Rejected`
    /// event.
    pub fn request_local_move(&self, cell: u8) -> Result<(), NoughtsError> {
        self.send(SessionCommand::LocalMove(cell))
    }

    /// Clear the board after a finished game.
    pub fn restart(&self) -> Result<(), NoughtsError> {
        self.send(SessionCommand::Restart)
    }

    /// End the session. The counterpart is not notified and will see
    /// the link close.
    pub fn quit(&self) -> Result<(), NoughtsError> {
        self.send(SessionCommand::Quit)
    }

    pub fn send(&self, command: SessionCommand) -> Result<(), NoughtsError> {
        self.commands.send(command)?;
        Ok(())
    }

    /// Resolves once the session task has stopped.
    pub async fn closed(&self) {
        self.commands.closed().await
    }
}

// ── GameSession ──────────────────────────────────────────────────

/// A running session: the handle, the event stream, and the actor task.
pub struct GameSession {
    handle: SessionHandle,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<Result<(), NoughtsError>>,
}

impl GameSession {
    /// Rendezvous with `host:port`, then start playing.
    pub async fn connect(
        host: &str,
        port: u16,
        config: RendezvousConfig,
    ) -> Result<Self, NoughtsError> {
        let rendezvous = Rendezvous::resolve(host, port, config).await?;
        let (channel, role) = rendezvous.negotiate().await?;
        Ok(Self::start(channel, role))
    }

    /// Launch a counterpart on `host` and play against it.
    pub async fn launch(launcher: &dyn RemoteLauncher, host: &str) -> Result<Self, NoughtsError> {
        info!("launching counterpart on {host}");
        let channel = launcher.launch(host).await?;
        Ok(Self::start(channel, launcher.local_role()))
    }

    /// Start a session on an already connected channel.
    pub fn start(channel: MoveChannel, role: Role) -> Self {
        let (sender, receiver) = channel.split();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            controller: TurnController::new(role, sender),
            receiver,
            commands: command_rx,
            events: event_tx,
            phase: SessionPhase::default(),
        };
        let task = tokio::spawn(actor.run());

        Self {
            handle: SessionHandle {
                role,
                commands: command_tx,
            },
            events: event_rx,
            task,
        }
    }

    pub fn role(&self) -> Role {
        self.handle.role
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Next notification, or `None` once the session has stopped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Wait for the session to stop and return how it ended.
    pub async fn join(self) -> Result<(), NoughtsError> {
        drop(self.events);
        // A panic or abort inside the task folds into the error type.
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(NoughtsError::Other(format!("session task failed: {e}"))),
        }
    }
}

// ── SessionActor ─────────────────────────────────────────────────

struct SessionActor {
    controller: TurnController<MoveSender>,
    receiver: MoveReceiver,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    phase: SessionPhase,
}

impl SessionActor {
    async fn run(mut self) -> Result<(), NoughtsError> {
        let role = self.controller.role();
        self.phase.begin_play()?;
        info!(
            "session started as {role} ({}), playing {}",
            role.legacy_name(),
            role.symbol()
        );
        self.emit(SessionEvent::Started { role });
        self.emit_board();

        let result = self.run_loop().await;
        self.phase.end();
        match &result {
            Ok(()) => info!("session ended"),
            Err(e) => error!(phase = %e.phase(), "session failed: {e}"),
        }
        result
    }

    async fn run_loop(&mut self) -> Result<(), NoughtsError> {
        loop {
            if self.phase.is_awaiting_decision() {
                // The link is deliberately not polled here.
                match self.commands.recv().await {
                    Some(SessionCommand::Restart) => self.restart()?,
                    Some(SessionCommand::LocalMove(cell)) => self.emit(SessionEvent::Rejected {
                        cell,
                        reason: Rejection::GameOver,
                    }),
                    Some(SessionCommand::Quit) | None => return Ok(()),
                }
                continue;
            }

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::LocalMove(cell)) => self.local_move(cell).await?,
                    Some(SessionCommand::Restart) => {
                        warn!("restart ignored: game {} still running", self.phase.game());
                    }
                    Some(SessionCommand::Quit) | None => return Ok(()),
                },
                received = self.receiver.receive() => self.remote_move(received?)?,
            }
        }
    }

    async fn local_move(&mut self, cell: u8) -> Result<(), NoughtsError> {
        match self.controller.request_local_move(cell).await? {
            LocalMoveResult::Rejected(reason) => {
                self.emit(SessionEvent::Rejected { cell, reason });
                Ok(())
            }
            LocalMoveResult::Accepted(outcome) => {
                self.emit_board();
                self.settle(outcome)
            }
        }
    }

    fn remote_move(&mut self, mv: Move) -> Result<(), NoughtsError> {
        let outcome = self.controller.apply_remote_move(mv)?;
        self.emit_board();
        self.settle(outcome)
    }

    fn restart(&mut self) -> Result<(), NoughtsError> {
        self.phase.restart()?;
        self.controller.restart();
        info!("game {} started", self.phase.game());
        self.emit_board();
        Ok(())
    }

    /// Move to `AwaitingDecision` if `outcome` ends the game.
    fn settle(&mut self, outcome: GameOutcome) -> Result<(), NoughtsError> {
        if !outcome.is_over() {
            return Ok(());
        }
        let role = self.controller.role();
        match outcome {
            GameOutcome::Win(Mark::Mine) => info!("game {}: {} won (us)", self.phase.game(), role.symbol()),
            GameOutcome::Win(Mark::Theirs) => {
                info!("game {}: {} won (them)", self.phase.game(), role.opponent_symbol())
            }
            _ => info!("game {}: draw", self.phase.game()),
        }
        self.phase.finish_game()?;
        self.emit(SessionEvent::GameOver(outcome));
        Ok(())
    }

    fn emit_board(&self) {
        self.emit(SessionEvent::Board {
            board: *self.controller.board(),
            my_turn: self.controller.my_turn(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // A UI that stopped listening does not stop the game.
        let _ = self.events.send(event);
    }
}
