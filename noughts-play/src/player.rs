//! The local side of a session: whoever picks cells and answers the
//! restart prompt.
//!
//! [`drive`] turns a [`GameSession`]'s event stream into calls on a
//! [`Player`] and feeds the answers back as commands. Console and
//! autoplay are the two players shipped here.

use async_trait::async_trait;
use tracing::debug;

use noughts_core::{Board, GameOutcome, GameSession, NoughtsError, Role, SessionEvent, SessionHandle};

#[async_trait]
pub trait Player: Send {
    /// Pick a cell on `board` for the local side. `None` quits.
    async fn choose_cell(&mut self, board: &Board) -> Option<u8>;

    /// Answer the restart prompt after a finished game.
    async fn rematch(&mut self, outcome: GameOutcome) -> bool;

    /// Observe an event before it is acted on.
    fn show(&mut self, _role: Role, _event: &SessionEvent) {}
}

/// Run `session` to completion with `player` on the local side.
pub async fn drive<P>(mut session: GameSession, player: &mut P) -> Result<(), NoughtsError>
where
    P: Player + ?Sized,
{
    let handle = session.handle();
    let role = session.role();
    let mut board = Board::new();

    while let Some(event) = session.next_event().await {
        player.show(role, &event);
        match event {
            SessionEvent::Started { .. } => {}
            SessionEvent::Board { board: b, my_turn } => {
                board = b;
                if my_turn && !board.outcome().is_over() {
                    take_turn(player, &handle, &board).await;
                }
            }
            // Our own pick was refused: ask again on the same board.
            SessionEvent::Rejected { .. } => {
                if !board.outcome().is_over() {
                    take_turn(player, &handle, &board).await;
                }
            }
            SessionEvent::GameOver(outcome) => {
                let answer = if player.rematch(outcome).await {
                    handle.restart()
                } else {
                    handle.quit()
                };
                ignore_stopped(answer);
            }
        }
    }

    session.join().await
}

async fn take_turn<P>(player: &mut P, handle: &SessionHandle, board: &Board)
where
    P: Player + ?Sized,
{
    let sent = tokio::select! {
        cell = player.choose_cell(board) => match cell {
            Some(cell) => handle.request_local_move(cell),
            None => handle.quit(),
        },
        // The link died while we were thinking.
        _ = handle.closed() => return,
    };
    ignore_stopped(sent);
}

/// A command sent after the session stopped is dropped; the session's
/// own result explains why it stopped.
fn ignore_stopped(sent: Result<(), NoughtsError>) {
    if let Err(e) = sent {
        debug!("command not delivered: {e}");
    }
}
