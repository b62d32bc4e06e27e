//! Line-oriented console player.
//!
//! Renders the board as text on stdout and reads one answer per line:
//! a cell number `0`–`8` on the local turn, `y`/`n` after a finished
//! game. End of input or `q` quits.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use noughts_core::{Board, CELL_COUNT, GameOutcome, Mark, Rejection, Role, SessionEvent};

use crate::player::Player;

/// What a line of input means on the local turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellInput {
    Cell(u8),
    Quit,
    Invalid,
}

/// Parse a cell answer. Occupancy is checked against the board.
pub fn parse_cell(line: &str) -> CellInput {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return CellInput::Quit;
    }
    match line.parse::<u8>() {
        Ok(cell) if usize::from(cell) < CELL_COUNT => CellInput::Cell(cell),
        _ => CellInput::Invalid,
    }
}

/// Parse a yes/no answer. `None` means ask again.
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "q" | "quit" => Some(false),
        _ => None,
    }
}

/// Heading printed after a finished game.
pub fn outcome_message(outcome: GameOutcome, role: Role) -> String {
    match outcome {
        GameOutcome::Win(Mark::Mine) => format!("{} won. You win!", role.symbol()),
        GameOutcome::Win(Mark::Theirs) => format!("{} won. You lose.", role.opponent_symbol()),
        GameOutcome::Draw => "Draw.".to_string(),
        GameOutcome::None => String::new(),
    }
}

pub struct ConsolePlayer<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> ConsolePlayer<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("console input failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Player for ConsolePlayer<R> {
    async fn choose_cell(&mut self, board: &Board) -> Option<u8> {
        loop {
            println!("Your move (0-8, q to quit):");
            match parse_cell(&self.read_line().await?) {
                CellInput::Cell(cell) if board.is_empty_cell(cell) => return Some(cell),
                CellInput::Cell(cell) => println!("Cell {cell} is not free."),
                CellInput::Quit => return None,
                CellInput::Invalid => println!("Enter a number between 0 and 8."),
            }
        }
    }

    async fn rematch(&mut self, _outcome: GameOutcome) -> bool {
        loop {
            println!("Play again? [y/n]");
            let Some(line) = self.read_line().await else {
                return false;
            };
            if let Some(answer) = parse_answer(&line) {
                return answer;
            }
        }
    }

    fn show(&mut self, role: Role, event: &SessionEvent) {
        match event {
            SessionEvent::Started { role } => {
                let order = if role.moves_first() { "first" } else { "second" };
                println!("You play {} and move {order}.", role.symbol());
            }
            SessionEvent::Board { board, my_turn } => {
                println!();
                print!("{}", board.render(role.symbol(), role.opponent_symbol()));
                if !my_turn && !board.outcome().is_over() {
                    println!("Waiting for {}...", role.opponent_symbol());
                }
            }
            SessionEvent::Rejected { reason, .. } => match reason {
                Rejection::GameOver => {}
                other => println!("Move rejected: {other}."),
            },
            SessionEvent::GameOver(outcome) => println!("{}", outcome_message(*outcome, role)),
        }
    }
}
