//! The 3×3 board.
//!
//! Pure state, no I/O. Marks are relational (`Mine` / `Theirs`) so the
//! same board type works on both sides of a game; symbols are only
//! attached when rendering.

use std::fmt::Write as _;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// The eight lines that win a game: rows, columns, diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

// ── Mark ─────────────────────────────────────────────────────────

/// Who owns a cell, relative to the local process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Mine,
    Theirs,
}

impl Mark {
    /// The other side's mark.
    pub fn other(&self) -> Mark {
        match self {
            Mark::Mine => Mark::Theirs,
            Mark::Theirs => Mark::Mine,
        }
    }
}

// ── GameOutcome ──────────────────────────────────────────────────

/// Result of evaluating a board. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// The game is still running.
    None,
    /// The given mark completed a line.
    Win(Mark),
    /// Every cell is marked and nobody completed a line.
    Draw,
}

impl GameOutcome {
    /// Returns `true` for `Win` and `Draw`.
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::None)
    }
}

// ── Board ────────────────────────────────────────────────────────

/// Nine cells, each empty or holding exactly one mark until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Mark>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mark in `index`, or `None` when empty or off the board.
    pub fn cell(&self, index: u8) -> Option<Mark> {
        self.cells.get(index as usize).copied().flatten()
    }

    /// Returns `true` when `index` is on the board and unmarked.
    pub fn is_empty_cell(&self, index: u8) -> bool {
        matches!(self.cells.get(index as usize), Some(None))
    }

    /// Mark `index` with `mark`.
    ///
    /// Returns `false` without changing anything if the cell is already
    /// marked or off the board.
    pub fn mark(&mut self, index: u8, mark: Mark) -> bool {
        if !self.is_empty_cell(index) {
            return false;
        }
        self.cells[index as usize] = Some(mark);
        true
    }

    /// Returns `true` if `mark` holds all three cells of any winning line.
    pub fn is_winner(&self, mark: Mark) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(mark)))
    }

    /// Returns `true` when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Clear every cell.
    pub fn reset(&mut self) {
        self.cells = [None; CELL_COUNT];
    }

    /// Evaluate the board. A win takes precedence over a full board.
    pub fn outcome(&self) -> GameOutcome {
        if self.is_winner(Mark::Mine) {
            GameOutcome::Win(Mark::Mine)
        } else if self.is_winner(Mark::Theirs) {
            GameOutcome::Win(Mark::Theirs)
        } else if self.is_full() {
            GameOutcome::Draw
        } else {
            GameOutcome::None
        }
    }

    /// Indexes of all unmarked cells, in ascending order.
    pub fn empty_cells(&self) -> Vec<u8> {
        (0..CELL_COUNT as u8)
            .filter(|&i| self.is_empty_cell(i))
            .collect()
    }

    /// Number of marked cells.
    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Render as three text rows. Empty cells show their index so a
    /// console player can see which number to type.
    pub fn render(&self, mine: char, theirs: char) -> String {
        let mut out = String::new();
        for row in 0..3 {
            if row > 0 {
                out.push_str("---+---+---\n");
            }
            for col in 0..3 {
                let i = row * 3 + col;
                let c = match self.cells[i] {
                    Some(Mark::Mine) => mine,
                    Some(Mark::Theirs) => theirs,
                    None => char::from(b'0' + i as u8),
                };
                if col > 0 {
                    out.push('|');
                }
                let _ = write!(out, " {c} ");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(mark: Mark, cells: &[u8]) -> Board {
        let mut board = Board::new();
        for &c in cells {
            assert!(board.mark(c, mark));
        }
        board
    }

    #[test]
    fn new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.empty_cells().len(), CELL_COUNT);
        assert_eq!(board.outcome(), GameOutcome::None);
        assert!(!board.is_full());
    }

    #[test]
    fn marked_cell_cannot_be_marked_again() {
        for index in 0..CELL_COUNT as u8 {
            let mut board = Board::new();
            assert!(board.mark(index, Mark::Mine));
            assert!(!board.mark(index, Mark::Mine));
            assert!(!board.mark(index, Mark::Theirs));
            assert_eq!(board.cell(index), Some(Mark::Mine));
        }
    }

    #[test]
    fn off_board_index_is_rejected() {
        let mut board = Board::new();
        assert!(!board.mark(9, Mark::Mine));
        assert!(!board.is_empty_cell(9));
        assert_eq!(board.cell(42), None);
    }

    #[test]
    fn every_line_wins_for_its_mark_only() {
        for line in WINNING_LINES {
            for mark in [Mark::Mine, Mark::Theirs] {
                let cells: Vec<u8> = line.iter().map(|&i| i as u8).collect();
                let board = board_with(mark, &cells);
                assert!(board.is_winner(mark), "line {line:?} for {mark:?}");
                assert!(!board.is_winner(mark.other()));
                assert_eq!(board.outcome(), GameOutcome::Win(mark));
            }
        }
    }

    #[test]
    fn two_in_a_row_is_not_a_win() {
        let board = board_with(Mark::Mine, &[0, 1]);
        assert!(!board.is_winner(Mark::Mine));
    }

    #[test]
    fn full_board_without_line_is_draw() {
        // O X O
        // O X X
        // X O O
        let mut board = Board::new();
        for c in [0, 2, 3, 7, 8] {
            board.mark(c, Mark::Mine);
        }
        for c in [1, 4, 5, 6] {
            board.mark(c, Mark::Theirs);
        }
        assert!(board.is_full());
        assert_eq!(board.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn full_board_with_line_is_win_not_draw() {
        // Alternating fill in index order completes both diagonals.
        let mut board = Board::new();
        for c in 0..CELL_COUNT as u8 {
            let mark = if c % 2 == 0 { Mark::Mine } else { Mark::Theirs };
            board.mark(c, mark);
        }
        assert!(board.is_full());
        assert_eq!(board.outcome(), GameOutcome::Win(Mark::Mine));
    }

    #[test]
    fn reset_clears_everything() {
        let mut board = board_with(Mark::Theirs, &[0, 4, 8]);
        board.reset();
        assert_eq!(board, Board::new());
        assert_eq!(board.marked_count(), 0);
    }

    #[test]
    fn render_shows_symbols_and_free_indexes() {
        let mut board = Board::new();
        board.mark(0, Mark::Mine);
        board.mark(4, Mark::Theirs);
        let text = board.render('O', 'X');
        assert!(text.starts_with(" O | 1 | 2 \n"));
        assert!(text.contains(" 3 | X | 5 "));
    }
}
