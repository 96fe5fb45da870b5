use serde::{Deserialize, Serialize};

use crate::error::{MoveError, MoveResult};
use crate::game::Rules;
use crate::types::{Coord, Side};

pub const CELLS: usize = 9;

pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Side for Mark {
    fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

pub type Cells = [Option<Mark>; CELLS];

/// The first completed line on `cells`, with its owner.
pub fn winner(cells: &Cells) -> Option<(Mark, [usize; 3])> {
    WINNING_LINES.iter().find_map(|&line| {
        let [a, b, c] = line;
        match cells[a] {
            Some(mark) if cells[b] == Some(mark) && cells[c] == Some(mark) => Some((mark, line)),
            _ => None,
        }
    })
}

pub fn is_full(cells: &Cells) -> bool {
    cells.iter().all(Option::is_some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicTacToeBoard {
    cells: Cells,
    turn: Mark,
}

impl TicTacToeBoard {
    pub fn new() -> Self {
        Self {
            cells: [None; CELLS],
            turn: Mark::X,
        }
    }

    /// Rebuilds a position. X moves first, so the mark counts fix whose turn
    /// it is.
    pub fn from_cells(cells: Cells) -> Result<Self, String> {
        let x = cells.iter().filter(|&&cell| cell == Some(Mark::X)).count();
        let o = cells.iter().filter(|&&cell| cell == Some(Mark::O)).count();
        let turn = match x.checked_sub(o) {
            Some(0) => Mark::X,
            Some(1) => Mark::O,
            _ => return Err(format!("{x} X and {o} O marks cannot arise in play")),
        };
        Ok(Self { cells, turn })
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    pub fn place(&mut self, index: usize) -> MoveResult<()> {
        match self.cells.get(index) {
            None => Err(MoveError::OutOfBounds(Coord::from_index(index, 3))),
            Some(Some(_)) => Err(MoveError::Occupied(Coord::from_index(index, 3))),
            Some(None) => {
                self.cells[index] = Some(self.turn);
                self.turn = self.turn.opponent();
                Ok(())
            }
        }
    }
}

impl Default for TicTacToeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules for TicTacToeBoard {
    type Move = usize;
    type Player = Mark;

    fn to_move(&self) -> Mark {
        self.turn
    }

    fn legal_moves(&self) -> Vec<usize> {
        if winner(&self.cells).is_some() {
            return Vec::new();
        }
        (0..CELLS).filter(|&idx| self.cells[idx].is_none()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells_from(layout: &str) -> Cells {
        let mut cells = [None; CELLS];
        for (idx, ch) in layout.chars().enumerate() {
            cells[idx] = match ch {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        cells
    }

    #[test]
    fn winner_reports_the_completed_line() {
        assert_eq!(winner(&cells_from("XOX.XO..X")), Some((Mark::X, [0, 4, 8])));
        assert_eq!(winner(&cells_from("OOO.XX.X.")), Some((Mark::O, [0, 1, 2])));
        assert_eq!(winner(&cells_from("XOXXOOOXX")), None);
    }

    #[test]
    fn from_cells_derives_turn_and_rejects_bad_counts() {
        assert_eq!(TicTacToeBoard::from_cells(cells_from("X........")).unwrap().turn(), Mark::O);
        assert_eq!(TicTacToeBoard::from_cells(cells_from("XO.......")).unwrap().turn(), Mark::X);
        assert!(TicTacToeBoard::from_cells(cells_from("O........")).is_err());
        assert!(TicTacToeBoard::from_cells(cells_from("XX.......")).is_err());
    }

    #[test]
    fn place_alternates_and_rejects_taken_cells() {
        let mut board = TicTacToeBoard::new();
        board.place(4).unwrap();

        assert_eq!(board.get(4), Some(Mark::X));
        assert_eq!(board.turn(), Mark::O);
        assert_eq!(board.place(4), Err(MoveError::Occupied(Coord::new(1, 1))));
        assert!(board.place(9).is_err());
        assert_eq!(board.legal_moves().len(), 8);
    }
}
