use serde::{Deserialize, Serialize};

use crate::board::{Grid, LINE_AXES};
use crate::error::{MoveError, MoveResult};
use crate::game::Rules;
use crate::types::{Coord, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stone {
    Black,
    White,
}

impl Side for Stone {
    fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

pub type Cell = Option<Stone>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GomokuBoard {
    grid: Grid<Cell>,
    line_length: u8,
    turn: Stone,
}

impl GomokuBoard {
    pub fn new(size: u8, line_length: u8) -> Self {
        Self {
            grid: Grid::new(size, None),
            line_length,
            turn: Stone::Black,
        }
    }

    /// Rebuilds a position, checking that the stone counts agree with the
    /// side to move (black moves first).
    pub fn from_parts(grid: Grid<Cell>, line_length: u8, turn: Stone) -> Result<Self, String> {
        let black = grid.count(Some(Stone::Black));
        let white = grid.count(Some(Stone::White));
        let expected = match turn {
            Stone::Black => black == white,
            Stone::White => black == white + 1,
        };
        if !expected {
            return Err(format!(
                "{black} black and {white} white stones cannot have {turn:?} to move"
            ));
        }
        if line_length < 3 || line_length > grid.size() {
            return Err(format!("line length {line_length} does not fit the board"));
        }
        Ok(Self {
            grid,
            line_length,
            turn,
        })
    }

    pub fn size(&self) -> u8 {
        self.grid.size()
    }

    pub fn line_length(&self) -> u8 {
        self.line_length
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.grid
    }

    pub fn get(&self, at: Coord) -> Cell {
        self.grid.get(at).flatten()
    }

    pub fn turn(&self) -> Stone {
        self.turn
    }

    pub fn is_full(&self) -> bool {
        self.grid.count(None) == 0
    }

    pub fn place(&mut self, at: Coord) -> MoveResult<()> {
        match self.grid.get(at) {
            None => Err(MoveError::OutOfBounds(at)),
            Some(Some(_)) => Err(MoveError::Occupied(at)),
            Some(None) => {
                self.grid.set(at, Some(self.turn));
                self.turn = self.turn.opponent();
                Ok(())
            }
        }
    }

    /// The full run through `at` when `stone` has at least `line_length` in
    /// a row on any axis, ordered from one end to the other.
    pub fn check_win(&self, at: Coord, stone: Stone) -> Option<Vec<Coord>> {
        if self.get(at) != Some(stone) {
            return None;
        }
        let size = self.size();
        for (dr, dc) in LINE_AXES {
            let mut start = at;
            while let Some(prev) = start.offset(-dr, -dc, size)
                && self.get(prev) == Some(stone)
            {
                start = prev;
            }
            let mut line = vec![start];
            let mut cursor = start;
            while let Some(next) = cursor.offset(dr, dc, size)
                && self.get(next) == Some(stone)
            {
                line.push(next);
                cursor = next;
            }
            if line.len() >= self.line_length as usize {
                return Some(line);
            }
        }
        None
    }

    /// Any finished line on the board.
    pub fn any_win(&self) -> Option<(Stone, Vec<Coord>)> {
        self.grid.coords().find_map(|at| {
            let stone = self.get(at)?;
            self.check_win(at, stone).map(|line| (stone, line))
        })
    }
}

impl Rules for GomokuBoard {
    type Move = Coord;
    type Player = Stone;

    fn to_move(&self) -> Stone {
        self.turn
    }

    fn legal_moves(&self) -> Vec<Coord> {
        self.grid
            .coords()
            .filter(|&at| self.grid.get(at) == Some(None))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    /// Plays `black` and `white` points alternately, black first.
    fn play(board: &mut GomokuBoard, black: &[(u8, u8)], white: &[(u8, u8)]) {
        for idx in 0..black.len().max(white.len()) {
            if let Some(&(row, col)) = black.get(idx) {
                board.place(at(row, col)).unwrap();
            }
            if let Some(&(row, col)) = white.get(idx) {
                board.place(at(row, col)).unwrap();
            }
        }
    }

    #[test]
    fn five_in_a_row_returns_exactly_those_points_whatever_the_order() {
        let row = [(7, 3), (7, 4), (7, 5), (7, 6), (7, 7)];
        let expected: Vec<Coord> = row.iter().map(|&(r, c)| at(r, c)).collect();

        for last in 0..row.len() {
            let mut order: Vec<(u8, u8)> = row.to_vec();
            let finishing = order.remove(last);
            order.push(finishing);

            let mut board = GomokuBoard::new(15, 5);
            play(&mut board, &order, &[(0, 0), (0, 2), (0, 4), (0, 6)]);

            let line = board.check_win(at(finishing.0, finishing.1), Stone::Black);
            assert_eq!(line, Some(expected.clone()));
        }
    }

    #[test]
    fn four_is_not_enough_and_gaps_break_the_line() {
        let mut board = GomokuBoard::new(15, 5);
        play(&mut board, &[(3, 3), (4, 4), (5, 5), (7, 7)], &[(0, 0), (0, 1), (0, 2)]);

        assert_eq!(board.check_win(at(5, 5), Stone::Black), None);
        assert_eq!(board.any_win(), None);
    }

    #[test]
    fn anti_diagonal_win_is_found() {
        let mut board = GomokuBoard::new(9, 4);
        play(&mut board, &[(0, 3), (1, 2), (2, 1), (3, 0)], &[(8, 8), (8, 7), (8, 6)]);

        let line = board.check_win(at(2, 1), Stone::Black).unwrap();
        assert_eq!(line.len(), 4);
        assert_eq!(board.any_win().map(|(stone, _)| stone), Some(Stone::Black));
    }

    #[test]
    fn placing_twice_on_a_point_is_rejected() {
        let mut board = GomokuBoard::new(15, 5);
        board.place(at(7, 7)).unwrap();

        assert_eq!(board.place(at(7, 7)), Err(MoveError::Occupied(at(7, 7))));
        assert_eq!(board.place(at(15, 0)), Err(MoveError::OutOfBounds(at(15, 0))));
        assert_eq!(board.turn(), Stone::White);
    }

    #[test]
    fn from_parts_checks_stone_balance() {
        let mut grid = Grid::new(5, None);
        grid.set(at(0, 0), Some(Stone::White));

        assert!(GomokuBoard::from_parts(grid.clone(), 5, Stone::Black).is_err());
        grid.set(at(1, 1), Some(Stone::Black));
        assert!(GomokuBoard::from_parts(grid, 5, Stone::Black).is_ok());
    }
}
