//! Go position: stone placement, group and liberty search, capture, suicide
//! and simple ko.

use serde::{Deserialize, Serialize};

use crate::board::Grid;
use crate::error::{MoveError, MoveResult};
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

pub type Point = Option<Stone>;

/// Stones each side has taken off the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    fn add(&mut self, stone: Stone, count: usize) {
        let count = count as u32;
        match stone {
            Stone::Black => self.black += count,
            Stone::White => self.white += count,
        }
    }

    pub fn of(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoBoard {
    grid: Grid<Point>,
    turn: Stone,
    /// Point whose single stone was taken by the previous move.
    ko: Option<Coord>,
    captures: Captures,
}

impl GoBoard {
    pub fn new(size: u8) -> Self {
        Self {
            grid: Grid::new(size, None),
            turn: Stone::Black,
            ko: None,
            captures: Captures::default(),
        }
    }

    /// Rebuilds a position from its parts, rejecting anything that could not
    /// arise in play.
    pub fn from_parts(
        grid: Grid<Point>,
        turn: Stone,
        ko: Option<Coord>,
        captures: Captures,
    ) -> Result<Self, String> {
        let board = Self {
            grid,
            turn,
            ko,
            captures,
        };
        if let Some(ko) = ko
            && board.grid.get(ko) != Some(None)
        {
            return Err(format!("ko point ({}, {}) is not empty", ko.row, ko.col));
        }
        for at in board.grid.coords() {
            if board.grid.get(at).flatten().is_some()
                && board.liberties_of(&board.group_of(at)) == 0
            {
                return Err(format!("group at ({}, {}) has no liberties", at.row, at.col));
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> u8 {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid<Point> {
        &self.grid
    }

    pub fn get(&self, at: Coord) -> Point {
        self.grid.get(at).flatten()
    }

    pub fn turn(&self) -> Stone {
        self.turn
    }

    pub fn ko(&self) -> Option<Coord> {
        self.ko
    }

    pub fn captures(&self) -> Captures {
        self.captures
    }

    /// Same-colour stones connected to `at` through orthogonal adjacency.
    /// Empty when `at` holds no stone.
    pub fn group_of(&self, at: Coord) -> Vec<Coord> {
        group_in(&self.grid, at)
    }

    /// Distinct empty points bordering any stone of `group`.
    pub fn liberties_of(&self, group: &[Coord]) -> usize {
        liberties_in(&self.grid, group)
    }

    /// Why `stone` may not be placed on `at`, if it may not.
    pub fn check_placement(&self, at: Coord, stone: Stone) -> MoveResult<()> {
        self.resolve(at, stone).map(|_| ())
    }

    pub fn is_forbidden(&self, at: Coord, stone: Stone) -> bool {
        self.check_placement(at, stone).is_err()
    }

    /// Places a stone for the side to move and returns the captured points.
    pub fn play(&mut self, at: Coord) -> MoveResult<Vec<Coord>> {
        let stone = self.turn;
        let (grid, captured) = self.resolve(at, stone)?;

        self.grid = grid;
        self.captures.add(stone, captured.len());
        self.ko = match captured.as_slice() {
            [single] => Some(*single),
            _ => None,
        };
        self.turn = stone.opponent();
        Ok(captured)
    }

    /// Plays `stone` at `at` on a copy of the grid and removes every enemy
    /// group left without liberties.
    fn resolve(&self, at: Coord, stone: Stone) -> MoveResult<(Grid<Point>, Vec<Coord>)> {
        match self.grid.get(at) {
            None => return Err(MoveError::OutOfBounds(at)),
            Some(Some(_)) => return Err(MoveError::Occupied(at)),
            Some(None) => {}
        }

        let mut next = self.grid.clone();
        next.set(at, Some(stone));

        let mut captured: Vec<Coord> = Vec::new();
        for neighbor in next.neighbors(at) {
            if next.get(neighbor) != Some(Some(stone.opponent())) || captured.contains(&neighbor) {
                continue;
            }
            let group = group_in(&next, neighbor);
            if liberties_in(&next, &group) == 0 {
                captured.extend(group);
            }
        }

        if captured.is_empty() && liberties_in(&next, &group_in(&next, at)) == 0 {
            return Err(MoveError::Suicide);
        }
        if self.ko == Some(at) && captured.len() == 1 {
            return Err(MoveError::Ko);
        }

        for &point in &captured {
            next.set(point, None);
        }
        Ok((next, captured))
    }
}

fn group_in(grid: &Grid<Point>, at: Coord) -> Vec<Coord> {
    let Some(Some(stone)) = grid.get(at) else {
        return Vec::new();
    };
    let size = grid.size();
    let mut seen = vec![false; size as usize * size as usize];
    let mut stack = vec![at];
    let mut group = Vec::new();
    seen[at.index(size)] = true;

    while let Some(current) = stack.pop() {
        group.push(current);
        for neighbor in grid.neighbors(current) {
            let idx = neighbor.index(size);
            if !seen[idx] && grid.get(neighbor) == Some(Some(stone)) {
                seen[idx] = true;
                stack.push(neighbor);
            }
        }
    }
    group
}

fn liberties_in(grid: &Grid<Point>, group: &[Coord]) -> usize {
    let mut liberties: Vec<Coord> = group
        .iter()
        .flat_map(|&stone| grid.neighbors(stone))
        .filter(|&neighbor| grid.get(neighbor) == Some(None))
        .collect();
    liberties.sort();
    liberties.dedup();
    liberties.len()
}
