use serde::{Deserialize, Serialize};

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns `true` when the coordinate lies on a `size`×`size` board.
    pub fn is_valid(self, size: u8) -> bool {
        self.row < size && self.col < size
    }

    /// Steps by `(dr, dc)`; `None` when the result leaves the board.
    pub fn offset(self, dr: i8, dc: i8, size: u8) -> Option<Coord> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        let bound = size as i16;
        if (0..bound).contains(&row) && (0..bound).contains(&col) {
            Some(Coord::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Row-major index on a `size`-wide board.
    pub fn index(self, size: u8) -> usize {
        self.row as usize * size as usize + self.col as usize
    }

    pub fn from_index(index: usize, size: u8) -> Coord {
        let width = size as usize;
        Coord::new((index / width) as u8, (index % width) as u8)
    }
}

/// Lifecycle of a game session.
///
/// Contract: once a session leaves `InProgress` it never returns there
/// except through a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "camelCase")]
pub enum Status<P> {
    InProgress,
    Win(P),
    Draw,
    Stalemate,
}

impl<P: Copy> Status<P> {
    pub fn is_over(&self) -> bool {
        !matches!(self, Status::InProgress)
    }

    pub fn winner(&self) -> Option<P> {
        match self {
            Status::Win(player) => Some(*player),
            _ => None,
        }
    }
}

/// Two-player side, shared by every engine that only needs "first" and
/// "second" without game-specific colour names.
pub trait Side: Copy + Eq + std::fmt::Debug {
    fn opponent(self) -> Self;
}
