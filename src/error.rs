//! Error types shared by every engine.
//!
//! A rejected move is an expected, frequent condition (a click on an
//! unreachable square). `MoveError` carries the reason back to the caller and
//! the session is left untouched.

use thiserror::Error;

use crate::types::Coord;

/// Why a move request was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,

    #[error("coordinate ({}, {}) is off the board", .0.row, .0.col)]
    OutOfBounds(Coord),

    #[error("no piece at ({}, {})", .0.row, .0.col)]
    NoPiece(Coord),

    #[error("piece at ({}, {}) does not belong to the side to move", .0.row, .0.col)]
    NotYourPiece(Coord),

    #[error("point ({}, {}) is already occupied", .0.row, .0.col)]
    Occupied(Coord),

    #[error("move is not in the legal move list")]
    Illegal,

    #[error("placement would leave the group without liberties")]
    Suicide,

    #[error("immediate single-stone recapture is forbidden (ko)")]
    Ko,

    #[error("the capturing piece must keep jumping")]
    ChainCapturePending,

    #[error("it is not the computer's turn")]
    NotAiTurn,
}

/// Why a persisted snapshot was refused.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot envelope is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("snapshot checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },

    #[error("snapshot belongs to {found}, expected {expected}")]
    WrongGame { expected: String, found: String },

    #[error("unsupported snapshot version: expected {expected}, got {found}")]
    Version { expected: u32, found: u32 },

    #[error("snapshot violates board invariants: {0}")]
    Invariant(String),
}

/// Why a configuration was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board size {size} outside {min}..={max}")]
    BoardSize { size: u8, min: u8, max: u8 },

    #[error("line length {length} must be between 3 and the board size {size}")]
    LineLength { length: u8, size: u8 },

    #[error("config is not valid JSON: {0}")]
    Parse(String),
}

pub type MoveResult<T> = Result<T, MoveError>;
