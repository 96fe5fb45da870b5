//! Gomoku (five in a row) on a configurable board, with a pattern-scoring
//! opponent.

pub mod ai;
pub mod board;
pub mod game;

pub use ai::PatternSelector;
pub use board::{GomokuBoard, Stone};
pub use game::{GomokuGame, GomokuOutcome};
