//! Checkers on the dark squares of an 8×8 board: mandatory capture,
//! multi-jump chains and promotion to king.

pub mod ai;
pub mod board;
pub mod game;

pub use ai::CheckersSelector;
pub use board::{Checker, CheckerKind, CheckersBoard, CheckersMove, Color};
pub use game::{CheckersGame, CheckersOutcome};
