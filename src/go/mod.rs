//! Go on a square board of 5 to 19 lines. Two human players; the game ends
//! only by resignation.

pub mod board;
pub mod game;

pub use board::{Captures, GoBoard, Stone};
pub use game::{GoGame, GoMove, GoOutcome};
