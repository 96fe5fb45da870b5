//! Tic-tac-toe with an exhaustive minimax opponent.

pub mod ai;
pub mod board;
pub mod game;

pub use ai::MinimaxSelector;
pub use board::{Mark, TicTacToeBoard, WINNING_LINES};
pub use game::{TicTacToeGame, TicTacToeOutcome};
