//! Rules engines and computer opponents for chess, checkers, Go, gomoku and
//! tic-tac-toe, compiled to WebAssembly for the browser front end.

use wasm_bindgen::prelude::*;

pub mod board;
pub mod checkers;
pub mod chess;
pub mod config;
pub mod error;
pub mod game;
pub mod go;
pub mod gomoku;
pub mod logging;
pub mod snapshot;
pub mod tictactoe;
pub mod types;
pub mod wasm;

pub use config::{Difficulty, GameConfig, Opponent};
pub use error::{ConfigError, MoveError, MoveResult, SnapshotError};
pub use game::{Engine, MoveSelector, Rules, Scoreboard, play_ai_turn};
pub use types::{Coord, Side, Status};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
