//! Standard chess on an 8×8 board: castling, en passant and promotion, with
//! a greedy material-counting opponent.

pub mod ai;
pub mod board;
pub mod game;

pub use ai::MaterialSelector;
pub use board::{ChessBoard, ChessMove, Color, Piece, PieceKind, SpecialMove};
pub use game::{ChessGame, ChessOutcome};
