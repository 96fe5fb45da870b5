use rand::rngs::SmallRng;

use crate::game::{MoveSelector, Rules};
use crate::tictactoe::board::{CELLS, Cells, Mark, TicTacToeBoard, is_full, winner};
use crate::types::Side;

/// Exhaustive minimax. Terminal scores are `10 - depth` for an `ai` win,
/// `depth - 10` for a loss and `0` for a draw, so faster wins and slower
/// losses score higher.
pub fn minimax(cells: Cells, depth: i32, maximizing: bool, ai: Mark, human: Mark) -> i32 {
    match winner(&cells) {
        Some((mark, _)) if mark == ai => return 10 - depth,
        Some(_) => return depth - 10,
        None if is_full(&cells) => return 0,
        None => {}
    }

    let mover = if maximizing { ai } else { human };
    let scores = (0..CELLS).filter(|&idx| cells[idx].is_none()).map(|idx| {
        let mut next = cells;
        next[idx] = Some(mover);
        minimax(next, depth + 1, !maximizing, ai, human)
    });
    if maximizing {
        scores.max().unwrap_or(0)
    } else {
        scores.min().unwrap_or(0)
    }
}

/// Perfect player: never loses.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxSelector;

impl MoveSelector<TicTacToeBoard> for MinimaxSelector {
    fn select_move(&self, board: &TicTacToeBoard, _rng: &mut SmallRng) -> Option<usize> {
        let ai = board.to_move();
        let mut best: Option<(usize, i32)> = None;

        for idx in board.legal_moves() {
            let mut next = *board.cells();
            next[idx] = Some(ai);
            let score = minimax(next, 0, false, ai, ai.opponent());
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| idx)
    }
}
