use rand::rngs::SmallRng;

use crate::board::LINE_AXES;
use crate::game::{MoveSelector, Rules};
use crate::gomoku::board::{GomokuBoard, Stone};
use crate::types::{Coord, Side};

const WINNING_SCORE: f64 = 100_000.0;
/// Defence is weighted slightly above an equally strong attack.
const DEFENCE_WEIGHT: f64 = 1.1;
/// Below this no cell is worth more than a central opening.
const FALLBACK_THRESHOLD: f64 = 100.0;

/// Scores one axis by the run of `stone` adjacent to an empty cell and the
/// number of ends closed by the opponent or the edge.
///
/// A cell that completes the line wins however closed the run is.
fn run_score(consecutive: usize, blocked_ends: usize, line_length: usize) -> f64 {
    if consecutive + 1 >= line_length {
        return WINNING_SCORE;
    }
    if consecutive == 0 || blocked_ends >= 2 {
        return 0.0;
    }
    let open = blocked_ends == 0;
    // Distance from a finished line once this cell is filled.
    match line_length - 1 - consecutive {
        1 if open => 10_000.0,
        1 => 1_000.0,
        2 if open => 1_000.0,
        2 => 100.0,
        3 if open => 100.0,
        3 => 10.0,
        _ => 0.0,
    }
}

/// Value of placing `stone` on the empty cell `at`.
pub fn evaluate_position(board: &GomokuBoard, at: Coord, stone: Stone) -> f64 {
    let grid = board.grid();
    let line_length = board.line_length() as usize;
    LINE_AXES
        .iter()
        .map(|&(dr, dc)| {
            let mut consecutive = 0;
            let mut blocked_ends = 0;
            for direction in [(dr, dc), (-dr, -dc)] {
                let (run, stopper) = grid.run_length(at, direction, Some(stone));
                consecutive += run;
                match stopper {
                    None => blocked_ends += 1,
                    Some(Some(other)) if other != stone => blocked_ends += 1,
                    Some(_) => {}
                }
            }
            run_score(consecutive, blocked_ends, line_length)
        })
        .sum()
}

/// Pattern-scoring opponent: no search, one pass over the empty cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternSelector;

impl MoveSelector<GomokuBoard> for PatternSelector {
    fn select_move(&self, board: &GomokuBoard, _rng: &mut SmallRng) -> Option<Coord> {
        let me = board.to_move();
        let mut best: Option<(Coord, f64)> = None;

        for at in board.legal_moves() {
            let attack = evaluate_position(board, at, me);
            let defend = evaluate_position(board, at, me.opponent());
            let score = attack.max(defend * DEFENCE_WEIGHT);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((at, score));
            }
        }

        match best {
            Some((at, score)) if score >= FALLBACK_THRESHOLD => Some(at),
            _ => nearest_to_centre(board),
        }
    }
}

fn nearest_to_centre(board: &GomokuBoard) -> Option<Coord> {
    let centre = i32::from(board.size() / 2);
    board.legal_moves().into_iter().min_by_key(|at| {
        let dr = i32::from(at.row) - centre;
        let dc = i32::from(at.col) - centre;
        dr * dr + dc * dc
    })
}
