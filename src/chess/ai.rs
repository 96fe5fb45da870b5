use rand::Rng;
use rand::rngs::SmallRng;

use crate::chess::board::{ChessBoard, ChessMove, Color, KING_VALUE};
use crate::config::Difficulty;
use crate::game::{MoveSelector, Rules};
use crate::types::Side;

/// Greedy material player.
///
/// Medium scores each candidate by the material balance after it is played.
/// Easy adds uniform noise in `[-1, 1)`. Hard subtracts the best material
/// balance the opponent can reach with one reply.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSelector {
    difficulty: Difficulty,
}

impl MaterialSelector {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }
}

impl MoveSelector<ChessBoard> for MaterialSelector {
    fn select_move(&self, board: &ChessBoard, rng: &mut SmallRng) -> Option<ChessMove> {
        let me = board.to_move();
        let mut best: Option<(ChessMove, f64)> = None;

        for mv in board.legal_moves() {
            let mut score = board.with_hypothetical(&mv, |next| {
                let own = next.material(me) as f64;
                match self.difficulty {
                    Difficulty::Hard => own - best_reply(next, me.opponent()),
                    _ => own,
                }
            });
            if self.difficulty == Difficulty::Easy {
                score += rng.random_range(-1.0..1.0);
            }
            if is_better_move(score, best.as_ref().map(|(_, s)| *s)) {
                best = Some((mv, score));
            }
        }

        best.map(|(mv, _)| mv)
    }
}

/// Best material balance `replier` can reach in one move. A side with no
/// reply scores `-KING_VALUE` when mated and `0` when stalemated.
fn best_reply(board: &ChessBoard, replier: Color) -> f64 {
    let replies = board.legal_moves();
    if replies.is_empty() {
        return if board.in_check(replier) {
            -(KING_VALUE as f64)
        } else {
            0.0
        };
    }
    replies
        .iter()
        .map(|reply| board.with_hypothetical(reply, |after| after.material(replier) as f64))
        .fold(f64::NEG_INFINITY, f64::max)
}

fn is_better_move(score: f64, best_score: Option<f64>) -> bool {
    best_score.is_none_or(|best| score > best)
}
