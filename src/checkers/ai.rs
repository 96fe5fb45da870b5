use rand::Rng;
use rand::rngs::SmallRng;

use crate::checkers::board::{CheckersBoard, CheckersMove, Color};
use crate::config::Difficulty;
use crate::game::{MoveSelector, Rules};
use crate::types::Side;

/// Score of a side left without a single legal reply: it has lost.
const LOST_SCORE: f64 = -100.0;

/// One-ply evaluator over material and advancement; hard difficulty looks
/// at the opponent's best reply as well.
#[derive(Debug, Clone, Copy)]
pub struct CheckersSelector {
    difficulty: Difficulty,
}

impl CheckersSelector {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }
}

impl MoveSelector<CheckersBoard> for CheckersSelector {
    fn select_move(&self, board: &CheckersBoard, rng: &mut SmallRng) -> Option<CheckersMove> {
        let me = board.to_move();
        let mut best: Option<(CheckersMove, f64)> = None;

        for mv in board.legal_moves() {
            let mut score = board.with_hypothetical(&mv, |next| {
                let own = next.evaluate(me);
                match self.difficulty {
                    Difficulty::Hard => own - best_reply(next, me.opponent()),
                    _ => own,
                }
            });
            if self.difficulty == Difficulty::Easy {
                score += rng.random_range(-1.0..1.0);
            }
            if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                best = Some((mv, score));
            }
        }

        best.map(|(mv, _)| mv)
    }
}

fn best_reply(board: &CheckersBoard, replier: Color) -> f64 {
    if board.count(replier) == 0 {
        return LOST_SCORE;
    }
    let replies = board.side_moves(replier);
    if replies.is_empty() {
        return LOST_SCORE;
    }
    replies
        .iter()
        .map(|reply| board.with_hypothetical(reply, |after| after.evaluate(replier)))
        .fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::board::CheckerKind;
    use crate::game::session_rng;
    use crate::types::Coord;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    #[test]
    fn medium_prefers_advancing_when_nothing_to_take() {
        let mut board = CheckersBoard::empty(Color::Red);
        board.put(CheckerKind::Man, Color::Red, at(7, 0));
        board.put(CheckerKind::Man, Color::Red, at(3, 2));
        board.put(CheckerKind::Man, Color::Black, at(0, 7));

        let mv = CheckersSelector::new(Difficulty::Medium)
            .select_move(&board, &mut session_rng(Some(1)))
            .unwrap();

        // Every step gains the same advancement; the first generated wins.
        assert_eq!(mv, board.legal_moves()[0]);
    }

    #[test]
    fn hard_avoids_stepping_into_a_capture() {
        let mut board = CheckersBoard::empty(Color::Red);
        board.put(CheckerKind::Man, Color::Red, at(5, 2));
        board.put(CheckerKind::Man, Color::Red, at(5, 4));
        board.put(CheckerKind::Man, Color::Black, at(3, 2));

        let medium = CheckersSelector::new(Difficulty::Medium)
            .select_move(&board, &mut session_rng(Some(1)))
            .unwrap();
        let hard = CheckersSelector::new(Difficulty::Hard)
            .select_move(&board, &mut session_rng(Some(1)))
            .unwrap();

        // (4,1) can be jumped from (3,2); (4,3) is covered by the man on (5,4).
        assert_eq!(medium.to, at(4, 1));
        assert_eq!((hard.from, hard.to), (at(5, 2), at(4, 3)));
    }

    #[test]
    fn hard_plays_the_capture_that_clears_the_board() {
        let mut board = CheckersBoard::empty(Color::Red);
        board.put(CheckerKind::Man, Color::Red, at(5, 2));
        board.put(CheckerKind::Man, Color::Red, at(7, 6));
        board.put(CheckerKind::Man, Color::Black, at(4, 3));

        let mv = CheckersSelector::new(Difficulty::Hard)
            .select_move(&board, &mut session_rng(Some(1)))
            .unwrap();

        assert_eq!(mv.captured, Some(at(4, 3)));
    }
}
