//! Checkers position on an 8×8 board with mandatory capture and multi-jump
//! chains.
//!
//! Red starts on rows 5-7 and moves up; black starts on rows 0-2 and moves
//! down. Pieces only ever stand on dark squares (`(row + col)` odd).

use serde::{Deserialize, Serialize};

use crate::board::DIAGONAL;
use crate::game::Rules;
use crate::types::{Coord, Side};

pub const BOARD_SIZE: u8 = 8;
pub const PIECES_PER_SIDE: usize = 12;
const STARTING_ROWS: u8 = 3;
const MAN_VALUE: f64 = 1.0;
const KING_VALUE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

impl Side for Color {
    fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

impl Color {
    fn forward(self) -> i8 {
        match self {
            Color::Red => -1,
            Color::Black => 1,
        }
    }

    fn crowning_row(self) -> u8 {
        match self {
            Color::Red => 0,
            Color::Black => BOARD_SIZE - 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckerKind {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checker {
    pub id: u32,
    pub kind: CheckerKind,
    pub color: Color,
    pub at: Coord,
}

impl Checker {
    fn directions(&self) -> Vec<(i8, i8)> {
        match self.kind {
            CheckerKind::King => DIAGONAL.to_vec(),
            CheckerKind::Man => {
                let dr = self.color.forward();
                vec![(dr, -1), (dr, 1)]
            }
        }
    }

    /// Material plus how far the piece has advanced toward promotion.
    fn value(&self) -> f64 {
        let weight = match self.kind {
            CheckerKind::Man => MAN_VALUE,
            CheckerKind::King => KING_VALUE,
        };
        let advanced = match self.color {
            Color::Red => BOARD_SIZE - 1 - self.at.row,
            Color::Black => self.at.row,
        };
        weight + f64::from(advanced) / f64::from(BOARD_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckersMove {
    pub from: Coord,
    pub to: Coord,
    /// Square of the jumped piece.
    #[serde(default)]
    pub captured: Option<Coord>,
    #[serde(default)]
    pub promotion: bool,
}

impl CheckersMove {
    pub fn is_jump(&self) -> bool {
        self.captured.is_some()
    }
}

pub fn is_dark_square(at: Coord) -> bool {
    (at.row + at.col) % 2 == 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersBoard {
    pieces: Vec<Checker>,
    turn: Color,
    /// Piece that just jumped and must keep jumping; the turn has not passed.
    pending_chain: Option<u32>,
    next_id: u32,
}

impl CheckersBoard {
    pub fn new() -> Self {
        let mut board = Self::empty(Color::Red);
        for row in 0..STARTING_ROWS {
            for col in 0..BOARD_SIZE {
                if is_dark_square(Coord::new(row, col)) {
                    board.put(CheckerKind::Man, Color::Black, Coord::new(row, col));
                }
            }
        }
        for row in BOARD_SIZE - STARTING_ROWS..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if is_dark_square(Coord::new(row, col)) {
                    board.put(CheckerKind::Man, Color::Red, Coord::new(row, col));
                }
            }
        }
        board
    }

    pub fn empty(turn: Color) -> Self {
        Self {
            pieces: Vec::new(),
            turn,
            pending_chain: None,
            next_id: 0,
        }
    }

    pub fn put(&mut self, kind: CheckerKind, color: Color, at: Coord) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.pieces.push(Checker { id, kind, color, at });
        id
    }

    pub fn pieces(&self) -> &[Checker] {
        &self.pieces
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn piece_at(&self, at: Coord) -> Option<&Checker> {
        self.pieces.iter().find(|piece| piece.at == at)
    }

    /// The piece locked into a capture chain, if any.
    pub fn pending_chain(&self) -> Option<&Checker> {
        let id = self.pending_chain?;
        self.pieces.iter().find(|piece| piece.id == id)
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces.iter().filter(|piece| piece.color == color).count()
    }

    pub fn evaluate(&self, color: Color) -> f64 {
        self.pieces
            .iter()
            .map(|piece| {
                if piece.color == color {
                    piece.value()
                } else {
                    -piece.value()
                }
            })
            .sum()
    }

    /// Steps and jumps for one piece, before the side-wide capture rule.
    fn piece_moves(&self, piece: &Checker) -> (Vec<CheckersMove>, Vec<CheckersMove>) {
        let mut steps = Vec::new();
        let mut jumps = Vec::new();
        for (dr, dc) in piece.directions() {
            let Some(next) = piece.at.offset(dr, dc, BOARD_SIZE) else {
                continue;
            };
            match self.piece_at(next) {
                None => steps.push(self.make_move(piece, next, None)),
                Some(victim) if victim.color != piece.color => {
                    if let Some(landing) = next.offset(dr, dc, BOARD_SIZE)
                        && self.piece_at(landing).is_none()
                    {
                        jumps.push(self.make_move(piece, landing, Some(next)));
                    }
                }
                Some(_) => {}
            }
        }
        (steps, jumps)
    }

    fn make_move(&self, piece: &Checker, to: Coord, captured: Option<Coord>) -> CheckersMove {
        CheckersMove {
            from: piece.at,
            to,
            captured,
            promotion: piece.kind == CheckerKind::Man && to.row == piece.color.crowning_row(),
        }
    }

    pub fn has_jump(&self, color: Color) -> bool {
        self.pieces
            .iter()
            .filter(|piece| piece.color == color)
            .any(|piece| !self.piece_moves(piece).1.is_empty())
    }

    /// Moves `color` could make from this position if it were its turn,
    /// applying the capture rule across the whole side. Ignores any pending
    /// chain.
    pub fn side_moves(&self, color: Color) -> Vec<CheckersMove> {
        let must_jump = self.has_jump(color);
        self.pieces
            .iter()
            .filter(|piece| piece.color == color)
            .flat_map(|piece| self.filtered_moves(piece, must_jump))
            .collect()
    }

    fn filtered_moves(&self, piece: &Checker, must_jump: bool) -> Vec<CheckersMove> {
        let (steps, jumps) = self.piece_moves(piece);
        if must_jump || !jumps.is_empty() {
            jumps
        } else {
            steps
        }
    }

    /// Legal moves of the piece on `at` for the side to move.
    pub fn moves_from(&self, at: Coord) -> Vec<CheckersMove> {
        let Some(piece) = self.piece_at(at) else {
            return Vec::new();
        };
        if piece.color != self.turn {
            return Vec::new();
        }
        match self.pending_chain {
            Some(id) if id != piece.id => Vec::new(),
            Some(_) => self.piece_moves(piece).1,
            None => self.filtered_moves(piece, self.has_jump(self.turn)),
        }
    }

    pub fn with_hypothetical<T>(
        &self,
        mv: &CheckersMove,
        f: impl FnOnce(&CheckersBoard) -> T,
    ) -> T {
        let mut next = self.clone();
        next.play(mv);
        f(&next)
    }

    /// Plays a generated move. Returns `true` when the same piece must keep
    /// jumping, in which case the turn does not pass.
    pub(crate) fn play(&mut self, mv: &CheckersMove) -> bool {
        if let Some(captured) = mv.captured {
            self.pieces.retain(|piece| piece.at != captured);
        }
        let Some(idx) = self.pieces.iter().position(|piece| piece.at == mv.from) else {
            return false;
        };
        self.pieces[idx].at = mv.to;
        let piece = self.pieces[idx];

        if mv.is_jump() && !mv.promotion && !self.piece_moves(&piece).1.is_empty() {
            self.pending_chain = Some(piece.id);
            self.turn = piece.color;
            return true;
        }

        if mv.promotion {
            self.pieces[idx].kind = CheckerKind::King;
        }
        self.pending_chain = None;
        self.turn = piece.color.opponent();
        false
    }

    pub fn validate(&self) -> Result<(), String> {
        for (idx, piece) in self.pieces.iter().enumerate() {
            if !piece.at.is_valid(BOARD_SIZE) || !is_dark_square(piece.at) {
                return Err(format!("piece {} is not on a dark square", piece.id));
            }
            if piece.id >= self.next_id {
                return Err(format!("piece id {} not below next id {}", piece.id, self.next_id));
            }
            if self.pieces[idx + 1..]
                .iter()
                .any(|other| other.at == piece.at || other.id == piece.id)
            {
                return Err(format!("piece {} overlaps another piece", piece.id));
            }
        }
        for color in [Color::Red, Color::Black] {
            if self.count(color) > PIECES_PER_SIDE {
                return Err(format!("{color:?} has more than {PIECES_PER_SIDE} pieces"));
            }
        }
        if let Some(id) = self.pending_chain {
            let chained = self
                .pieces
                .iter()
                .find(|piece| piece.id == id)
                .ok_or_else(|| format!("chain piece {id} is missing"))?;
            if chained.color != self.turn || self.piece_moves(chained).1.is_empty() {
                return Err(format!("chain piece {id} cannot continue"));
            }
        }
        Ok(())
    }
}

impl Default for CheckersBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules for CheckersBoard {
    type Move = CheckersMove;
    type Player = Color;

    fn to_move(&self) -> Color {
        self.turn
    }

    fn legal_moves(&self) -> Vec<CheckersMove> {
        match self.pending_chain() {
            Some(piece) => self.piece_moves(piece).1,
            None => self.side_moves(self.turn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    fn board_with(turn: Color, pieces: &[(CheckerKind, Color, (u8, u8))]) -> CheckersBoard {
        let mut board = CheckersBoard::empty(turn);
        for &(kind, color, (row, col)) in pieces {
            board.put(kind, color, at(row, col));
        }
        board
    }

    #[test]
    fn initial_setup_uses_dark_squares_only() {
        let board = CheckersBoard::new();

        assert_eq!(board.count(Color::Red), PIECES_PER_SIDE);
        assert_eq!(board.count(Color::Black), PIECES_PER_SIDE);
        assert!(board.pieces().iter().all(|piece| is_dark_square(piece.at)));
        assert_eq!(board.legal_moves().len(), 7);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn men_only_move_forward() {
        let board = board_with(Color::Red, &[(CheckerKind::Man, Color::Red, (4, 3))]);

        let mut targets: Vec<_> = board.moves_from(at(4, 3)).iter().map(|mv| mv.to).collect();
        targets.sort();
        assert_eq!(targets, vec![at(3, 2), at(3, 4)]);
    }

    #[test]
    fn kings_move_in_all_four_diagonals() {
        let board = board_with(Color::Red, &[(CheckerKind::King, Color::Red, (4, 3))]);

        assert_eq!(board.moves_from(at(4, 3)).len(), 4);
    }

    #[test]
    fn forced_capture_applies_to_the_whole_side() {
        let board = board_with(
            Color::Red,
            &[
                (CheckerKind::Man, Color::Red, (5, 0)),
                (CheckerKind::Man, Color::Red, (5, 4)),
                (CheckerKind::Man, Color::Red, (6, 7)),
                (CheckerKind::Man, Color::Black, (4, 5)),
            ],
        );

        let all = board.legal_moves();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].from, at(5, 4));
        assert_eq!(all[0].to, at(3, 6));
        assert_eq!(all[0].captured, Some(at(4, 5)));
        assert!(board.moves_from(at(5, 0)).is_empty());
        assert!(board.moves_from(at(6, 7)).is_empty());
    }

    #[test]
    fn jump_chain_keeps_the_turn() {
        let mut board = board_with(
            Color::Red,
            &[
                (CheckerKind::Man, Color::Red, (6, 1)),
                (CheckerKind::Man, Color::Black, (5, 2)),
                (CheckerKind::Man, Color::Black, (3, 4)),
                (CheckerKind::Man, Color::Black, (0, 7)),
            ],
        );

        let first = board.moves_from(at(6, 1)).remove(0);
        assert!(board.play(&first));
        assert_eq!(board.turn(), Color::Red);
        assert_eq!(board.pending_chain().map(|piece| piece.at), Some(at(4, 3)));

        let second = board.legal_moves();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].to, at(2, 5));
        assert!(!board.play(&second[0]));
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.count(Color::Black), 1);
    }

    #[test]
    fn promotion_ends_the_chain() {
        let mut board = board_with(
            Color::Red,
            &[
                (CheckerKind::Man, Color::Red, (2, 1)),
                (CheckerKind::Man, Color::Black, (1, 2)),
                (CheckerKind::Man, Color::Black, (1, 4)),
            ],
        );

        let jump = board.moves_from(at(2, 1)).remove(0);
        assert!(jump.promotion);
        assert!(!board.play(&jump));
        assert_eq!(board.piece_at(at(0, 3)).map(|p| p.kind), Some(CheckerKind::King));
        assert_eq!(board.turn(), Color::Black);
        assert!(board.pending_chain().is_none());
    }

    #[test]
    fn evaluation_rewards_material_and_advancement() {
        let board = board_with(
            Color::Red,
            &[
                (CheckerKind::King, Color::Red, (7, 0)),
                (CheckerKind::Man, Color::Black, (4, 1)),
            ],
        );

        assert!((board.evaluate(Color::Red) - (3.0 - 1.5)).abs() < 1e-9);
        assert!((board.evaluate(Color::Black) + (3.0 - 1.5)).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_light_square_piece() {
        let board = board_with(Color::Red, &[(CheckerKind::Man, Color::Red, (4, 4))]);

        assert!(board.validate().is_err());
    }
}
