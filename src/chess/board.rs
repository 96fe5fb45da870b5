//! Chess position, move generation and legality.
//!
//! The board is an unordered list of live pieces; an empty square is simply
//! the absence of a piece at that coordinate. Legality is decided by playing
//! each candidate on a copy of the position and asking whether the mover's
//! king is attacked there.

use serde::{Deserialize, Serialize};

use crate::board::{ALL_DIRECTIONS, DIAGONAL, ORTHOGONAL};
use crate::game::Rules;
use crate::types::{Coord, Side};

pub const BOARD_SIZE: u8 = 8;
pub const KING_VALUE: i32 = 100;

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Side for Color {
    fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Color {
    /// Row delta of a pawn step. White starts on rows 6-7 and moves up.
    fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => KING_VALUE,
        }
    }

    /// Pieces a pawn may turn into.
    pub fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: u32,
    pub kind: PieceKind,
    pub color: Color,
    pub at: Coord,
    pub has_moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialMove {
    CastleKingside,
    CastleQueenside,
    EnPassant,
    Promotion,
}

/// The piece a move removes from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captured {
    pub id: u32,
    pub kind: PieceKind,
    pub at: Coord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMove {
    pub from: Coord,
    pub to: Coord,
    pub kind: PieceKind,
    #[serde(default)]
    pub captured: Option<Captured>,
    #[serde(default)]
    pub special: Option<SpecialMove>,
    /// Set on every promoting move; queen unless the caller picks otherwise.
    #[serde(default)]
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    fn quiet(piece: &Piece, to: Coord) -> Self {
        Self {
            from: piece.at,
            to,
            kind: piece.kind,
            captured: None,
            special: None,
            promotion: None,
        }
    }

    fn capture(piece: &Piece, victim: &Piece) -> Self {
        Self {
            captured: Some(Captured {
                id: victim.id,
                kind: victim.kind,
                at: victim.at,
            }),
            ..Self::quiet(piece, victim.at)
        }
    }

    /// Same origin and destination; promotion choice is not compared.
    pub fn same_squares(&self, other: &ChessMove) -> bool {
        self.from == other.from && self.to == other.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessBoard {
    pieces: Vec<Piece>,
    turn: Color,
    /// Square skipped by a pawn double step on the previous move.
    en_passant: Option<Coord>,
    next_id: u32,
}

impl ChessBoard {
    /// Standard starting position, white to move.
    pub fn new() -> Self {
        let mut board = Self::empty(Color::White);
        for color in [Color::Black, Color::White] {
            for (col, kind) in BACK_RANK.into_iter().enumerate() {
                board.put(kind, color, Coord::new(color.home_row(), col as u8));
            }
            for col in 0..BOARD_SIZE {
                board.put(PieceKind::Pawn, color, Coord::new(color.pawn_row(), col));
            }
        }
        board
    }

    pub fn empty(turn: Color) -> Self {
        Self {
            pieces: Vec::new(),
            turn,
            en_passant: None,
            next_id: 0,
        }
    }

    /// Adds a piece with a fresh id. Callers keep squares unique.
    pub fn put(&mut self, kind: PieceKind, color: Color, at: Coord) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.pieces.push(Piece {
            id,
            kind,
            color,
            at,
            has_moved: false,
        });
        id
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn en_passant(&self) -> Option<Coord> {
        self.en_passant
    }

    pub fn piece_at(&self, at: Coord) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.at == at)
    }

    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|piece| piece.kind == PieceKind::King && piece.color == color)
    }

    /// Material balance from `color`'s side: own values minus opposing values.
    pub fn material(&self, color: Color) -> i32 {
        self.pieces
            .iter()
            .map(|piece| {
                if piece.color == color {
                    piece.kind.value()
                } else {
                    -piece.kind.value()
                }
            })
            .sum()
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.king(color)
            .is_some_and(|king| self.is_square_attacked(king.at, color))
    }

    /// `true` when any piece not belonging to `defender` attacks `at`.
    ///
    /// Pawns attack their two forward diagonals whatever stands there;
    /// castling never attacks.
    pub fn is_square_attacked(&self, at: Coord, defender: Color) -> bool {
        self.pieces
            .iter()
            .filter(|piece| piece.color != defender)
            .any(|piece| self.attacks(piece).contains(&at))
    }

    /// Legal moves of the piece standing on `at`, whatever side is to move.
    pub fn moves_from(&self, at: Coord) -> Vec<ChessMove> {
        match self.piece_at(at) {
            Some(piece) => self.legal_moves_for(piece),
            None => Vec::new(),
        }
    }

    pub fn legal_moves_for(&self, piece: &Piece) -> Vec<ChessMove> {
        self.pseudo_moves(piece, true)
            .into_iter()
            .filter(|mv| {
                if matches!(
                    mv.special,
                    Some(SpecialMove::CastleKingside | SpecialMove::CastleQueenside)
                ) {
                    return true;
                }
                !self.with_hypothetical(mv, |next| next.in_check(piece.color))
            })
            .collect()
    }

    pub fn has_legal_moves(&self, color: Color) -> bool {
        self.pieces
            .iter()
            .filter(|piece| piece.color == color)
            .any(|piece| !self.legal_moves_for(piece).is_empty())
    }

    /// Evaluates `f` on a copy of the board with `mv` played; `self` is never
    /// touched.
    pub fn with_hypothetical<T>(&self, mv: &ChessMove, f: impl FnOnce(&ChessBoard) -> T) -> T {
        let mut next = self.clone();
        next.play(mv);
        f(&next)
    }

    /// Plays a move produced by this board's generator and passes the turn.
    pub(crate) fn play(&mut self, mv: &ChessMove) {
        if let Some(captured) = mv.captured {
            self.pieces.retain(|piece| piece.id != captured.id);
        }

        let row = mv.from.row;
        match mv.special {
            Some(SpecialMove::CastleKingside) => {
                self.shift_rook(Coord::new(row, 7), Coord::new(row, 5));
            }
            Some(SpecialMove::CastleQueenside) => {
                self.shift_rook(Coord::new(row, 0), Coord::new(row, 3));
            }
            _ => {}
        }

        let mut mover = None;
        if let Some(piece) = self.pieces.iter_mut().find(|piece| piece.at == mv.from) {
            piece.at = mv.to;
            piece.has_moved = true;
            if mv.special == Some(SpecialMove::Promotion) {
                piece.kind = mv.promotion.unwrap_or(PieceKind::Queen);
            }
            mover = Some(piece.color);
        }

        self.en_passant = if mv.kind == PieceKind::Pawn && mv.from.row.abs_diff(mv.to.row) == 2 {
            Some(Coord::new((mv.from.row + mv.to.row) / 2, mv.from.col))
        } else {
            None
        };
        self.turn = mover.unwrap_or(self.turn).opponent();
    }

    fn shift_rook(&mut self, from: Coord, to: Coord) {
        if let Some(rook) = self.pieces.iter_mut().find(|piece| piece.at == from) {
            rook.at = to;
            rook.has_moved = true;
        }
    }

    /// Geometric moves before the self-check filter.
    fn pseudo_moves(&self, piece: &Piece, with_castling: bool) -> Vec<ChessMove> {
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(piece),
            PieceKind::Knight => self.step_moves(piece, &KNIGHT_JUMPS),
            PieceKind::Bishop => self.slide_moves(piece, &DIAGONAL),
            PieceKind::Rook => self.slide_moves(piece, &ORTHOGONAL),
            PieceKind::Queen => {
                let mut moves = self.slide_moves(piece, &ORTHOGONAL);
                moves.extend(self.slide_moves(piece, &DIAGONAL));
                moves
            }
            PieceKind::King => {
                let mut moves = self.step_moves(piece, &ALL_DIRECTIONS);
                if with_castling {
                    moves.extend(self.castling_moves(piece));
                }
                moves
            }
        }
    }

    fn pawn_moves(&self, piece: &Piece) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        let forward = piece.color.forward();

        if let Some(one) = piece.at.offset(forward, 0, BOARD_SIZE)
            && self.piece_at(one).is_none()
        {
            moves.push(ChessMove::quiet(piece, one));
            if piece.at.row == piece.color.pawn_row()
                && let Some(two) = piece.at.offset(2 * forward, 0, BOARD_SIZE)
                && self.piece_at(two).is_none()
            {
                moves.push(ChessMove::quiet(piece, two));
            }
        }

        for dc in [-1, 1] {
            let Some(target) = piece.at.offset(forward, dc, BOARD_SIZE) else {
                continue;
            };
            if let Some(victim) = self.piece_at(target) {
                if victim.color != piece.color {
                    moves.push(ChessMove::capture(piece, victim));
                }
            } else if self.en_passant == Some(target)
                && let Some(victim) = self.piece_at(Coord::new(piece.at.row, target.col))
                && victim.kind == PieceKind::Pawn
                && victim.color != piece.color
            {
                moves.push(ChessMove {
                    to: target,
                    special: Some(SpecialMove::EnPassant),
                    ..ChessMove::capture(piece, victim)
                });
            }
        }

        for mv in &mut moves {
            if mv.to.row == piece.color.promotion_row() {
                mv.special = Some(SpecialMove::Promotion);
                mv.promotion = Some(PieceKind::Queen);
            }
        }
        moves
    }

    fn step_moves(&self, piece: &Piece, offsets: &[(i8, i8)]) -> Vec<ChessMove> {
        offsets
            .iter()
            .filter_map(|&(dr, dc)| piece.at.offset(dr, dc, BOARD_SIZE))
            .filter_map(|to| match self.piece_at(to) {
                None => Some(ChessMove::quiet(piece, to)),
                Some(victim) if victim.color != piece.color => {
                    Some(ChessMove::capture(piece, victim))
                }
                Some(_) => None,
            })
            .collect()
    }

    fn slide_moves(&self, piece: &Piece, directions: &[(i8, i8)]) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        for &(dr, dc) in directions {
            let mut cursor = piece.at.offset(dr, dc, BOARD_SIZE);
            while let Some(to) = cursor {
                match self.piece_at(to) {
                    None => moves.push(ChessMove::quiet(piece, to)),
                    Some(victim) => {
                        if victim.color != piece.color {
                            moves.push(ChessMove::capture(piece, victim));
                        }
                        break;
                    }
                }
                cursor = to.offset(dr, dc, BOARD_SIZE);
            }
        }
        moves
    }

    fn castling_moves(&self, king: &Piece) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        if king.has_moved || self.in_check(king.color) {
            return moves;
        }

        let row = king.at.row;
        let sides = [
            (7u8, &[5u8, 6][..], 5u8, 6u8, SpecialMove::CastleKingside),
            (0u8, &[1u8, 2, 3][..], 3u8, 2u8, SpecialMove::CastleQueenside),
        ];
        for (rook_col, between, transit, landing, special) in sides {
            let rook_ready = self.piece_at(Coord::new(row, rook_col)).is_some_and(|rook| {
                rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved
            });
            if !rook_ready {
                continue;
            }
            if between.iter().any(|&col| self.piece_at(Coord::new(row, col)).is_some()) {
                continue;
            }
            if self.is_square_attacked(Coord::new(row, transit), king.color)
                || self.is_square_attacked(Coord::new(row, landing), king.color)
            {
                continue;
            }
            moves.push(ChessMove {
                special: Some(special),
                ..ChessMove::quiet(king, Coord::new(row, landing))
            });
        }
        moves
    }

    /// Squares `piece` attacks.
    fn attacks(&self, piece: &Piece) -> Vec<Coord> {
        match piece.kind {
            PieceKind::Pawn => [-1, 1]
                .into_iter()
                .filter_map(|dc| piece.at.offset(piece.color.forward(), dc, BOARD_SIZE))
                .collect(),
            _ => self
                .pseudo_moves(piece, false)
                .into_iter()
                .map(|mv| mv.to)
                .collect(),
        }
    }

    /// Structural checks used before trusting an externally supplied board.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, piece) in self.pieces.iter().enumerate() {
            if !piece.at.is_valid(BOARD_SIZE) {
                return Err(format!("piece {} is off the board", piece.id));
            }
            if piece.id >= self.next_id {
                return Err(format!("piece id {} not below next id {}", piece.id, self.next_id));
            }
            for other in &self.pieces[idx + 1..] {
                if other.at == piece.at {
                    return Err(format!("two pieces on ({}, {})", piece.at.row, piece.at.col));
                }
                if other.id == piece.id {
                    return Err(format!("duplicate piece id {}", piece.id));
                }
            }
            if piece.kind == PieceKind::Pawn
                && (piece.at.row == 0 || piece.at.row == BOARD_SIZE - 1)
            {
                return Err(format!("pawn {} stands on a back rank", piece.id));
            }
        }
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces
                .iter()
                .filter(|piece| piece.kind == PieceKind::King && piece.color == color)
                .count();
            if kings != 1 {
                return Err(format!("{color:?} has {kings} kings"));
            }
        }
        if self.in_check(self.turn.opponent()) {
            return Err(format!(
                "{:?} is in check with {:?} to move",
                self.turn.opponent(),
                self.turn
            ));
        }
        // The target lies behind a pawn the opponent just pushed two squares.
        let en_passant_row = match self.turn {
            Color::White => 2,
            Color::Black => 5,
        };
        if let Some(target) = self.en_passant
            && (target.row != en_passant_row || self.piece_at(target).is_some())
        {
            return Err(format!(
                "en-passant target ({}, {}) does not fit {:?} to move",
                target.row, target.col, self.turn
            ));
        }
        Ok(())
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules for ChessBoard {
    type Move = ChessMove;
    type Player = Color;

    fn to_move(&self) -> Color {
        self.turn
    }

    fn legal_moves(&self) -> Vec<ChessMove> {
        self.pieces
            .iter()
            .filter(|piece| piece.color == self.turn)
            .flat_map(|piece| self.legal_moves_for(piece))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    /// Kings on e1/e8 plus the given pieces.
    fn board_with(turn: Color, pieces: &[(PieceKind, Color, (u8, u8))]) -> ChessBoard {
        let mut board = ChessBoard::empty(turn);
        board.put(PieceKind::King, Color::White, at(7, 4));
        board.put(PieceKind::King, Color::Black, at(0, 4));
        for &(kind, color, (row, col)) in pieces {
            board.put(kind, color, at(row, col));
        }
        board
    }

    fn targets(moves: &[ChessMove]) -> Vec<Coord> {
        let mut out: Vec<Coord> = moves.iter().map(|mv| mv.to).collect();
        out.sort();
        out
    }

    #[test]
    fn initial_position_has_twenty_moves_for_white() {
        let board = ChessBoard::new();

        assert_eq!(board.pieces().len(), 32);
        assert_eq!(board.legal_moves().len(), 20);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn pawn_single_and_double_step_from_start() {
        let board = ChessBoard::new();

        assert_eq!(targets(&board.moves_from(at(6, 4))), vec![at(4, 4), at(5, 4)]);
    }

    #[test]
    fn blocked_pawn_cannot_jump_two() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Pawn, Color::White, (6, 0)),
                (PieceKind::Knight, Color::Black, (5, 0)),
            ],
        );

        assert!(board.moves_from(at(6, 0)).is_empty());
    }

    #[test]
    fn rook_stops_at_first_piece_and_captures_enemy() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Rook, Color::White, (4, 0)),
                (PieceKind::Pawn, Color::Black, (2, 0)),
                (PieceKind::Pawn, Color::White, (4, 2)),
            ],
        );

        let moves = board.moves_from(at(4, 0));
        assert_eq!(
            targets(&moves),
            vec![at(2, 0), at(3, 0), at(4, 1), at(5, 0), at(6, 0), at(7, 0)]
        );
        let capture = moves.iter().find(|mv| mv.to == at(2, 0)).unwrap();
        assert_eq!(capture.captured.map(|c| c.kind), Some(PieceKind::Pawn));
    }

    #[test]
    fn knight_in_corner_has_two_moves() {
        let board = board_with(Color::White, &[(PieceKind::Knight, Color::White, (7, 0))]);

        assert_eq!(targets(&board.moves_from(at(7, 0))), vec![at(5, 1), at(6, 2)]);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_pin_line() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Bishop, Color::White, (6, 4)),
                (PieceKind::Rook, Color::Black, (2, 4)),
            ],
        );

        assert!(board.moves_from(at(6, 4)).is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let board = board_with(Color::White, &[(PieceKind::Rook, Color::Black, (3, 3))]);

        let moves = targets(&board.moves_from(at(7, 4)));
        assert!(!moves.contains(&at(7, 3)));
        assert!(!moves.contains(&at(6, 3)));
        assert!(moves.contains(&at(6, 4)));
    }

    #[test]
    fn capture_that_removes_the_checker_is_legal() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Queen, Color::Black, (6, 4)),
                (PieceKind::Knight, Color::White, (4, 3)),
            ],
        );

        assert!(board.in_check(Color::White));
        let moves = board.moves_from(at(4, 3));
        assert_eq!(targets(&moves), vec![at(6, 4)]);
    }

    #[test]
    fn pawn_attacks_diagonals_even_when_empty() {
        let board = board_with(Color::White, &[(PieceKind::Pawn, Color::Black, (5, 5))]);

        assert!(board.is_square_attacked(at(6, 6), Color::White));
        assert!(board.is_square_attacked(at(6, 4), Color::White));
        assert!(!board.is_square_attacked(at(6, 5), Color::White));
    }

    #[test]
    fn kingside_castling_offered_when_path_clear_and_safe() {
        let board = board_with(Color::White, &[(PieceKind::Rook, Color::White, (7, 7))]);

        let castle = board
            .moves_from(at(7, 4))
            .into_iter()
            .find(|mv| mv.special == Some(SpecialMove::CastleKingside))
            .expect("castling available");
        assert_eq!(castle.to, at(7, 6));

        let mut after = board.clone();
        after.play(&castle);
        assert_eq!(after.piece_at(at(7, 6)).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(after.piece_at(at(7, 5)).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(after.piece_at(at(7, 7)).is_none());
    }

    #[test]
    fn castling_refused_through_attacked_square() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Rook, Color::White, (7, 7)),
                (PieceKind::Rook, Color::Black, (2, 5)),
            ],
        );

        assert!(board
            .moves_from(at(7, 4))
            .iter()
            .all(|mv| mv.special != Some(SpecialMove::CastleKingside)));
    }

    #[test]
    fn castling_refused_while_in_check() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Rook, Color::White, (7, 0)),
                (PieceKind::Rook, Color::Black, (3, 4)),
            ],
        );

        assert!(board.moves_from(at(7, 4)).iter().all(|mv| mv.special.is_none()));
    }

    #[test]
    fn queenside_castling_needs_all_three_squares_empty() {
        let board = board_with(
            Color::White,
            &[
                (PieceKind::Rook, Color::White, (7, 0)),
                (PieceKind::Knight, Color::White, (7, 1)),
            ],
        );

        assert!(board
            .moves_from(at(7, 4))
            .iter()
            .all(|mv| mv.special != Some(SpecialMove::CastleQueenside)));
    }

    #[test]
    fn en_passant_available_only_right_after_double_step() {
        let mut board = board_with(
            Color::Black,
            &[
                (PieceKind::Pawn, Color::White, (3, 4)),
                (PieceKind::Pawn, Color::Black, (1, 3)),
                (PieceKind::Pawn, Color::Black, (1, 7)),
            ],
        );

        let double = board
            .moves_from(at(1, 3))
            .into_iter()
            .find(|mv| mv.to == at(3, 3))
            .unwrap();
        board.play(&double);
        assert_eq!(board.en_passant(), Some(at(2, 3)));

        let ep = board
            .moves_from(at(3, 4))
            .into_iter()
            .find(|mv| mv.special == Some(SpecialMove::EnPassant))
            .expect("en passant offered");
        assert_eq!(ep.to, at(2, 3));
        assert_eq!(ep.captured.map(|c| c.at), Some(at(3, 3)));

        let mut taken = board.clone();
        taken.play(&ep);
        assert!(taken.piece_at(at(3, 3)).is_none());
        assert_eq!(taken.pieces().len(), 4);

        // White plays something else instead; the chance is gone.
        let king_step = board
            .moves_from(at(7, 4))
            .into_iter()
            .find(|mv| mv.to == at(7, 3))
            .unwrap();
        board.play(&king_step);
        let reply = board
            .moves_from(at(1, 7))
            .into_iter()
            .find(|mv| mv.to == at(2, 7))
            .unwrap();
        board.play(&reply);
        assert!(board
            .moves_from(at(3, 4))
            .iter()
            .all(|mv| mv.special != Some(SpecialMove::EnPassant)));
    }

    #[test]
    fn pawn_reaching_last_rank_promotes_to_queen_by_default() {
        let board = board_with(Color::White, &[(PieceKind::Pawn, Color::White, (1, 0))]);

        let moves = board.moves_from(at(1, 0));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].special, Some(SpecialMove::Promotion));
        assert_eq!(moves[0].promotion, Some(PieceKind::Queen));

        let mut after = board.clone();
        after.play(&moves[0]);
        assert_eq!(after.piece_at(at(0, 0)).map(|p| p.kind), Some(PieceKind::Queen));
    }

    #[test]
    fn hypothetical_leaves_board_untouched() {
        let board = ChessBoard::new();
        let before = board.clone();
        let mv = board.moves_from(at(6, 4)).remove(0);

        let moved = board.with_hypothetical(&mv, |next| next.piece_at(mv.to).is_some());

        assert!(moved);
        assert_eq!(board, before);
    }

    #[test]
    fn material_is_zero_at_start_and_signed_by_side() {
        let board = board_with(Color::White, &[(PieceKind::Queen, Color::White, (4, 4))]);

        assert_eq!(ChessBoard::new().material(Color::White), 0);
        assert_eq!(board.material(Color::White), 9);
        assert_eq!(board.material(Color::Black), -9);
    }

    #[test]
    fn validate_rejects_missing_king_and_stacked_pieces() {
        let mut board = ChessBoard::empty(Color::White);
        board.put(PieceKind::King, Color::White, at(7, 4));
        assert!(board.validate().is_err());

        let mut stacked = board_with(Color::White, &[]);
        stacked.put(PieceKind::Rook, Color::White, at(7, 4));
        assert!(stacked.validate().unwrap_err().contains("two pieces"));
    }

    #[test]
    fn validate_ties_en_passant_row_to_side_to_move() {
        let mut board = board_with(Color::White, &[(PieceKind::Pawn, Color::White, (6, 0))]);
        let push = board.moves_from(at(6, 0)).remove(1);
        board.play(&push);
        assert_eq!(board.en_passant(), Some(at(5, 0)));
        assert!(board.validate().is_ok());

        board.turn = Color::White;
        assert!(board.validate().unwrap_err().contains("en-passant"));
    }

    #[test]
    fn validate_rejects_check_against_side_not_to_move() {
        let board = board_with(Color::White, &[(PieceKind::Rook, Color::White, (4, 4))]);

        assert!(board.in_check(Color::Black));
        assert!(board.validate().unwrap_err().contains("in check"));
    }

    #[test]
    fn legal_move_query_is_idempotent() {
        let board = ChessBoard::new();

        assert_eq!(board.legal_moves(), board.legal_moves());
    }
}
