use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::chess::ai::MaterialSelector;
use crate::chess::board::{BOARD_SIZE, Captured, ChessBoard, ChessMove, Color, SpecialMove};
use crate::config::GameConfig;
use crate::error::{MoveError, MoveResult, SnapshotError};
use crate::game::{Engine, MoveSelector, Rules, Scoreboard, assign_ai_seat, session_rng};
use crate::snapshot;
use crate::types::{Coord, Status};

pub const SNAPSHOT_KIND: &str = "chess";

/// What an accepted move did, as the presentation layer needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessOutcome {
    pub mv: ChessMove,
    pub captured: Option<Captured>,
    pub special: Option<SpecialMove>,
    /// Whether the side now to move is in check.
    pub in_check: bool,
    pub status: Status<Color>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChessSnapshot {
    board: ChessBoard,
    status: Status<Color>,
    ai_player: Option<Color>,
    config: GameConfig,
    scoreboard: Scoreboard,
    history: Vec<ChessMove>,
}

pub struct ChessGame {
    board: ChessBoard,
    status: Status<Color>,
    in_check: bool,
    ai_player: Option<Color>,
    config: GameConfig,
    scoreboard: Scoreboard,
    history: Vec<ChessMove>,
    selector: Box<dyn MoveSelector<ChessBoard>>,
    rng: SmallRng,
}

impl ChessGame {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector<ChessBoard>>) -> Self {
        let mut rng = session_rng(config.seed);
        let ai_player = assign_ai_seat(config.opponent, Color::White, &mut rng);
        Self {
            board: ChessBoard::new(),
            status: Status::InProgress,
            in_check: false,
            ai_player,
            config,
            scoreboard: Scoreboard::default(),
            history: Vec::new(),
            selector,
            rng,
        }
    }

    pub fn new_with_default_selector(config: GameConfig) -> Self {
        let selector = Box::new(MaterialSelector::new(config.difficulty));
        Self::new(config, selector)
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Clears the win/draw tallies; the current game is untouched.
    pub fn reset_scoreboard(&mut self) {
        self.scoreboard = Scoreboard::default();
    }

    pub fn history(&self) -> &[ChessMove] {
        &self.history
    }

    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        snapshot::encode(
            SNAPSHOT_KIND,
            &ChessSnapshot {
                board: self.board.clone(),
                status: self.status,
                ai_player: self.ai_player,
                config: self.config.clone(),
                scoreboard: self.scoreboard,
                history: self.history.clone(),
            },
        )
    }

    /// Rebuilds a session from [`ChessGame::snapshot`] output. Check state is
    /// recomputed from the board rather than trusted.
    pub fn restore(data: &str) -> Result<Self, SnapshotError> {
        let saved: ChessSnapshot = snapshot::decode(SNAPSHOT_KIND, data)?;
        saved.board.validate().map_err(SnapshotError::Invariant)?;

        let mut game = Self::new_with_default_selector(saved.config);
        game.in_check = saved.board.in_check(saved.board.turn());
        game.board = saved.board;
        game.status = saved.status;
        game.ai_player = saved.ai_player;
        game.scoreboard = saved.scoreboard;
        game.history = saved.history;
        Ok(game)
    }

    /// Restores `data`, or starts a fresh game from `config` when the
    /// snapshot is refused.
    pub fn restore_or_new(data: &str, config: GameConfig) -> Self {
        match Self::restore(data) {
            Ok(game) => game,
            Err(err) => {
                warn!(game = SNAPSHOT_KIND, error = %err, "discarding saved session");
                Self::new_with_default_selector(config)
            }
        }
    }

    fn finish_turn(&mut self, mover: Color) {
        let to_move = self.board.turn();
        self.in_check = self.board.in_check(to_move);
        if self.board.has_legal_moves(to_move) {
            return;
        }
        self.status = if self.in_check {
            Status::Win(mover)
        } else {
            Status::Stalemate
        };
        self.scoreboard.record(&self.status, Color::White);
        info!(status = ?self.status, moves = self.history.len(), "chess game finished");
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: ChessBoard) {
        self.in_check = board.in_check(board.turn());
        self.board = board;
        self.status = Status::InProgress;
        self.history.clear();
    }
}

impl Engine for ChessGame {
    type Player = Color;
    type Selection = Coord;
    type Move = ChessMove;
    type Outcome = ChessOutcome;

    fn new_game(&mut self) {
        self.board = ChessBoard::new();
        self.status = Status::InProgress;
        self.in_check = false;
        self.history.clear();
        self.ai_player = assign_ai_seat(self.config.opponent, Color::White, &mut self.rng);
    }

    fn legal_moves_for(&self, selection: Coord) -> Vec<ChessMove> {
        if self.status.is_over() {
            return Vec::new();
        }
        match self.board.piece_at(selection) {
            Some(piece) if piece.color == self.board.turn() => self.board.legal_moves_for(piece),
            _ => Vec::new(),
        }
    }

    fn apply_move(&mut self, mv: &ChessMove) -> MoveResult<ChessOutcome> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        if !mv.from.is_valid(BOARD_SIZE) {
            return Err(MoveError::OutOfBounds(mv.from));
        }
        if !mv.to.is_valid(BOARD_SIZE) {
            return Err(MoveError::OutOfBounds(mv.to));
        }
        let piece = self.board.piece_at(mv.from).ok_or(MoveError::NoPiece(mv.from))?;
        if piece.color != self.board.turn() {
            return Err(MoveError::NotYourPiece(mv.from));
        }

        let mut chosen = self
            .board
            .legal_moves_for(piece)
            .into_iter()
            .find(|legal| legal.same_squares(mv))
            .ok_or(MoveError::Illegal)?;
        if chosen.special == Some(SpecialMove::Promotion)
            && let Some(kind) = mv.promotion
        {
            if !kind.is_promotion_choice() {
                return Err(MoveError::Illegal);
            }
            chosen.promotion = Some(kind);
        }

        let mover = self.board.turn();
        self.board.play(&chosen);
        self.history.push(chosen.clone());
        self.finish_turn(mover);

        Ok(ChessOutcome {
            captured: chosen.captured,
            special: chosen.special,
            mv: chosen,
            in_check: self.in_check,
            status: self.status,
        })
    }

    fn request_ai_move(&mut self) -> Option<ChessMove> {
        if self.status.is_over() {
            return None;
        }
        let started = Instant::now();
        let choice = self.selector.select_move(&self.board, &mut self.rng);
        debug!(
            side = ?self.board.to_move(),
            choice = ?choice.as_ref().map(|mv| (mv.from, mv.to)),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chess ai selected move"
        );
        choice
    }

    fn status(&self) -> Status<Color> {
        self.status
    }

    fn current_player(&self) -> Color {
        self.board.turn()
    }

    fn ai_player(&self) -> Option<Color> {
        self.ai_player
    }
}
