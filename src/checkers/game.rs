use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::checkers::ai::CheckersSelector;
use crate::checkers::board::{BOARD_SIZE, CheckersBoard, CheckersMove, Checker, Color};
use crate::config::GameConfig;
use crate::error::{MoveError, MoveResult, SnapshotError};
use crate::game::{Engine, MoveSelector, Rules, Scoreboard, assign_ai_seat, session_rng};
use crate::snapshot;
use crate::types::{Coord, Side, Status};

pub const SNAPSHOT_KIND: &str = "checkers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersOutcome {
    pub mv: CheckersMove,
    pub captured: Option<Coord>,
    pub promoted: bool,
    /// The same piece must jump again before the turn passes.
    pub chain_continues: bool,
    pub status: Status<Color>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckersSnapshot {
    board: CheckersBoard,
    status: Status<Color>,
    ai_player: Option<Color>,
    config: GameConfig,
    scoreboard: Scoreboard,
}

pub struct CheckersGame {
    board: CheckersBoard,
    status: Status<Color>,
    ai_player: Option<Color>,
    config: GameConfig,
    scoreboard: Scoreboard,
    selector: Box<dyn MoveSelector<CheckersBoard>>,
    rng: SmallRng,
}

impl CheckersGame {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector<CheckersBoard>>) -> Self {
        let mut rng = session_rng(config.seed);
        let ai_player = assign_ai_seat(config.opponent, Color::Red, &mut rng);
        Self {
            board: CheckersBoard::new(),
            status: Status::InProgress,
            ai_player,
            config,
            scoreboard: Scoreboard::default(),
            selector,
            rng,
        }
    }

    pub fn new_with_default_selector(config: GameConfig) -> Self {
        let selector = Box::new(CheckersSelector::new(config.difficulty));
        Self::new(config, selector)
    }

    pub fn board(&self) -> &CheckersBoard {
        &self.board
    }

    /// The piece that must keep jumping before the turn passes.
    pub fn pending_chain(&self) -> Option<&Checker> {
        self.board.pending_chain()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Clears the win/draw tallies; the current game is untouched.
    pub fn reset_scoreboard(&mut self) {
        self.scoreboard = Scoreboard::default();
    }

    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        snapshot::encode(
            SNAPSHOT_KIND,
            &CheckersSnapshot {
                board: self.board.clone(),
                status: self.status,
                ai_player: self.ai_player,
                config: self.config.clone(),
                scoreboard: self.scoreboard,
            },
        )
    }

    pub fn restore(data: &str) -> Result<Self, SnapshotError> {
        let saved: CheckersSnapshot = snapshot::decode(SNAPSHOT_KIND, data)?;
        saved.board.validate().map_err(SnapshotError::Invariant)?;
        if !saved.status.is_over() && winner_after_turn(&saved.board).is_some() {
            return Err(SnapshotError::Invariant(
                "position is decided but marked in progress".to_string(),
            ));
        }

        let mut game = Self::new_with_default_selector(saved.config);
        game.board = saved.board;
        game.status = saved.status;
        game.ai_player = saved.ai_player;
        game.scoreboard = saved.scoreboard;
        Ok(game)
    }

    pub fn restore_or_new(data: &str, config: GameConfig) -> Self {
        match Self::restore(data) {
            Ok(game) => game,
            Err(err) => {
                warn!(game = SNAPSHOT_KIND, error = %err, "discarding saved session");
                Self::new_with_default_selector(config)
            }
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: CheckersBoard) {
        self.board = board;
        self.status = Status::InProgress;
    }
}

/// The winner when the side to move has no pieces or no legal moves.
fn winner_after_turn(board: &CheckersBoard) -> Option<Color> {
    let to_move = board.turn();
    if board.count(to_move) == 0 || board.legal_moves().is_empty() {
        Some(to_move.opponent())
    } else {
        None
    }
}

impl Engine for CheckersGame {
    type Player = Color;
    type Selection = Coord;
    type Move = CheckersMove;
    type Outcome = CheckersOutcome;

    fn new_game(&mut self) {
        self.board = CheckersBoard::new();
        self.status = Status::InProgress;
        self.ai_player = assign_ai_seat(self.config.opponent, Color::Red, &mut self.rng);
    }

    fn legal_moves_for(&self, selection: Coord) -> Vec<CheckersMove> {
        if self.status.is_over() {
            return Vec::new();
        }
        self.board.moves_from(selection)
    }

    fn apply_move(&mut self, mv: &CheckersMove) -> MoveResult<CheckersOutcome> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        for at in [mv.from, mv.to] {
            if !at.is_valid(BOARD_SIZE) {
                return Err(MoveError::OutOfBounds(at));
            }
        }
        let piece = self.board.piece_at(mv.from).ok_or(MoveError::NoPiece(mv.from))?;
        if piece.color != self.board.turn() {
            return Err(MoveError::NotYourPiece(mv.from));
        }
        if self.board.pending_chain().is_some_and(|chained| chained.id != piece.id) {
            return Err(MoveError::ChainCapturePending);
        }

        let chosen = self
            .board
            .moves_from(mv.from)
            .into_iter()
            .find(|legal| legal.from == mv.from && legal.to == mv.to)
            .ok_or(MoveError::Illegal)?;

        let chain_continues = self.board.play(&chosen);
        if !chain_continues && let Some(winner) = winner_after_turn(&self.board) {
            self.status = Status::Win(winner);
            self.scoreboard.record(&self.status, Color::Red);
            info!(winner = ?winner, "checkers game finished");
        }

        Ok(CheckersOutcome {
            captured: chosen.captured,
            promoted: chosen.promotion,
            chain_continues,
            mv: chosen,
            status: self.status,
        })
    }

    fn request_ai_move(&mut self) -> Option<CheckersMove> {
        if self.status.is_over() {
            return None;
        }
        let started = Instant::now();
        let choice = self.selector.select_move(&self.board, &mut self.rng);
        debug!(
            side = ?self.board.to_move(),
            choice = ?choice.as_ref().map(|mv| (mv.from, mv.to)),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "checkers ai selected move"
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
