use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::config::GameConfig;
use crate::error::{MoveError, MoveResult, SnapshotError};
use crate::game::{Engine, MoveSelector, Scoreboard, assign_ai_seat, session_rng};
use crate::tictactoe::ai::MinimaxSelector;
use crate::tictactoe::board::{Cells, Mark, TicTacToeBoard, is_full, winner};
use crate::types::Status;

pub const SNAPSHOT_KIND: &str = "tictactoe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeOutcome {
    pub index: usize,
    pub mark: Mark,
    pub winning_line: Option<[usize; 3]>,
    pub status: Status<Mark>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicTacToeSnapshot {
    cells: Cells,
    status: Status<Mark>,
    ai_player: Option<Mark>,
    config: GameConfig,
    scoreboard: Scoreboard,
}

/// Terminal state implied by a position alone.
fn status_of(cells: &Cells) -> (Status<Mark>, Option<[usize; 3]>) {
    match winner(cells) {
        Some((mark, line)) => (Status::Win(mark), Some(line)),
        None if is_full(cells) => (Status::Draw, None),
        None => (Status::InProgress, None),
    }
}

pub struct TicTacToeGame {
    board: TicTacToeBoard,
    status: Status<Mark>,
    winning_line: Option<[usize; 3]>,
    ai_player: Option<Mark>,
    config: GameConfig,
    scoreboard: Scoreboard,
    selector: Box<dyn MoveSelector<TicTacToeBoard>>,
    rng: SmallRng,
}

impl TicTacToeGame {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector<TicTacToeBoard>>) -> Self {
        let mut rng = session_rng(config.seed);
        let ai_player = assign_ai_seat(config.opponent, Mark::X, &mut rng);
        Self {
            board: TicTacToeBoard::new(),
            status: Status::InProgress,
            winning_line: None,
            ai_player,
            config,
            scoreboard: Scoreboard::default(),
            selector,
            rng,
        }
    }

    pub fn new_with_default_selector(config: GameConfig) -> Self {
        Self::new(config, Box::new(MinimaxSelector))
    }

    pub fn board(&self) -> &TicTacToeBoard {
        &self.board
    }

    pub fn winning_line(&self) -> Option<[usize; 3]> {
        self.winning_line
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Clears the win/draw tallies; the current game is untouched.
    pub fn reset_scoreboard(&mut self) {
        self.scoreboard = Scoreboard::default();
    }

    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        crate::snapshot::encode(
            SNAPSHOT_KIND,
            &TicTacToeSnapshot {
                cells: *self.board.cells(),
                status: self.status,
                ai_player: self.ai_player,
                config: self.config.clone(),
                scoreboard: self.scoreboard,
            },
        )
    }

    pub fn restore(data: &str) -> Result<Self, SnapshotError> {
        let saved: TicTacToeSnapshot = crate::snapshot::decode(SNAPSHOT_KIND, data)?;
        let board = TicTacToeBoard::from_cells(saved.cells).map_err(SnapshotError::Invariant)?;
        let (status, winning_line) = status_of(board.cells());
        if status != saved.status {
            return Err(SnapshotError::Invariant(format!(
                "cells imply {status:?} but the snapshot says {:?}",
                saved.status
            )));
        }

        let mut game = Self::new_with_default_selector(saved.config);
        game.board = board;
        game.status = status;
        game.winning_line = winning_line;
        game.ai_player = saved.ai_player;
        game.scoreboard = saved.scoreboard;
        Ok(game)
    }

    pub fn restore_or_new(data: &str, config: GameConfig) -> Self {
        Self::restore(data).unwrap_or_else(|err| {
            warn!(game = SNAPSHOT_KIND, error = %err, "discarding saved session");
            Self::new_with_default_selector(config)
        })
    }
}

impl Engine for TicTacToeGame {
    type Player = Mark;
    type Selection = usize;
    type Move = usize;
    type Outcome = TicTacToeOutcome;

    fn new_game(&mut self) {
        self.board = TicTacToeBoard::new();
        self.status = Status::InProgress;
        self.winning_line = None;
        self.ai_player = assign_ai_seat(self.config.opponent, Mark::X, &mut self.rng);
    }

    fn legal_moves_for(&self, selection: usize) -> Vec<usize> {
        if self.status.is_over() || selection >= self.board.cells().len() {
            return Vec::new();
        }
        match self.board.get(selection) {
            Some(_) => Vec::new(),
            None => vec![selection],
        }
    }

    fn apply_move(&mut self, index: &usize) -> MoveResult<TicTacToeOutcome> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let mark = self.board.turn();
        self.board.place(*index)?;

        (self.status, self.winning_line) = status_of(self.board.cells());
        if self.status.is_over() {
            self.scoreboard.record(&self.status, Mark::X);
            info!(status = ?self.status, "tic-tac-toe game finished");
        }

        Ok(TicTacToeOutcome {
            index: *index,
            mark,
            winning_line: self.winning_line,
            status: self.status,
        })
    }

    fn request_ai_move(&mut self) -> Option<usize> {
        if self.status.is_over() {
            return None;
        }
        let started = Instant::now();
        let choice = self.selector.select_move(&self.board, &mut self.rng);
        debug!(
            side = ?self.board.turn(),
            choice = ?choice,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tic-tac-toe ai selected move"
        );
        choice
    }

    fn status(&self) -> Status<Mark> {
        self.status
    }

    fn current_player(&self) -> Mark {
        self.board.turn()
    }

    fn ai_player(&self) -> Option<Mark> {
        self.ai_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Opponent};
    use crate::game::{FirstLegalMoveSelector, play_ai_turn};

    fn two_player() -> TicTacToeGame {
        TicTacToeGame::new_with_default_selector(GameConfig::default())
    }

    fn play_all(game: &mut TicTacToeGame, moves: &[usize]) -> TicTacToeOutcome {
        let mut last = None;
        for idx in moves {
            last = Some(game.apply_move(idx).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn diagonal_win_reports_line_and_counts() {
        let mut game = two_player();

        let outcome = play_all(&mut game, &[0, 1, 4, 2, 8]);

        assert_eq!(outcome.status.winner(), Some(Mark::X));
        assert_eq!(outcome.winning_line, Some([0, 4, 8]));
        assert_eq!(game.scoreboard().first_wins, 1);
        assert_eq!(game.apply_move(&3), Err(MoveError::GameOver));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let mut game = two_player();

        // X O X / X O O / O X X
        let outcome = play_all(&mut game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert_eq!(outcome.status, Status::Draw);
        assert_eq!(outcome.winning_line, None);
        assert_eq!(game.scoreboard().draws, 1);
    }

    #[test]
    fn taken_cell_is_rejected_without_change() {
        let mut game = two_player();
        game.apply_move(&4).unwrap();

        assert!(game.apply_move(&4).is_err());
        assert_eq!(game.current_player(), Mark::O);
        assert!(game.legal_moves_for(4).is_empty());
        assert_eq!(game.legal_moves_for(0), vec![0]);
        assert!(game.legal_moves_for(12).is_empty());
    }

    #[test]
    fn computer_in_second_seat_answers_the_centre_with_a_corner() {
        let config = GameConfig::vs_computer(Opponent::Second, Difficulty::Medium);
        let mut game = TicTacToeGame::new_with_default_selector(config);
        assert_eq!(play_ai_turn(&mut game), Err(MoveError::NotAiTurn));
        game.apply_move(&4).unwrap();

        let reply = play_ai_turn(&mut game).unwrap().unwrap();

        assert_eq!(reply.mark, Mark::O);
        assert!([0, 2, 6, 8].contains(&reply.index), "got {}", reply.index);
    }

    #[test]
    fn new_game_keeps_the_tally() {
        let mut game = two_player();
        play_all(&mut game, &[0, 3, 1, 4, 2]);

        game.new_game();

        assert_eq!(game.status(), Status::InProgress);
        assert_eq!(game.winning_line(), None);
        assert_eq!(game.current_player(), Mark::X);
        assert_eq!(game.scoreboard().first_wins, 1);

        game.reset_scoreboard();
        assert_eq!(game.scoreboard(), Scoreboard::default());
        assert_eq!(game.current_player(), Mark::X);
    }

    #[test]
    fn scripted_selector_drives_the_computer_seat() {
        let config = GameConfig::vs_computer(Opponent::First, Difficulty::Medium);
        let mut game = TicTacToeGame::new(config, Box::new(FirstLegalMoveSelector));

        let opening = play_ai_turn(&mut game).unwrap().unwrap();
        assert_eq!(opening.index, 0);
        game.apply_move(&4).unwrap();

        let reply = play_ai_turn(&mut game).unwrap().unwrap();
        assert_eq!(reply.index, 1);
        assert_eq!(reply.status.winner(), None);
    }

    #[test]
    fn snapshot_round_trip_and_tamper_fallback() {
        let mut game = two_player();
        play_all(&mut game, &[4, 0, 8]);
        let data = game.snapshot().unwrap();

        let restored = TicTacToeGame::restore(&data).unwrap();
        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.current_player(), Mark::O);

        let tampered = data.replacen("\\\"X\\\"", "\\\"O\\\"", 1);
        let fallback = TicTacToeGame::restore_or_new(&tampered, GameConfig::default());
        assert_eq!(fallback.board(), &TicTacToeBoard::new());
    }
}
