use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::board::Grid;
use crate::config::{GOMOKU_DEFAULT_LINE, GOMOKU_DEFAULT_SIZE, GameConfig};
use crate::error::{ConfigError, MoveError, MoveResult, SnapshotError};
use crate::game::{Engine, MoveSelector, Scoreboard, assign_ai_seat, session_rng};
use crate::gomoku::ai::PatternSelector;
use crate::gomoku::board::{Cell, GomokuBoard, Stone};
use crate::snapshot;
use crate::types::{Coord, Status};

pub const SNAPSHOT_KIND: &str = "gomoku";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GomokuOutcome {
    pub point: Coord,
    pub stone: Stone,
    /// The completed line, for highlighting.
    pub winning_line: Option<Vec<Coord>>,
    pub status: Status<Stone>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GomokuSnapshot {
    size: u8,
    line_length: u8,
    cells: Vec<Cell>,
    turn: Stone,
    status: Status<Stone>,
    winning_line: Option<Vec<Coord>>,
    moves: Vec<Coord>,
    ai_player: Option<Stone>,
    config: GameConfig,
    scoreboard: Scoreboard,
}

pub struct GomokuGame {
    board: GomokuBoard,
    status: Status<Stone>,
    winning_line: Option<Vec<Coord>>,
    moves: Vec<Coord>,
    ai_player: Option<Stone>,
    config: GameConfig,
    scoreboard: Scoreboard,
    selector: Box<dyn MoveSelector<GomokuBoard>>,
    rng: SmallRng,
}

impl GomokuGame {
    pub fn new(
        config: GameConfig,
        selector: Box<dyn MoveSelector<GomokuBoard>>,
    ) -> Result<Self, ConfigError> {
        let size = config.board_size_or(GOMOKU_DEFAULT_SIZE)?;
        let line_length = config.line_length_for(size)?;
        let mut rng = session_rng(config.seed);
        let ai_player = assign_ai_seat(config.opponent, Stone::Black, &mut rng);
        Ok(Self {
            board: GomokuBoard::new(size, line_length),
            status: Status::InProgress,
            winning_line: None,
            moves: Vec::new(),
            ai_player,
            config,
            scoreboard: Scoreboard::default(),
            selector,
            rng,
        })
    }

    pub fn new_with_default_selector(config: GameConfig) -> Result<Self, ConfigError> {
        Self::new(config, Box::new(PatternSelector))
    }

    pub fn board(&self) -> &GomokuBoard {
        &self.board
    }

    pub fn winning_line(&self) -> Option<&[Coord]> {
        self.winning_line.as_deref()
    }

    pub fn last_move(&self) -> Option<Coord> {
        self.moves.last().copied()
    }

    pub fn moves(&self) -> &[Coord] {
        &self.moves
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
            &GomokuSnapshot {
                size: self.board.size(),
                line_length: self.board.line_length(),
                cells: self.board.grid().cells().to_vec(),
                turn: self.board.turn(),
                status: self.status,
                winning_line: self.winning_line.clone(),
                moves: self.moves.clone(),
                ai_player: self.ai_player,
                config: self.config.clone(),
                scoreboard: self.scoreboard,
            },
        )
    }

    pub fn restore(data: &str) -> Result<Self, SnapshotError> {
        let saved: GomokuSnapshot = snapshot::decode(SNAPSHOT_KIND, data)?;
        let config = GameConfig {
            board_size: Some(saved.size),
            line_length: Some(saved.line_length),
            ..saved.config
        };
        let mut game = Self::new_with_default_selector(config)
            .map_err(|err| SnapshotError::Invariant(err.to_string()))?;

        let grid = Grid::from_cells(saved.size, saved.cells).ok_or_else(|| {
            SnapshotError::Invariant(format!(
                "cell count does not match a {0}x{0} board",
                saved.size
            ))
        })?;
        let board = GomokuBoard::from_parts(grid, saved.line_length, saved.turn)
            .map_err(SnapshotError::Invariant)?;
        if !saved.status.is_over() && board.any_win().is_some() {
            return Err(SnapshotError::Invariant(
                "board holds a finished line but the game is in progress".to_string(),
            ));
        }

        game.board = board;
        game.status = saved.status;
        game.winning_line = saved.winning_line;
        game.moves = saved.moves;
        game.ai_player = saved.ai_player;
        game.scoreboard = saved.scoreboard;
        Ok(game)
    }

    pub fn restore_or_new(data: &str, config: GameConfig) -> Self {
        match Self::restore(data) {
            Ok(game) => game,
            Err(err) => {
                warn!(game = SNAPSHOT_KIND, error = %err, "discarding saved session");
                Self::new_with_default_selector(config.clone()).unwrap_or_else(|err| {
                    warn!(error = %err, "invalid gomoku config, using defaults");
                    let defaults = GameConfig {
                        board_size: None,
                        line_length: None,
                        ..config
                    };
                    Self::with_board(
                        defaults,
                        GomokuBoard::new(GOMOKU_DEFAULT_SIZE, GOMOKU_DEFAULT_LINE),
                    )
                })
            }
        }
    }

    fn with_board(config: GameConfig, board: GomokuBoard) -> Self {
        let mut rng = session_rng(config.seed);
        let ai_player = assign_ai_seat(config.opponent, Stone::Black, &mut rng);
        Self {
            board,
            status: Status::InProgress,
            winning_line: None,
            moves: Vec::new(),
            ai_player,
            config,
            scoreboard: Scoreboard::default(),
            selector: Box::new(PatternSelector),
            rng,
        }
    }
}

impl Engine for GomokuGame {
    type Player = Stone;
    type Selection = Coord;
    type Move = Coord;
    type Outcome = GomokuOutcome;

    fn new_game(&mut self) {
        self.board = GomokuBoard::new(self.board.size(), self.board.line_length());
        self.status = Status::InProgress;
        self.winning_line = None;
        self.moves.clear();
        self.ai_player = assign_ai_seat(self.config.opponent, Stone::Black, &mut self.rng);
    }

    fn legal_moves_for(&self, selection: Coord) -> Vec<Coord> {
        if self.status.is_over() || self.board.grid().get(selection) != Some(None) {
            return Vec::new();
        }
        vec![selection]
    }

    fn apply_move(&mut self, point: &Coord) -> MoveResult<GomokuOutcome> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let stone = self.board.turn();
        self.board.place(*point)?;
        self.moves.push(*point);

        if let Some(line) = self.board.check_win(*point, stone) {
            self.status = Status::Win(stone);
            self.winning_line = Some(line);
        } else if self.board.is_full() {
            self.status = Status::Draw;
        }
        if self.status.is_over() {
            self.scoreboard.record(&self.status, Stone::Black);
            info!(status = ?self.status, moves = self.moves.len(), "gomoku game finished");
        }

        Ok(GomokuOutcome {
            point: *point,
            stone,
            winning_line: self.winning_line.clone(),
            status: self.status,
        })
    }

    fn request_ai_move(&mut self) -> Option<Coord> {
        if self.status.is_over() {
            return None;
        }
        let started = Instant::now();
        let choice = self.selector.select_move(&self.board, &mut self.rng);
        debug!(
            side = ?self.board.turn(),
            choice = ?choice,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gomoku ai selected move"
        );
        choice
    }

    fn status(&self) -> Status<Stone> {
        self.status
    }

    fn current_player(&self) -> Stone {
        self.board.turn()
    }

    fn ai_player(&self) -> Option<Stone> {
        self.ai_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Opponent};
    use crate::game::play_ai_turn;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    fn game_with(size: u8, line: u8) -> GomokuGame {
        GomokuGame::new_with_default_selector(GameConfig {
            board_size: Some(size),
            line_length: Some(line),
            ..GameConfig::default()
        })
        .unwrap()
    }

    fn play_all(game: &mut GomokuGame, points: &[(u8, u8)]) -> GomokuOutcome {
        let mut last = None;
        for &(row, col) in points {
            last = Some(game.apply_move(&at(row, col)).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn default_board_is_fifteen_with_five_to_win() {
        let game = GomokuGame::new_with_default_selector(GameConfig::default()).unwrap();

        assert_eq!(game.board().size(), 15);
        assert_eq!(game.board().line_length(), 5);
        assert_eq!(game.current_player(), Stone::Black);
    }

    #[test]
    fn line_longer_than_board_is_refused() {
        let config = GameConfig {
            board_size: Some(7),
            line_length: Some(8),
            ..GameConfig::default()
        };

        assert!(GomokuGame::new_with_default_selector(config).is_err());
    }

    #[test]
    fn five_in_a_row_wins_and_reports_the_line() {
        let mut game = game_with(15, 5);

        let outcome = play_all(
            &mut game,
            &[
                (7, 7),
                (0, 0),
                (7, 5),
                (0, 1),
                (7, 6),
                (0, 2),
                (7, 3),
                (0, 3),
                (7, 4),
            ],
        );

        assert_eq!(outcome.status, Status::Win(Stone::Black));
        assert_eq!(
            game.winning_line(),
            Some(&[at(7, 3), at(7, 4), at(7, 5), at(7, 6), at(7, 7)][..])
        );
        assert_eq!(game.scoreboard().first_wins, 1);
        assert_eq!(game.apply_move(&at(9, 9)), Err(MoveError::GameOver));
    }

    #[test]
    fn occupied_point_is_rejected_without_change() {
        let mut game = game_with(15, 5);
        game.apply_move(&at(7, 7)).unwrap();

        assert_eq!(game.apply_move(&at(7, 7)), Err(MoveError::Occupied(at(7, 7))));
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.current_player(), Stone::White);
        assert!(game.legal_moves_for(at(7, 7)).is_empty());
        assert_eq!(game.legal_moves_for(at(0, 0)), vec![at(0, 0)]);
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let mut game = game_with(5, 5);
        let pattern = ["BBWWB", "WWBBW", "BBWWB", "WWBBW", "BWBWB"];
        let cells_of = |stone: char| -> Vec<(u8, u8)> {
            pattern
                .iter()
                .enumerate()
                .flat_map(|(row, line)| {
                    line.chars()
                        .enumerate()
                        .filter(move |&(_, ch)| ch == stone)
                        .map(move |(col, _)| (row as u8, col as u8))
                })
                .collect()
        };
        let (black, white) = (cells_of('B'), cells_of('W'));
        let mut points = Vec::new();
        for idx in 0..black.len() {
            points.push(black[idx]);
            if let Some(&point) = white.get(idx) {
                points.push(point);
            }
        }

        let outcome = play_all(&mut game, &points);

        assert_eq!(outcome.status, Status::Draw);
        assert_eq!(outcome.winning_line, None);
        assert_eq!(game.scoreboard().draws, 1);
    }

    #[test]
    fn computer_seat_blocks_a_four() {
        let config = GameConfig::vs_computer(Opponent::Second, Difficulty::Medium);
        let mut game = GomokuGame::new_with_default_selector(config.with_seed(5)).unwrap();
        play_all(
            &mut game,
            &[
                (7, 3),
                (0, 0),
                (7, 4),
                (0, 14),
                (7, 5),
                (14, 0),
                (7, 6),
            ],
        );

        let reply = play_ai_turn(&mut game).unwrap().unwrap();

        assert!(reply.point == at(7, 2) || reply.point == at(7, 7));
        assert_eq!(reply.stone, Stone::White);
        assert_eq!(game.status(), Status::InProgress);
    }

    #[test]
    fn snapshot_round_trip_keeps_line_length_and_moves() {
        let mut game = game_with(9, 4);
        play_all(&mut game, &[(4, 4), (0, 0), (4, 5)]);

        let restored = GomokuGame::restore(&game.snapshot().unwrap()).unwrap();

        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.board().line_length(), 4);
        assert_eq!(restored.last_move(), Some(at(4, 5)));
        assert_eq!(restored.current_player(), Stone::White);
    }
}
