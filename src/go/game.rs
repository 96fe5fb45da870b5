use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::Grid;
use crate::config::{GO_DEFAULT_SIZE, GameConfig};
use crate::error::{ConfigError, MoveError, MoveResult, SnapshotError};
use crate::game::{Engine, Scoreboard};
use crate::go::board::{Captures, GoBoard, Point, Stone};
use crate::snapshot;
use crate::types::{Coord, Side, Status};

pub const SNAPSHOT_KIND: &str = "go";

/// One placed stone as recorded in the game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoMove {
    pub player: Stone,
    pub point: Coord,
    pub captured: Vec<Coord>,
    /// Ko point this move created, if any.
    pub ko: Option<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoOutcome {
    pub point: Coord,
    pub captured: Vec<Coord>,
    pub ko: Option<Coord>,
    pub captures: Captures,
    pub status: Status<Stone>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoSnapshot {
    size: u8,
    cells: Vec<Point>,
    turn: Stone,
    ko: Option<Coord>,
    captures: Captures,
    last_move: Option<Coord>,
    history: Vec<GoMove>,
    status: Status<Stone>,
    config: GameConfig,
    scoreboard: Scoreboard,
}

/// A Go session. There is no computer opponent and no automatic end: a game
/// finishes only when a player resigns.
pub struct GoGame {
    board: GoBoard,
    status: Status<Stone>,
    last_move: Option<Coord>,
    history: Vec<GoMove>,
    config: GameConfig,
    scoreboard: Scoreboard,
}

impl GoGame {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let size = config.board_size_or(GO_DEFAULT_SIZE)?;
        Ok(Self {
            board: GoBoard::new(size),
            status: Status::InProgress,
            last_move: None,
            history: Vec::new(),
            config,
            scoreboard: Scoreboard::default(),
        })
    }

    pub fn board(&self) -> &GoBoard {
        &self.board
    }

    pub fn last_move(&self) -> Option<Coord> {
        self.last_move
    }

    pub fn history(&self) -> &[GoMove] {
        &self.history
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Clears the win/draw tallies; the current game is untouched.
    pub fn reset_scoreboard(&mut self) {
        self.scoreboard = Scoreboard::default();
    }

    /// The side to move gives up; the opponent wins.
    pub fn resign(&mut self) -> MoveResult<Status<Stone>> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let loser = self.board.turn();
        self.status = Status::Win(loser.opponent());
        self.scoreboard.record(&self.status, Stone::Black);
        info!(loser = ?loser, moves = self.history.len(), "go game resigned");
        Ok(self.status)
    }

    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        snapshot::encode(
            SNAPSHOT_KIND,
            &GoSnapshot {
                size: self.board.size(),
                cells: self.board.grid().cells().to_vec(),
                turn: self.board.turn(),
                ko: self.board.ko(),
                captures: self.board.captures(),
                last_move: self.last_move,
                history: self.history.clone(),
                status: self.status,
                config: self.config.clone(),
                scoreboard: self.scoreboard,
            },
        )
    }

    /// Rebuilds a session without replaying history: ko point and capture
    /// tallies come straight from the snapshot.
    pub fn restore(data: &str) -> Result<Self, SnapshotError> {
        let saved: GoSnapshot = snapshot::decode(SNAPSHOT_KIND, data)?;
        let config = GameConfig {
            board_size: Some(saved.size),
            ..saved.config
        };
        config
            .board_size_or(GO_DEFAULT_SIZE)
            .map_err(|err| SnapshotError::Invariant(err.to_string()))?;
        let grid = Grid::from_cells(saved.size, saved.cells).ok_or_else(|| {
            SnapshotError::Invariant(format!(
                "cell count does not match a {0}x{0} board",
                saved.size
            ))
        })?;
        if let Some(last) = saved.last_move
            && !last.is_valid(saved.size)
        {
            return Err(SnapshotError::Invariant("last move is off the board".to_string()));
        }
        let board = GoBoard::from_parts(grid, saved.turn, saved.ko, saved.captures)
            .map_err(SnapshotError::Invariant)?;

        Ok(Self {
            board,
            status: saved.status,
            last_move: saved.last_move,
            history: saved.history,
            config,
            scoreboard: saved.scoreboard,
        })
    }

    /// Falls back to a fresh game; a bad `config` falls back to defaults.
    pub fn restore_or_new(data: &str, config: GameConfig) -> Self {
        match Self::restore(data) {
            Ok(game) => game,
            Err(err) => {
                warn!(game = SNAPSHOT_KIND, error = %err, "discarding saved session");
                Self::new(config).unwrap_or_else(|err| {
                    warn!(error = %err, "invalid go config, using defaults");
                    Self::fresh(GameConfig::default())
                })
            }
        }
    }

    fn fresh(config: GameConfig) -> Self {
        Self {
            board: GoBoard::new(GO_DEFAULT_SIZE),
            status: Status::InProgress,
            last_move: None,
            history: Vec::new(),
            config,
            scoreboard: Scoreboard::default(),
        }
    }
}

impl Engine for GoGame {
    type Player = Stone;
    type Selection = Coord;
    type Move = Coord;
    type Outcome = GoOutcome;

    fn new_game(&mut self) {
        self.board = GoBoard::new(self.board.size());
        self.status = Status::InProgress;
        self.last_move = None;
        self.history.clear();
    }

    /// The point itself when the side to move may play there.
    fn legal_moves_for(&self, selection: Coord) -> Vec<Coord> {
        if self.status.is_over() || self.board.is_forbidden(selection, self.board.turn()) {
            return Vec::new();
        }
        vec![selection]
    }

    fn apply_move(&mut self, point: &Coord) -> MoveResult<GoOutcome> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let player = self.board.turn();
        let captured = self.board.play(*point)?;

        self.last_move = Some(*point);
        self.history.push(GoMove {
            player,
            point: *point,
            captured: captured.clone(),
            ko: self.board.ko(),
        });

        Ok(GoOutcome {
            point: *point,
            captured,
            ko: self.board.ko(),
            captures: self.board.captures(),
            status: self.status,
        })
    }

    fn request_ai_move(&mut self) -> Option<Coord> {
        None
    }

    fn status(&self) -> Status<Stone> {
        self.status
    }

    fn current_player(&self) -> Stone {
        self.board.turn()
    }

    fn ai_player(&self) -> Option<Stone> {
        None
    }
}
