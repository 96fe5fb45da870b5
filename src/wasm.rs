//! JavaScript bindings.
//!
//! One exported class per game. Every method takes and returns plain JS
//! values (via `serde-wasm-bindgen`); a rejected move comes back as
//! `{ success: false, reason }` rather than an exception.

use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::checkers::{Checker, CheckersGame, CheckersMove, Color as CheckersColor};
use crate::chess::{ChessGame, ChessMove, Color as ChessColor, Piece};
use crate::config::GameConfig;
use crate::error::MoveResult;
use crate::game::{Engine, Scoreboard, play_ai_turn};
use crate::go::{Captures, GoGame, GoMove, Stone as GoStone};
use crate::gomoku::{GomokuGame, Stone as GomokuStone};
use crate::logging;
use crate::tictactoe::{Mark, TicTacToeGame};
use crate::types::{Coord, Status};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveReply<O> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<O>,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

fn config_from(value: JsValue) -> Result<GameConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(GameConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn move_reply<O: Serialize>(result: MoveResult<O>) -> Result<JsValue, JsError> {
    let reply = match result {
        Ok(outcome) => MoveReply {
            success: true,
            reason: None,
            outcome: Some(outcome),
        },
        Err(err) => MoveReply {
            success: false,
            reason: Some(err.to_string()),
            outcome: None,
        },
    };
    to_js(&reply)
}

/// `null` when the computer had no move, otherwise a move reply.
fn ai_turn_reply<E: Engine>(engine: &mut E) -> Result<JsValue, JsError>
where
    E::Outcome: Serialize,
{
    match play_ai_turn(engine) {
        Ok(None) => Ok(JsValue::NULL),
        Ok(Some(outcome)) => move_reply(Ok(outcome)),
        Err(err) => move_reply::<E::Outcome>(Err(err)),
    }
}

fn optional_move<M: Serialize>(mv: Option<M>) -> Result<JsValue, JsError> {
    match mv {
        Some(mv) => to_js(&mv),
        None => Ok(JsValue::NULL),
    }
}

/// Replaces `current` with the restored session; on failure logs and leaves
/// it alone.
fn restore_into<G, E: std::fmt::Display>(
    current: &mut G,
    restored: Result<G, E>,
    game: &str,
) -> bool {
    match restored {
        Ok(session) => {
            *current = session;
            true
        }
        Err(err) => {
            warn!(game, error = %err, "snapshot refused, keeping current session");
            false
        }
    }
}

#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(filter: &str) -> bool {
    logging::init_logging(filter)
}

// Chess

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChessState<'a> {
    pieces: &'a [Piece],
    turn: ChessColor,
    en_passant: Option<Coord>,
    in_check: bool,
    status: Status<ChessColor>,
    ai_player: Option<ChessColor>,
    last_move: Option<&'a ChessMove>,
    scoreboard: Scoreboard,
}

#[wasm_bindgen]
pub struct ChessSession {
    game: ChessGame,
}

#[wasm_bindgen]
impl ChessSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ChessSession, JsError> {
        Ok(Self {
            game: ChessGame::new_with_default_selector(config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &str, config: JsValue) -> Result<ChessSession, JsError> {
        Ok(Self {
            game: ChessGame::restore_or_new(data, config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, row: u8, col: u8) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(Coord::new(row, col)))
    }

    /// Takes a move object as returned by `legalMoves`; `promotion` may be
    /// overridden by the caller.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, mv: JsValue) -> Result<JsValue, JsError> {
        let mv: ChessMove = serde_wasm_bindgen::from_value(mv)?;
        move_reply(self.game.apply_move(&mv))
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        optional_move(self.game.request_ai_move())
    }

    #[wasm_bindgen(js_name = playAiTurn)]
    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsError> {
        ai_turn_reply(&mut self.game)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        let board = self.game.board();
        to_js(&ChessState {
            pieces: board.pieces(),
            turn: board.turn(),
            en_passant: board.en_passant(),
            in_check: self.game.in_check(),
            status: self.game.status(),
            ai_player: self.game.ai_player(),
            last_move: self.game.history().last(),
            scoreboard: self.game.scoreboard(),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot()?)
    }

    pub fn restore(&mut self, data: &str) -> bool {
        restore_into(&mut self.game, ChessGame::restore(data), "chess")
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&mut self) {
        self.game.reset_scoreboard();
    }
}

// Checkers

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckersState<'a> {
    pieces: &'a [Checker],
    turn: CheckersColor,
    pending_chain: Option<&'a Checker>,
    status: Status<CheckersColor>,
    ai_player: Option<CheckersColor>,
    scoreboard: Scoreboard,
}

#[wasm_bindgen]
pub struct CheckersSession {
    game: CheckersGame,
}

#[wasm_bindgen]
impl CheckersSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CheckersSession, JsError> {
        Ok(Self {
            game: CheckersGame::new_with_default_selector(config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &str, config: JsValue) -> Result<CheckersSession, JsError> {
        Ok(Self {
            game: CheckersGame::restore_or_new(data, config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, row: u8, col: u8) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(Coord::new(row, col)))
    }

    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, mv: JsValue) -> Result<JsValue, JsError> {
        let mv: CheckersMove = serde_wasm_bindgen::from_value(mv)?;
        move_reply(self.game.apply_move(&mv))
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        optional_move(self.game.request_ai_move())
    }

    /// Plays one jump of a chain at a time; call again while the reply says
    /// the chain continues.
    #[wasm_bindgen(js_name = playAiTurn)]
    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsError> {
        ai_turn_reply(&mut self.game)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        let board = self.game.board();
        to_js(&CheckersState {
            pieces: board.pieces(),
            turn: board.turn(),
            pending_chain: self.game.pending_chain(),
            status: self.game.status(),
            ai_player: self.game.ai_player(),
            scoreboard: self.game.scoreboard(),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot()?)
    }

    pub fn restore(&mut self, data: &str) -> bool {
        restore_into(&mut self.game, CheckersGame::restore(data), "checkers")
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&mut self) {
        self.game.reset_scoreboard();
    }
}

// Go

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoState<'a> {
    size: u8,
    /// Row-major, `null` for an empty point.
    cells: &'a [Option<GoStone>],
    turn: GoStone,
    status: Status<GoStone>,
    ko: Option<Coord>,
    captures: Captures,
    last_move: Option<Coord>,
    history: &'a [GoMove],
    scoreboard: Scoreboard,
}

#[wasm_bindgen]
pub struct GoSession {
    game: GoGame,
}

#[wasm_bindgen]
impl GoSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<GoSession, JsError> {
        Ok(Self {
            game: GoGame::new(config_from(config)?)?,
        })
    }

    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &str, config: JsValue) -> Result<GoSession, JsError> {
        Ok(Self {
            game: GoGame::restore_or_new(data, config_from(config)?),
        })
    }

    /// `[point]` when a stone may be placed there, otherwise `[]`.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, row: u8, col: u8) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(Coord::new(row, col)))
    }

    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        move_reply(self.game.apply_move(&Coord::new(row, col)))
    }

    pub fn resign(&mut self) -> Result<JsValue, JsError> {
        move_reply(self.game.resign())
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        let board = self.game.board();
        to_js(&GoState {
            size: board.size(),
            cells: board.grid().cells(),
            turn: board.turn(),
            status: self.game.status(),
            ko: board.ko(),
            captures: board.captures(),
            last_move: self.game.last_move(),
            history: self.game.history(),
            scoreboard: self.game.scoreboard(),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot()?)
    }

    pub fn restore(&mut self, data: &str) -> bool {
        restore_into(&mut self.game, GoGame::restore(data), "go")
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&mut self) {
        self.game.reset_scoreboard();
    }
}

// Gomoku

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GomokuState<'a> {
    size: u8,
    cells: &'a [Option<GomokuStone>],
    turn: GomokuStone,
    status: Status<GomokuStone>,
    line_length: u8,
    winning_line: Option<&'a [Coord]>,
    last_move: Option<Coord>,
    ai_player: Option<GomokuStone>,
    scoreboard: Scoreboard,
}

#[wasm_bindgen]
pub struct GomokuSession {
    game: GomokuGame,
}

#[wasm_bindgen]
impl GomokuSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<GomokuSession, JsError> {
        Ok(Self {
            game: GomokuGame::new_with_default_selector(config_from(config)?)?,
        })
    }

    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &str, config: JsValue) -> Result<GomokuSession, JsError> {
        Ok(Self {
            game: GomokuGame::restore_or_new(data, config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, row: u8, col: u8) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(Coord::new(row, col)))
    }

    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        move_reply(self.game.apply_move(&Coord::new(row, col)))
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        optional_move(self.game.request_ai_move())
    }

    #[wasm_bindgen(js_name = playAiTurn)]
    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsError> {
        ai_turn_reply(&mut self.game)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        let board = self.game.board();
        to_js(&GomokuState {
            size: board.size(),
            cells: board.grid().cells(),
            turn: board.turn(),
            status: self.game.status(),
            line_length: board.line_length(),
            winning_line: self.game.winning_line(),
            last_move: self.game.last_move(),
            ai_player: self.game.ai_player(),
            scoreboard: self.game.scoreboard(),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot()?)
    }

    pub fn restore(&mut self, data: &str) -> bool {
        restore_into(&mut self.game, GomokuGame::restore(data), "gomoku")
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&mut self) {
        self.game.reset_scoreboard();
    }
}

// Tic-tac-toe

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TicTacToeState<'a> {
    cells: &'a [Option<Mark>],
    turn: Mark,
    status: Status<Mark>,
    winning_line: Option<[usize; 3]>,
    ai_player: Option<Mark>,
    scoreboard: Scoreboard,
}

#[wasm_bindgen]
pub struct TicTacToeSession {
    game: TicTacToeGame,
}

#[wasm_bindgen]
impl TicTacToeSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TicTacToeSession, JsError> {
        Ok(Self {
            game: TicTacToeGame::new_with_default_selector(config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &str, config: JsValue) -> Result<TicTacToeSession, JsError> {
        Ok(Self {
            game: TicTacToeGame::restore_or_new(data, config_from(config)?),
        })
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, index: usize) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(index))
    }

    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, index: usize) -> Result<JsValue, JsError> {
        move_reply(self.game.apply_move(&index))
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        optional_move(self.game.request_ai_move())
    }

    #[wasm_bindgen(js_name = playAiTurn)]
    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsError> {
        ai_turn_reply(&mut self.game)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        let board = self.game.board();
        to_js(&TicTacToeState {
            cells: board.cells(),
            turn: board.turn(),
            status: self.game.status(),
            winning_line: self.game.winning_line(),
            ai_player: self.game.ai_player(),
            scoreboard: self.game.scoreboard(),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot()?)
    }

    pub fn restore(&mut self, data: &str) -> bool {
        restore_into(&mut self.game, TicTacToeGame::restore(data), "tictactoe")
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&mut self) {
        self.game.reset_scoreboard();
    }
}
