use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::config::Opponent;
use crate::error::{MoveError, MoveResult};
use crate::types::{Side, Status};

/// A position that knows whose turn it is and can enumerate legal moves.
///
/// Implemented by every engine's board type; this is what opponent
/// selectors look at.
pub trait Rules: Clone {
    type Move: Clone + PartialEq + std::fmt::Debug;
    type Player: Side;

    fn to_move(&self) -> Self::Player;

    /// Every legal move for the side to move, in generation order.
    fn legal_moves(&self) -> Vec<Self::Move>;
}

/// Opponent decision seam. Sessions own one boxed selector so tests can
/// swap in a scripted opponent.
pub trait MoveSelector<R: Rules>: Send + Sync {
    fn select_move(&self, position: &R, rng: &mut SmallRng) -> Option<R::Move>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl<R: Rules> MoveSelector<R> for FirstLegalMoveSelector {
    fn select_move(&self, position: &R, _rng: &mut SmallRng) -> Option<R::Move> {
        position.legal_moves().into_iter().next()
    }
}

/// The contract each game exposes to the presentation layer.
pub trait Engine {
    type Player: Side;
    /// What the user points at: a piece square, an empty point, a cell index.
    type Selection;
    type Move: Clone;
    type Outcome;

    /// Resets the board, keeping the scoreboard.
    fn new_game(&mut self);

    /// Legal moves for the selection, respecting turn and game-specific
    /// constraints. Empty when the selection has none.
    fn legal_moves_for(&self, selection: Self::Selection) -> Vec<Self::Move>;

    /// Validates and applies `mv`. On `Err` nothing changed.
    fn apply_move(&mut self, mv: &Self::Move) -> MoveResult<Self::Outcome>;

    /// Computes the computer's move, or `None` when it has none (or the game
    /// has no computer opponent). Does not apply it.
    fn request_ai_move(&mut self) -> Option<Self::Move>;

    fn status(&self) -> Status<Self::Player>;

    fn current_player(&self) -> Self::Player;

    fn ai_player(&self) -> Option<Self::Player>;
}

/// Lets the computer take its turn: asks for a move and applies it.
///
/// `Ok(None)` means the computer had no move; the terminal-state detector,
/// not this return value, decides what that implies.
pub fn play_ai_turn<E: Engine>(engine: &mut E) -> MoveResult<Option<E::Outcome>> {
    if engine.status().is_over() {
        return Err(MoveError::GameOver);
    }
    if engine.ai_player() != Some(engine.current_player()) {
        return Err(MoveError::NotAiTurn);
    }
    match engine.request_ai_move() {
        Some(mv) => engine.apply_move(&mv).map(Some),
        None => Ok(None),
    }
}

/// Win/draw tallies kept across games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
}

impl Scoreboard {
    /// Records a finished game. `first` names the side that moves first.
    pub fn record<P: Side>(&mut self, status: &Status<P>, first: P) {
        match status {
            Status::InProgress => {}
            Status::Win(player) if *player == first => self.first_wins += 1,
            Status::Win(_) => self.second_wins += 1,
            Status::Draw | Status::Stalemate => self.draws += 1,
        }
    }
}

/// Per-session random source. A fixed seed makes games reproducible.
pub fn session_rng(seed: Option<u64>) -> SmallRng {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0x5eed)
    });
    SmallRng::seed_from_u64(seed)
}

/// Resolves which seat the computer plays for a new game.
pub fn assign_ai_seat<P: Side>(opponent: Opponent, first: P, rng: &mut SmallRng) -> Option<P> {
    match opponent {
        Opponent::None => None,
        Opponent::First => Some(first),
        Opponent::Second => Some(first.opponent()),
        Opponent::Random => {
            if rng.random_bool(0.5) {
                Some(first)
            } else {
                Some(first.opponent())
            }
        }
    }
}
