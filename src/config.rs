//! Session configuration supplied by the presentation layer.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const GO_DEFAULT_SIZE: u8 = 19;
pub const GOMOKU_DEFAULT_SIZE: u8 = 15;
pub const GOMOKU_DEFAULT_LINE: u8 = 5;
const MIN_BOARD_SIZE: u8 = 5;
const MAX_BOARD_SIZE: u8 = 19;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Adds uniform jitter in `[-1, 1)` to every candidate score.
    Easy,
    #[default]
    Medium,
    /// Looks one extra ply ahead at the opponent's best reply.
    Hard,
}

/// Which seat the computer takes, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opponent {
    #[default]
    None,
    First,
    Second,
    /// Coin flip at every new game.
    Random,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub opponent: Opponent,
    pub seed: Option<u64>,
    pub board_size: Option<u8>,
    pub line_length: Option<u8>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn vs_computer(opponent: Opponent, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            opponent,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Board size for the grid games, falling back to `default`.
    pub fn board_size_or(&self, default: u8) -> Result<u8, ConfigError> {
        let size = self.board_size.unwrap_or(default);
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(ConfigError::BoardSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(size)
    }

    /// Gomoku winning line length for a board of `size`.
    pub fn line_length_for(&self, size: u8) -> Result<u8, ConfigError> {
        let length = self.line_length.unwrap_or(GOMOKU_DEFAULT_LINE);
        if length < 3 || length > size {
            return Err(ConfigError::LineLength { length, size });
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = GameConfig::from_json("{}").unwrap();

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.opponent, Opponent::None);
    }

    #[test]
    fn camel_case_fields_are_parsed() {
        let config = GameConfig::from_json(
            r#"{"difficulty":"hard","opponent":"random","seed":7,"boardSize":9,"lineLength":4}"#,
        )
        .unwrap();

        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.opponent, Opponent::Random);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.board_size_or(GO_DEFAULT_SIZE), Ok(9));
        assert_eq!(config.line_length_for(9), Ok(4));
    }

    #[test]
    fn out_of_range_sizes_are_rejected() {
        let config = GameConfig {
            board_size: Some(25),
            ..GameConfig::default()
        };
        assert!(config.board_size_or(GO_DEFAULT_SIZE).is_err());

        let config = GameConfig {
            line_length: Some(8),
            ..GameConfig::default()
        };
        assert_eq!(
            config.line_length_for(7),
            Err(ConfigError::LineLength { length: 8, size: 7 })
        );
    }

    #[test]
    fn garbage_json_reports_parse_error() {
        let err = GameConfig::from_json("{difficulty").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
