use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::grid::DEFAULT_SIZE;

/// Tunables for a game session.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid edge length.
    pub size: usize,
    /// Tiles spawned on a fresh board.
    pub start_tiles: usize,
    /// Merging into a tile of at least this value wins the game. Only merges
    /// count: a spawned tile of this value, or one already on a resumed
    /// board, does not.
    pub win_value: u32,
    /// Chance that a spawned tile is a 4 instead of a 2.
    pub four_probability: f64,
    /// Refuse moves after a board change until the shell calls `settle()`.
    pub lock_until_settled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            start_tiles: 2,
            win_value: 2048,
            four_probability: 0.1,
            lock_until_settled: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.size == 0 {
            return Err(GameError::InvalidConfig("size must be positive".into()));
        }
        if self.start_tiles > self.size * self.size {
            return Err(GameError::InvalidConfig(format!(
                "{} start tiles do not fit on a {}x{} grid",
                self.start_tiles, self.size, self.size
            )));
        }
        if self.win_value < 4 || !self.win_value.is_power_of_two() {
            return Err(GameError::InvalidConfig(format!(
                "win value {} must be a power of two of at least 4",
                self.win_value
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidConfig(format!(
                "four probability {} is outside [0, 1]",
                self.four_probability
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"size": 5}"#).unwrap();
        assert_eq!(config.size, 5);
        assert_eq!(config.start_tiles, 2);
        assert_eq!(config.win_value, 2048);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            GameConfig {
                size: 0,
                ..GameConfig::default()
            },
            GameConfig {
                size: 1,
                start_tiles: 2,
                ..GameConfig::default()
            },
            GameConfig {
                win_value: 1000,
                ..GameConfig::default()
            },
            GameConfig {
                four_probability: 1.5,
                ..GameConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
        }
    }
}
