use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// The four possible move directions.
///
/// The discriminants are the wire codes shells send in: 0=Up, 1=Right,
/// 2=Down, 3=Left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

/// Unit step on the grid. Positive `dx` is rightwards, positive `dy` is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub dx: i64,
    pub dy: i64,
}

impl Direction {
    /// Convert a direction code to a Direction.
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Get all four directions, in code order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
    }

    pub fn vector(self) -> Vector {
        match self {
            Direction::Up => Vector { dx: 0, dy: -1 },
            Direction::Right => Vector { dx: 1, dy: 0 },
            Direction::Down => Vector { dx: 0, dy: 1 },
            Direction::Left => Vector { dx: -1, dy: 0 },
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Direction::from_u8(value).ok_or(GameError::InvalidDirection(value))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_u8() {
        assert_eq!(Direction::from_u8(0), Some(Direction::Up));
        assert_eq!(Direction::from_u8(1), Some(Direction::Right));
        assert_eq!(Direction::from_u8(2), Some(Direction::Down));
        assert_eq!(Direction::from_u8(3), Some(Direction::Left));
        assert_eq!(Direction::from_u8(4), None);
        assert_eq!(Direction::from_u8(255), None);
    }

    #[test]
    fn test_try_from_rejects_unknown_code() {
        assert_eq!(Direction::try_from(2u8), Ok(Direction::Down));
        assert_eq!(Direction::try_from(7u8), Err(GameError::InvalidDirection(7)));
    }

    #[test]
    fn test_vectors() {
        assert_eq!(Direction::Up.vector(), Vector { dx: 0, dy: -1 });
        assert_eq!(Direction::Right.vector(), Vector { dx: 1, dy: 0 });
        assert_eq!(Direction::Down.vector(), Vector { dx: 0, dy: 1 });
        assert_eq!(Direction::Left.vector(), Vector { dx: -1, dy: 0 });
    }

    #[test]
    fn test_codes_match_discriminants() {
        for direction in Direction::all() {
            assert_eq!(Direction::from_u8(direction as u8), Some(direction));
        }
    }
}
