//! Error kinds surfaced by the rule engine.

/// Everything that can go wrong while driving a game.
///
/// `GridFull` is returned by the spawner but treated as a no-op by the
/// controller. All other variants are raised before any state is mutated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cell ({x}, {y}) is outside a {size}x{size} grid")]
    OutOfBounds { x: i64, y: i64, size: usize },
    #[error("no empty cell left to spawn a tile")]
    GridFull,
    #[error("invalid direction code {0}, expected 0-3")]
    InvalidDirection(u8),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("input is locked until the previous move settles")]
    InputLocked,
}
