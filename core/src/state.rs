//! Serializable snapshot handed to and received from persistence.

use serde::{Deserialize, Serialize};

use crate::tile::Position;

/// One occupied cell in a serialized grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileState {
    pub position: Position,
    pub value: u32,
}

/// Grid layout as stored: `cells[x][y]`, `None` for empty slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedGrid {
    pub size: usize,
    pub cells: Vec<Vec<Option<TileState>>>,
}

/// Everything needed to resume a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub grid: SerializedGrid,
    pub score: u32,
    #[serde(default)]
    pub best_score: u32,
    pub over: bool,
    pub won: bool,
    pub keep_playing: bool,
}
