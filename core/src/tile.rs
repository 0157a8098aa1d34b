use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate. `x` is the column, `y` is the row, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Stable handle to a tile in the grid's arena.
///
/// Ids are never reused within a grid, so a renderer can key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

/// A single numbered tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    position: Position,
    value: u32,
    previous_position: Option<Position>,
    merged_from: Option<[TileId; 2]>,
}

impl Tile {
    pub(crate) fn new(id: TileId, position: Position, value: u32) -> Self {
        Self {
            id,
            position,
            value,
            previous_position: None,
            merged_from: None,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn x(&self) -> usize {
        self.position.x
    }

    pub fn y(&self) -> usize {
        self.position.y
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Where the tile sat before the current move started.
    ///
    /// `None` for tiles created during the move (spawned or merged).
    pub fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    /// The two tiles consumed to create this one, if it was produced by a
    /// merge during the current move.
    pub fn merged_from(&self) -> Option<[TileId; 2]> {
        self.merged_from
    }

    pub fn is_merged(&self) -> bool {
        self.merged_from.is_some()
    }

    /// A tile is new when it appeared this move without merging.
    pub fn is_new(&self) -> bool {
        self.previous_position.is_none() && self.merged_from.is_none()
    }

    pub(crate) fn save_position(&mut self) {
        self.previous_position = Some(self.position);
    }

    pub(crate) fn clear_merge(&mut self) {
        self.merged_from = None;
    }

    pub(crate) fn set_merged_from(&mut self, pair: [TileId; 2]) {
        self.merged_from = Some(pair);
    }

    pub(crate) fn update_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tile_is_new() {
        let tile = Tile::new(TileId(0), Position::new(1, 2), 2);
        assert!(tile.is_new());
        assert!(!tile.is_merged());
        assert_eq!(tile.x(), 1);
        assert_eq!(tile.y(), 2);
    }

    #[test]
    fn test_saved_position_is_not_new() {
        let mut tile = Tile::new(TileId(0), Position::new(0, 0), 4);
        tile.save_position();
        tile.update_position(Position::new(3, 0));
        assert!(!tile.is_new());
        assert_eq!(tile.previous_position(), Some(Position::new(0, 0)));
        assert_eq!(tile.position(), Position::new(3, 0));
    }

    #[test]
    fn test_merge_lineage() {
        let mut tile = Tile::new(TileId(7), Position::new(0, 0), 8);
        tile.set_merged_from([TileId(1), TileId(2)]);
        assert!(tile.is_merged());
        assert!(!tile.is_new());
        tile.clear_merge();
        assert_eq!(tile.merged_from(), None);
    }

    #[test]
    fn test_display() {
        let tile = Tile::new(TileId(0), Position::new(2, 3), 16);
        assert_eq!(tile.to_string(), "16@(2, 3)");
    }
}
