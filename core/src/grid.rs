//! Square grid of tile slots backed by an arena of tiles.
//!
//! Slots hold [`TileId`]s rather than tiles, so merge lineage can point at
//! tiles that have already left the board without any aliasing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::Rng;

use crate::error::GameError;
use crate::state::{SerializedGrid, TileState};
use crate::tile::{Position, Tile, TileId};

pub const DEFAULT_SIZE: usize = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    /// Indexed `x * size + y`.
    cells: Vec<Option<TileId>>,
    arena: BTreeMap<TileId, Tile>,
    next_id: u64,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![None; size * size],
            arena: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Rebuild a grid from a stored layout.
    ///
    /// Any structural problem (wrong dimensions, a tile whose recorded
    /// position disagrees with its slot, a value that is not a power of two)
    /// is reported as [`GameError::CorruptSnapshot`].
    pub fn from_serialized(serialized: &SerializedGrid) -> Result<Self, GameError> {
        let size = serialized.size;
        if size == 0 {
            return Err(GameError::CorruptSnapshot("grid size is zero".into()));
        }
        if serialized.cells.len() != size {
            return Err(GameError::CorruptSnapshot(format!(
                "expected {} columns, found {}",
                size,
                serialized.cells.len()
            )));
        }

        let mut grid = Grid::new(size);
        for (x, column) in serialized.cells.iter().enumerate() {
            if column.len() != size {
                return Err(GameError::CorruptSnapshot(format!(
                    "column {} has {} cells, expected {}",
                    x,
                    column.len(),
                    size
                )));
            }
            for (y, slot) in column.iter().enumerate() {
                let Some(state) = slot else {
                    continue;
                };
                if state.position != Position::new(x, y) {
                    return Err(GameError::CorruptSnapshot(format!(
                        "tile recorded at {} is stored in slot ({}, {})",
                        state.position, x, y
                    )));
                }
                if state.value < 2 || !state.value.is_power_of_two() {
                    return Err(GameError::CorruptSnapshot(format!(
                        "tile value {} at ({}, {}) is not a power of two",
                        state.value, x, y
                    )));
                }
                grid.insert_tile(state.position, state.value)?;
            }
        }
        Ok(grid)
    }

    /// Serialize the tiles currently on the board.
    pub fn serialize(&self) -> SerializedGrid {
        let cells = (0..self.size)
            .map(|x| {
                (0..self.size)
                    .map(|y| {
                        self.cell_content(Position::new(x, y)).map(|tile| TileState {
                            position: tile.position(),
                            value: tile.value(),
                        })
                    })
                    .collect()
            })
            .collect();
        SerializedGrid {
            size: self.size,
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// All empty coordinates, in [`Grid::each_cell`] order.
    pub fn available_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        self.each_cell(|position, tile| {
            if tile.is_none() {
                cells.push(position);
            }
        });
        cells
    }

    pub fn cells_available(&self) -> bool {
        self.cells.iter().any(Option::is_none)
    }

    /// Pick an empty cell uniformly at random. `None` when the grid is full.
    pub fn random_available_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let cells = self.available_cells();
        if cells.is_empty() {
            return None;
        }
        Some(cells[rng.gen_range(0..cells.len())])
    }

    /// Signed bounds check used while walking along a direction vector.
    pub fn within_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// Tile at `position`.
    ///
    /// Returns `None` both for empty cells and for coordinates outside the
    /// grid; callers that care about the difference check
    /// [`Grid::within_bounds`] first.
    pub fn cell_content(&self, position: Position) -> Option<&Tile> {
        let id = self.slot(position)?;
        self.arena.get(&id)
    }

    pub fn cell_occupied(&self, position: Position) -> bool {
        self.cell_content(position).is_some()
    }

    /// Look up any tile still held in the arena, including tiles consumed by
    /// a merge during the current move.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.arena.get(&id)
    }

    /// Tiles on the board, in [`Grid::each_cell`] order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells
            .iter()
            .flatten()
            .filter_map(move |id| self.arena.get(id))
    }

    /// Visit every coordinate, x outer and y inner, empty cells included.
    pub fn each_cell<F>(&self, mut visitor: F)
    where
        F: FnMut(Position, Option<&Tile>),
    {
        for x in 0..self.size {
            for y in 0..self.size {
                let position = Position::new(x, y);
                visitor(position, self.cell_content(position));
            }
        }
    }

    /// Create a tile with `value` and place it at `position`.
    ///
    /// A tile already in that slot is knocked off the board.
    pub fn insert_tile(&mut self, position: Position, value: u32) -> Result<TileId, GameError> {
        let index = self.index(position)?;
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.cells[index] = Some(id);
        self.arena.insert(id, Tile::new(id, position, value));
        Ok(id)
    }

    /// Take a tile off the board. Unknown or already-removed ids are ignored.
    ///
    /// The tile stays in the arena until the next [`Grid::prepare_tiles`].
    pub fn remove_tile(&mut self, id: TileId) {
        let Some(position) = self.arena.get(&id).map(Tile::position) else {
            return;
        };
        if let Ok(index) = self.index(position) {
            if self.cells[index] == Some(id) {
                self.cells[index] = None;
            }
        }
    }

    /// Relocate a tile, remembering where it came from.
    pub fn move_tile(&mut self, id: TileId, to: Position) -> Result<(), GameError> {
        let to_index = self.index(to)?;
        let Some(tile) = self.arena.get_mut(&id) else {
            return Ok(());
        };
        let from = tile.position();
        tile.update_position(to);
        let from_index = from.x * self.size + from.y;
        if self.cells[from_index] == Some(id) {
            self.cells[from_index] = None;
        }
        self.cells[to_index] = Some(id);
        Ok(())
    }

    /// Start-of-move bookkeeping: drop tiles consumed by the last move's
    /// merges, clear merge lineage, and record every tile's current position.
    pub fn prepare_tiles(&mut self) {
        let live: BTreeSet<TileId> = self.cells.iter().flatten().copied().collect();
        self.arena.retain(|id, _| live.contains(id));
        for tile in self.arena.values_mut() {
            tile.clear_merge();
            tile.save_position();
        }
    }

    pub(crate) fn set_merged_from(&mut self, id: TileId, pair: [TileId; 2]) {
        if let Some(tile) = self.arena.get_mut(&id) {
            tile.set_merged_from(pair);
        }
    }

    /// Move a consumed tile's coordinates onto the merge target without
    /// touching the board, so renderers can animate it sliding in.
    pub(crate) fn retarget_consumed(&mut self, id: TileId, to: Position) {
        if let Some(tile) = self.arena.get_mut(&id) {
            tile.update_position(to);
        }
    }

    pub fn max_value(&self) -> u32 {
        self.tiles().map(Tile::value).max().unwrap_or(0)
    }

    pub fn value_sum(&self) -> u64 {
        self.tiles().map(|tile| tile.value() as u64).sum()
    }

    fn slot(&self, position: Position) -> Option<TileId> {
        let index = self.index(position).ok()?;
        self.cells[index]
    }

    fn index(&self, position: Position) -> Result<usize, GameError> {
        if position.x < self.size && position.y < self.size {
            Ok(position.x * self.size + position.y)
        } else {
            Err(GameError::OutOfBounds {
                x: position.x as i64,
                y: position.y as i64,
                size: self.size,
            })
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_SIZE)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ size: {} }}", self.size)?;
        for y in 0..self.size {
            for x in 0..self.size {
                match self.cell_content(Position::new(x, y)) {
                    Some(tile) => write!(f, "{:5}", tile.value())?,
                    None => write!(f, "    .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border: String = "+------".repeat(self.size) + "+";
        writeln!(f, "{}", border)?;
        for y in 0..self.size {
            write!(f, "|")?;
            for x in 0..self.size {
                match self.cell_content(Position::new(x, y)) {
                    Some(tile) => write!(f, "{:^6}|", tile.value())?,
                    None => write!(f, "      |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(4);
        assert_eq!(grid.available_cells().len(), 16);
        assert!(grid.cells_available());
        assert_eq!(grid.tiles().count(), 0);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut grid = Grid::new(4);
        let id = grid.insert_tile(pos(1, 2), 8).unwrap();
        let tile = grid.cell_content(pos(1, 2)).unwrap();
        assert_eq!(tile.id(), id);
        assert_eq!(tile.value(), 8);
        assert_eq!(tile.position(), pos(1, 2));
        assert_eq!(grid.available_cells().len(), 15);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut grid = Grid::new(4);
        assert_eq!(
            grid.insert_tile(pos(4, 0), 2),
            Err(GameError::OutOfBounds { x: 4, y: 0, size: 4 })
        );
    }

    #[test]
    fn test_cell_content_out_of_bounds_is_none() {
        let grid = Grid::new(4);
        assert!(grid.cell_content(pos(9, 9)).is_none());
        assert!(!grid.within_bounds(-1, 0));
        assert!(!grid.within_bounds(0, 4));
        assert!(grid.within_bounds(3, 3));
    }

    #[test]
    fn test_remove_tile_twice_is_noop() {
        let mut grid = Grid::new(4);
        let id = grid.insert_tile(pos(0, 0), 2).unwrap();
        grid.remove_tile(id);
        grid.remove_tile(id);
        grid.remove_tile(TileId(99));
        assert!(grid.cell_content(pos(0, 0)).is_none());
        // Still resolvable until the next prepare.
        assert!(grid.tile(id).is_some());
        grid.prepare_tiles();
        assert!(grid.tile(id).is_none());
    }

    #[test]
    fn test_prepare_keeps_live_tiles_on_large_grid() {
        let mut grid = Grid::new(16);
        for x in 0..16 {
            for y in 0..16 {
                grid.insert_tile(pos(x, y), 2).unwrap();
            }
        }
        let gone: Vec<TileId> = grid.tiles().filter(|t| t.x() == 0).map(Tile::id).collect();
        for &id in &gone {
            grid.remove_tile(id);
        }
        grid.prepare_tiles();
        assert_eq!(grid.tiles().count(), 16 * 15);
        assert!(gone.iter().all(|&id| grid.tile(id).is_none()));
    }

    #[test]
    fn test_move_tile_records_previous_position() {
        let mut grid = Grid::new(4);
        let id = grid.insert_tile(pos(0, 0), 2).unwrap();
        grid.prepare_tiles();
        grid.move_tile(id, pos(3, 0)).unwrap();
        assert!(grid.cell_content(pos(0, 0)).is_none());
        let tile = grid.cell_content(pos(3, 0)).unwrap();
        assert_eq!(tile.previous_position(), Some(pos(0, 0)));
    }

    #[test]
    fn test_each_cell_order_is_column_major() {
        let grid = Grid::new(2);
        let mut visited = Vec::new();
        grid.each_cell(|position, tile| {
            assert!(tile.is_none());
            visited.push(position);
        });
        assert_eq!(visited, vec![pos(0, 0), pos(0, 1), pos(1, 0), pos(1, 1)]);
    }

    #[test]
    fn test_random_available_cell_full_grid() {
        let mut grid = Grid::new(2);
        for position in grid.available_cells() {
            grid.insert_tile(position, 2).unwrap();
        }
        let mut rng = StepRng::new(0, 0);
        assert_eq!(grid.random_available_cell(&mut rng), None);
    }

    #[test]
    fn test_random_available_cell_picks_empty() {
        let mut grid = Grid::new(2);
        grid.insert_tile(pos(0, 0), 2).unwrap();
        let mut rng = StepRng::new(0, 0);
        assert_eq!(grid.random_available_cell(&mut rng), Some(pos(0, 1)));
    }

    #[test]
    fn test_serialize_roundtrip_preserves_layout() {
        let mut grid = Grid::new(3);
        grid.insert_tile(pos(0, 2), 4).unwrap();
        grid.insert_tile(pos(2, 1), 64).unwrap();
        let serialized = grid.serialize();
        assert_eq!(serialized.cells[0][2].map(|t| t.value), Some(4));
        let restored = Grid::from_serialized(&serialized).unwrap();
        assert_eq!(restored.serialize(), serialized);
    }

    #[test]
    fn test_from_serialized_rejects_mismatched_position() {
        let mut serialized = Grid::new(2).serialize();
        serialized.cells[1][0] = Some(TileState {
            position: pos(0, 1),
            value: 2,
        });
        assert!(matches!(
            Grid::from_serialized(&serialized),
            Err(GameError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_from_serialized_rejects_bad_dimensions() {
        let serialized = SerializedGrid {
            size: 3,
            cells: vec![vec![None; 3]; 2],
        };
        assert!(matches!(
            Grid::from_serialized(&serialized),
            Err(GameError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_from_serialized_rejects_non_power_of_two() {
        let mut serialized = Grid::new(2).serialize();
        serialized.cells[0][0] = Some(TileState {
            position: pos(0, 0),
            value: 3,
        });
        assert!(matches!(
            Grid::from_serialized(&serialized),
            Err(GameError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_display_format() {
        let mut grid = Grid::new(4);
        grid.insert_tile(pos(0, 0), 2048).unwrap();
        let display = format!("{}", grid);
        assert!(display.contains("+------+"));
        assert!(display.contains("2048"));
    }
}
