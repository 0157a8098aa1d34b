use rand::Rng;

use crate::error::GameError;
use crate::grid::Grid;
use crate::tile::TileId;

/// Places new tiles on random empty cells.
///
/// Draws a cell uniformly, then a value: 2 with probability
/// `1 - four_probability`, otherwise 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawner {
    four_probability: f64,
}

impl Spawner {
    pub fn new(four_probability: f64) -> Self {
        Spawner { four_probability }
    }

    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }

    /// Spawn one tile. Fails with [`GameError::GridFull`] when there is no
    /// empty cell; the grid is left untouched in that case.
    pub fn spawn<R: Rng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> Result<TileId, GameError> {
        let cell = grid.random_available_cell(rng).ok_or(GameError::GridFull)?;
        let value = if rng.gen::<f64>() < 1.0 - self.four_probability {
            2
        } else {
            4
        };
        grid.insert_tile(cell, value)
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Spawner::new(0.1)
    }
}
