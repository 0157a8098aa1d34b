//! Render collaborator.

use serde::Serialize;

use crate::grid::Grid;
use crate::tile::{Position, Tile, TileId};

/// What a renderer needs to draw one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub id: TileId,
    pub value: u32,
    pub x: usize,
    pub y: usize,
    /// Position before the last move, for slide animations.
    pub previous: Option<Position>,
    pub is_new: bool,
    pub is_merged: bool,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        TileView {
            id: tile.id(),
            value: tile.value(),
            x: tile.x(),
            y: tile.y(),
            previous: tile.previous_position(),
            is_new: tile.is_new(),
            is_merged: tile.is_merged(),
        }
    }
}

/// Views of every tile on the board, in cell order.
pub fn tile_views(grid: &Grid) -> Vec<TileView> {
    grid.tiles().map(TileView::from).collect()
}

/// Notified after every move, restart and keep-playing.
pub trait RenderHook {
    fn on_state_change(&mut self, tiles: &[TileView]);
}

/// Renderer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRender;

impl RenderHook for NullRender {
    fn on_state_change(&mut self, _tiles: &[TileView]) {}
}

impl<F> RenderHook for F
where
    F: FnMut(&[TileView]),
{
    fn on_state_change(&mut self, tiles: &[TileView]) {
        self(tiles)
    }
}
