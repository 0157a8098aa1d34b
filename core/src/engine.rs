//! Slide and merge rules.
//!
//! A move is a single sweep over the grid in traversal order. Cells closest
//! to the destination edge are visited first, so every tile slides into a
//! row or column whose leading part has already settled.

use log::debug;

use crate::direction::{Direction, Vector};
use crate::error::GameError;
use crate::grid::Grid;
use crate::tile::{Position, TileId};

/// Visiting order for one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversals {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

/// Result of walking from a cell along a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarthestPosition {
    /// Last empty cell reached (the start cell if the first step is blocked).
    pub farthest: Position,
    /// First occupied cell hit, or `None` when the walk left the grid.
    pub next: Option<Position>,
}

/// A merge that happened during a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub tile: TileId,
    pub from: [TileId; 2],
    pub value: u32,
}

/// What a move did to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether any tile slid or merged.
    pub moved: bool,
    /// Sum of the values created by merges.
    pub score: u32,
    pub merges: Vec<Merge>,
}

impl MoveOutcome {
    /// Largest value produced by a merge this move, 0 if nothing merged.
    pub fn largest_merge(&self) -> u32 {
        self.merges.iter().map(|m| m.value).max().unwrap_or(0)
    }
}

/// Build the traversal order for a vector: rightmost columns first when
/// moving right, bottom rows first when moving down.
pub fn build_traversals(size: usize, vector: Vector) -> Traversals {
    let mut x: Vec<usize> = (0..size).collect();
    let mut y: Vec<usize> = (0..size).collect();
    if vector.dx > 0 {
        x.reverse();
    }
    if vector.dy > 0 {
        y.reverse();
    }
    Traversals { x, y }
}

/// Walk from `cell` along `vector` while the next cell is inside the grid
/// and empty.
pub fn find_farthest_position(grid: &Grid, cell: Position, vector: Vector) -> FarthestPosition {
    let mut farthest = cell;
    loop {
        let x = farthest.x as i64 + vector.dx;
        let y = farthest.y as i64 + vector.dy;
        if !grid.within_bounds(x, y) {
            return FarthestPosition {
                farthest,
                next: None,
            };
        }
        let candidate = Position::new(x as usize, y as usize);
        if grid.cell_occupied(candidate) {
            return FarthestPosition {
                farthest,
                next: Some(candidate),
            };
        }
        farthest = candidate;
    }
}

/// Slide and merge every tile on `grid` toward `direction`.
///
/// A tile created by a merge this move is never merged again.
pub fn apply_move(grid: &mut Grid, direction: Direction) -> Result<MoveOutcome, GameError> {
    let vector = direction.vector();
    let traversals = build_traversals(grid.size(), vector);
    let mut outcome = MoveOutcome::default();

    grid.prepare_tiles();

    for &x in &traversals.x {
        for &y in &traversals.y {
            let cell = Position::new(x, y);
            let Some(tile) = grid.cell_content(cell) else {
                continue;
            };
            let (id, value) = (tile.id(), tile.value());
            let positions = find_farthest_position(grid, cell, vector);

            let mergeable = positions
                .next
                .and_then(|next| grid.cell_content(next))
                .filter(|other| !other.is_merged())
                .and_then(|other| {
                    merged_value(value, other.value())
                        .map(|merged| (other.id(), other.position(), merged))
                });

            if let Some((other_id, target, merged)) = mergeable {
                grid.remove_tile(other_id);
                grid.remove_tile(id);
                let merged_id = grid.insert_tile(target, merged)?;
                grid.set_merged_from(merged_id, [id, other_id]);
                grid.retarget_consumed(id, target);
                outcome.score = outcome.score.saturating_add(merged);
                outcome.merges.push(Merge {
                    tile: merged_id,
                    from: [id, other_id],
                    value: merged,
                });
                outcome.moved = true;
            } else if positions.farthest != cell {
                grid.move_tile(id, positions.farthest)?;
                outcome.moved = true;
            }
        }
    }

    debug!(
        "move {}: moved={} merges={} score=+{}",
        direction,
        outcome.moved,
        outcome.merges.len(),
        outcome.score
    );
    Ok(outcome)
}

/// Value of the tile two equal tiles merge into. Tiles whose sum would not
/// fit in a `u32` never merge.
fn merged_value(a: u32, b: u32) -> Option<u32> {
    if a == b {
        a.checked_mul(2)
    } else {
        None
    }
}

/// Whether any tile has an axis-adjacent neighbour it can merge with.
pub fn tile_matches_available(grid: &Grid) -> bool {
    grid.tiles().any(|tile| {
        Direction::all().into_iter().any(|direction| {
            let vector = direction.vector();
            let x = tile.x() as i64 + vector.dx;
            let y = tile.y() as i64 + vector.dy;
            grid.within_bounds(x, y)
                && grid
                    .cell_content(Position::new(x as usize, y as usize))
                    .is_some_and(|other| merged_value(tile.value(), other.value()).is_some())
        })
    })
}

/// A move is possible when a cell is empty or two equal tiles touch.
pub fn moves_available(grid: &Grid) -> bool {
    grid.cells_available() || tile_matches_available(grid)
}

/// Whether moving in `direction` would change the board.
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    let mut probe = grid.clone();
    apply_move(&mut probe, direction).is_ok_and(|outcome| outcome.moved)
}

/// Directions that would change the board, in code order.
pub fn legal_directions(grid: &Grid) -> Vec<Direction> {
    Direction::all()
        .into_iter()
        .filter(|&direction| can_move(grid, direction))
        .collect()
}
