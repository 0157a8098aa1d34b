//! # 2048 Rule Engine
//!
//! Slide/merge rules, grid model and session controller for a 2048-style
//! merge puzzle. Rendering, input capture and storage are left to the shell,
//! which plugs in through [`RenderHook`] and [`GameStore`] and feeds
//! [`Command`]s in. Randomness is injected, so a seeded or mock RNG gives
//! fully reproducible games.
//!
//! ## Example
//!
//! ```rust
//! use merge_2048_core::{Direction, GameConfig, GameController, MemoryStore, NullRender};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let mut game = GameController::new(
//!     GameConfig::default(),
//!     SmallRng::seed_from_u64(42),
//!     Box::new(MemoryStore::new()),
//!     Box::new(NullRender),
//! )
//! .unwrap();
//! let report = game.handle_move(Direction::Left).unwrap();
//! println!("Score: {}, Moved: {}", game.score(), report.moved);
//! ```

pub mod config;
pub mod controller;
pub mod direction;
pub mod engine;
pub mod error;
pub mod grid;
pub mod render;
pub mod spawner;
pub mod state;
pub mod store;
pub mod tile;

pub use config::GameConfig;
pub use controller::{Command, GameController, MoveReport};
pub use direction::{Direction, Vector};
pub use engine::{
    apply_move, build_traversals, can_move, find_farthest_position, legal_directions, moves_available,
    tile_matches_available, FarthestPosition, Merge, MoveOutcome, Traversals,
};
pub use error::GameError;
pub use grid::{Grid, DEFAULT_SIZE};
pub use render::{tile_views, NullRender, RenderHook, TileView};
pub use spawner::Spawner;
pub use state::{GameState, SerializedGrid, TileState};
pub use store::{GameStore, MemoryStore};
pub use tile::{Position, Tile, TileId};
