//! Session orchestration: one command in, one consistent board out.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::direction::Direction;
use crate::engine::{self, MoveOutcome};
use crate::error::GameError;
use crate::grid::Grid;
use crate::render::{self, RenderHook, TileView};
use crate::spawner::Spawner;
use crate::state::GameState;
use crate::store::GameStore;
use crate::tile::TileId;

/// Inputs a shell can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    KeepPlaying,
}

/// Summary of a handled move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// Whether the board changed (and a tile was spawned).
    pub moved: bool,
    /// Points earned from merges in this move.
    pub score_delta: u32,
    /// Tile spawned after the move, if any.
    pub spawned: Option<TileId>,
    /// This move crossed the win threshold for the first time.
    pub just_won: bool,
    /// No legal move remains.
    pub over: bool,
}

pub struct GameController<R: Rng> {
    config: GameConfig,
    spawner: Spawner,
    grid: Grid,
    rng: R,
    store: Box<dyn GameStore>,
    render: Box<dyn RenderHook>,
    score: u32,
    best_score: u32,
    over: bool,
    won: bool,
    keep_playing: bool,
    awaiting_settle: bool,
}

impl<R: Rng> GameController<R> {
    /// Create a controller, resuming the stored session when there is a
    /// valid one and starting a new game otherwise.
    pub fn new(
        config: GameConfig,
        rng: R,
        store: Box<dyn GameStore>,
        render: Box<dyn RenderHook>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let mut controller = GameController {
            config,
            spawner: Spawner::new(config.four_probability),
            grid: Grid::new(config.size),
            rng,
            store,
            render,
            score: 0,
            best_score: 0,
            over: false,
            won: false,
            keep_playing: false,
            awaiting_settle: false,
        };

        let resumed = match controller.store.get_game_state() {
            Some(state) => match controller.restore(&state) {
                Ok(()) => true,
                Err(err) => {
                    warn!("discarding saved game: {}", err);
                    false
                }
            },
            None => false,
        };
        if !resumed {
            controller.new_game(config.size)?;
        }
        controller.notify();
        Ok(controller)
    }

    /// Start over on an empty `size`×`size` grid with the configured number
    /// of starting tiles. The best score survives.
    pub fn new_game(&mut self, size: usize) -> Result<(), GameError> {
        if size == 0 || self.config.start_tiles > size * size {
            return Err(GameError::InvalidConfig(format!(
                "cannot start a {}x{} game with {} tiles",
                size, size, self.config.start_tiles
            )));
        }
        self.grid = Grid::new(size);
        self.score = 0;
        self.over = false;
        self.won = false;
        self.keep_playing = false;
        self.awaiting_settle = false;
        for _ in 0..self.config.start_tiles {
            self.spawn_random_tile();
        }
        self.over = !engine::moves_available(&self.grid);
        info!("new {}x{} game", size, size);
        Ok(())
    }

    /// Drop a 2 or a 4 on a random empty cell. A full grid is a no-op.
    pub fn spawn_random_tile(&mut self) -> Option<TileId> {
        match self.spawner.spawn(&mut self.grid, &mut self.rng) {
            Ok(id) => Some(id),
            Err(err) => {
                debug!("spawn skipped: {}", err);
                None
            }
        }
    }

    /// Route a shell command to its handler.
    pub fn dispatch(&mut self, command: Command) -> Result<Option<MoveReport>, GameError> {
        match command {
            Command::Move(direction) => self.handle_move(direction).map(Some),
            Command::Restart => self.restart().map(|()| None),
            Command::KeepPlaying => {
                self.keep_playing();
                Ok(None)
            }
        }
    }

    /// Move from a raw direction code (0=Up, 1=Right, 2=Down, 3=Left).
    pub fn handle_move_code(&mut self, code: u8) -> Result<MoveReport, GameError> {
        let direction = Direction::try_from(code)?;
        self.handle_move(direction)
    }

    /// Play one move.
    ///
    /// The render hook and the store are updated after every accepted move,
    /// including moves that changed nothing.
    pub fn handle_move(&mut self, direction: Direction) -> Result<MoveReport, GameError> {
        if self.awaiting_settle {
            return Err(GameError::InputLocked);
        }

        let outcome = engine::apply_move(&mut self.grid, direction)?;
        let report = self.finish_move(&outcome);

        self.notify();
        self.persist();
        Ok(report)
    }

    fn finish_move(&mut self, outcome: &MoveOutcome) -> MoveReport {
        let mut report = MoveReport {
            moved: outcome.moved,
            score_delta: outcome.score,
            spawned: None,
            just_won: false,
            over: self.over,
        };
        if outcome.moved {
            self.score = self.score.saturating_add(outcome.score);
            self.best_score = self.best_score.max(self.score);
            report.spawned = self.spawn_random_tile();

            if !self.won && outcome.largest_merge() >= self.config.win_value {
                self.won = true;
                report.just_won = true;
                info!("reached {} with score {}", outcome.largest_merge(), self.score);
            }
            if self.config.lock_until_settled {
                self.awaiting_settle = true;
            }
        }

        // Checked on no-op moves too: a board can be dead before any move.
        if !self.over && !engine::moves_available(&self.grid) {
            self.over = true;
            info!("game over with score {}", self.score);
        }
        report.over = self.over;
        report
    }

    /// Clear the saved session and start a new game.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.store.clear_game_state();
        self.new_game(self.config.size)?;
        self.notify();
        Ok(())
    }

    /// Carry on after winning. The board is left as is.
    ///
    /// Ignored until the game has been won.
    pub fn keep_playing(&mut self) {
        if !self.won {
            debug!("keep playing ignored before a win");
            return;
        }
        self.keep_playing = true;
        self.notify();
        self.persist();
    }

    /// Called by the shell once it has finished presenting the last move.
    pub fn settle(&mut self) {
        self.awaiting_settle = false;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn keeps_playing(&self) -> bool {
        self.keep_playing
    }

    pub fn is_awaiting_settle(&self) -> bool {
        self.awaiting_settle
    }

    /// Whether the shell should stop taking moves: the game is lost, or won
    /// and the player has not chosen to keep playing.
    pub fn is_terminated(&self) -> bool {
        self.over || (self.won && !self.keep_playing)
    }

    pub fn legal_directions(&self) -> Vec<Direction> {
        engine::legal_directions(&self.grid)
    }

    pub fn tile_views(&self) -> Vec<TileView> {
        render::tile_views(&self.grid)
    }

    pub fn state(&self) -> GameState {
        GameState {
            grid: self.grid.serialize(),
            score: self.score,
            best_score: self.best_score,
            over: self.over,
            won: self.won,
            keep_playing: self.keep_playing,
        }
    }

    fn restore(&mut self, state: &GameState) -> Result<(), GameError> {
        let grid = Grid::from_serialized(&state.grid)?;
        if state.over && engine::moves_available(&grid) {
            return Err(GameError::CorruptSnapshot(
                "marked over but moves remain".into(),
            ));
        }
        self.grid = grid;
        self.score = state.score;
        self.best_score = state.best_score.max(state.score);
        self.over = state.over || !engine::moves_available(&self.grid);
        self.won = state.won;
        self.keep_playing = state.keep_playing;
        info!(
            "resumed {}x{} game with score {}",
            self.grid.size(),
            self.grid.size(),
            self.score
        );
        Ok(())
    }

    fn notify(&mut self) {
        let tiles = render::tile_views(&self.grid);
        self.render.on_state_change(&tiles);
    }

    fn persist(&mut self) {
        let state = self.state();
        self.store.set_game_state(&state);
    }
}
