//! Persistence collaborator.

use crate::state::GameState;

/// Where the controller saves and resumes sessions.
///
/// Implementations own their failure handling: a store that cannot read
/// reports `None`, one that cannot write logs and carries on.
pub trait GameStore {
    fn get_game_state(&self) -> Option<GameState>;
    fn set_game_state(&mut self, state: &GameState);
    fn clear_game_state(&mut self);
}

/// Keeps the last saved state in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Option<GameState>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously saved state.
    pub fn with_state(state: GameState) -> Self {
        Self {
            state: Some(state),
            writes: 0,
        }
    }

    /// Number of `set_game_state` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl GameStore for MemoryStore {
    fn get_game_state(&self) -> Option<GameState> {
        self.state.clone()
    }

    fn set_game_state(&mut self, state: &GameState) {
        self.state = Some(state.clone());
        self.writes += 1;
    }

    fn clear_game_state(&mut self) {
        self.state = None;
    }
}
