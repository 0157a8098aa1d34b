//! JSON file persistence.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};
use merge_2048_core::{GameState, GameStore};

/// Saves the session as pretty-printed JSON at a fixed path.
///
/// Read failures and unparsable files count as "no saved game"; write
/// failures are logged and otherwise ignored.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn write(&self, state: &GameState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl GameStore for JsonFileStore {
    fn get_game_state(&self) -> Option<GameState> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("cannot read {}: {}", self.path.display(), err);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(state) => Some(state),
            Err(err) => {
                warn!("ignoring unparsable save {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn set_game_state(&mut self, state: &GameState) {
        match self.write(state) {
            Ok(()) => debug!("saved game to {}", self.path.display()),
            Err(err) => warn!("cannot save game to {}: {:#}", self.path.display(), err),
        }
    }

    fn clear_game_state(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("cannot remove {}: {}", self.path.display(), err),
        }
    }
}
