//! # 2048 WebAssembly Bindings
//!
//! Browser shell for the rule engine. Tiles are pushed to a JavaScript
//! callback after every state change and the session is kept in
//! `window.localStorage`, so a reload resumes the game.

use log::warn;
use merge_2048_core::{
    Command, GameConfig, GameController, GameState, GameStore, MoveReport, RenderHook, TileView,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

const STORAGE_KEY: &str = "merge2048.gameState";

/// Result of a move, serialized for JavaScript.
#[derive(Serialize)]
pub struct JsMoveResult {
    /// Whether the board changed.
    pub moved: bool,
    /// Points earned from this move.
    pub reward: u32,
    /// Current total score.
    pub score: u32,
    pub best: u32,
    pub won: bool,
    pub over: bool,
}

/// Session persistence backed by `localStorage`. Missing storage (private
/// browsing, sandboxed iframes) behaves like an empty store.
struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl GameStore for LocalStorageStore {
    fn get_game_state(&self) -> Option<GameState> {
        let raw = Self::storage()?.get_item(STORAGE_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(err) => {
                warn!("ignoring unparsable saved game: {}", err);
                None
            }
        }
    }

    fn set_game_state(&mut self, state: &GameState) {
        let Some(storage) = Self::storage() else {
            return;
        };
        match serde_json::to_string(state) {
            Ok(json) => {
                if storage.set_item(STORAGE_KEY, &json).is_err() {
                    warn!("localStorage rejected the saved game");
                }
            }
            Err(err) => warn!("cannot serialize game: {}", err),
        }
    }

    fn clear_game_state(&mut self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }
}

/// Forwards tile lists to a JavaScript function.
struct JsRender {
    callback: js_sys::Function,
}

impl RenderHook for JsRender {
    fn on_state_change(&mut self, tiles: &[TileView]) {
        let value = serde_wasm_bindgen::to_value(tiles).unwrap_or(JsValue::NULL);
        if let Err(err) = self.callback.call1(&JsValue::NULL, &value) {
            warn!("render callback failed: {:?}", err);
        }
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WebAssembly wrapper for the game controller.
#[wasm_bindgen]
pub struct WasmGame {
    game: GameController<SmallRng>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create or resume a game.
    ///
    /// `on_change` receives an array of `{ id, value, x, y, previous,
    /// is_new, is_merged }` after every move, restart and keep-playing.
    /// With `lock_until_settled` set, moves are refused until `settle()`
    /// is called, which lets the page finish its animations first.
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: u64,
        on_change: js_sys::Function,
        lock_until_settled: bool,
    ) -> Result<WasmGame, JsValue> {
        let config = GameConfig {
            lock_until_settled,
            ..GameConfig::default()
        };
        let game = GameController::new(
            config,
            SmallRng::seed_from_u64(seed),
            Box::new(LocalStorageStore),
            Box::new(JsRender {
                callback: on_change,
            }),
        )
        .map_err(js_error)?;
        Ok(WasmGame { game })
    }

    /// Execute a move.
    ///
    /// Direction values:
    /// - 0 = Up
    /// - 1 = Right
    /// - 2 = Down
    /// - 3 = Left
    ///
    /// Throws on an invalid direction or while input is locked.
    #[wasm_bindgen(js_name = "move")]
    pub fn make_move(&mut self, direction: u8) -> Result<JsValue, JsValue> {
        let report = self.game.handle_move_code(direction).map_err(js_error)?;
        Ok(self.create_js_result(&report))
    }

    pub fn restart(&mut self) -> Result<(), JsValue> {
        self.game.dispatch(Command::Restart).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = keepPlaying)]
    pub fn keep_playing(&mut self) {
        self.game.keep_playing();
    }

    /// Unlock input after the page has finished presenting the last move.
    pub fn settle(&mut self) {
        self.game.settle();
    }

    /// Full session snapshot, same shape as the saved game.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.game.state()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getTiles)]
    pub fn get_tiles(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.game.tile_views()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.game.score()
    }

    #[wasm_bindgen(js_name = getBestScore)]
    pub fn get_best_score(&self) -> u32 {
        self.game.best_score()
    }

    #[wasm_bindgen(js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.game.is_over()
    }

    #[wasm_bindgen(js_name = isWon)]
    pub fn is_won(&self) -> bool {
        self.game.is_won()
    }

    /// True when the page should stop accepting moves.
    #[wasm_bindgen(js_name = isTerminated)]
    pub fn is_terminated(&self) -> bool {
        self.game.is_terminated()
    }

    fn create_js_result(&self, report: &MoveReport) -> JsValue {
        let js_result = JsMoveResult {
            moved: report.moved,
            reward: report.score_delta,
            score: self.game.score(),
            best: self.game.best_score(),
            won: self.game.is_won(),
            over: report.over,
        };
        serde_wasm_bindgen::to_value(&js_result).unwrap_or(JsValue::NULL)
    }
}
