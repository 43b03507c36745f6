//! Browser bindings
//!
//! The page creates one [`Arcade`] (the player session) and asks it for a
//! game. Each game wraps a [`Runner`] whose terminal callback reports into
//! the shared session. The page forwards input events to the setters, calls
//! `frame(dt)` from `requestAnimationFrame` and renders `stateJson()`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::platform::default_store;
use crate::session::{Session, reporter};
use crate::sim::{
    Direction, Engine, GameId, PlatformerEngine, PuzzleEngine, Runner, ScrollerEngine,
    SnakeEngine,
};
use crate::wallet::Purchase;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Pocket Arcade (wasm) ready");
}

/// Player session shared by every game the page opens
#[wasm_bindgen]
pub struct Arcade {
    session: Rc<RefCell<Session>>,
}

impl Default for Arcade {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Arcade {
    /// Open the session on LocalStorage (memory when unavailable)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Arcade {
        let session = Session::open(default_store());
        log::info!("Session opened with {} coins", session.wallet.balance());
        Arcade {
            session: Rc::new(RefCell::new(session)),
        }
    }

    pub fn balance(&self) -> u64 {
        self.session.borrow().wallet.balance()
    }

    pub fn tap(&self) -> u64 {
        self.session.borrow_mut().tap()
    }

    pub fn multiplier(&self) -> u32 {
        self.session.borrow().clicker.multiplier()
    }

    #[wasm_bindgen(js_name = upgradeClicker)]
    pub fn upgrade_clicker(&self) -> Result<u32, JsError> {
        Ok(self.session.borrow_mut().upgrade_clicker()?)
    }

    /// Returns true when coins were spent, false when an owned item was
    /// switched on
    #[wasm_bindgen(js_name = buyOrActivate)]
    pub fn buy_or_activate(&self, id: &str) -> Result<bool, JsError> {
        let purchase = self.session.borrow_mut().buy_or_activate(id)?;
        Ok(purchase == Purchase::Bought)
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) -> bool {
        self.session.borrow_mut().toggle_mute()
    }

    /// Stored best for a game id ("snake", "2048", "flappybird", "platformer")
    #[wasm_bindgen(js_name = highScore)]
    pub fn high_score(&self, game: &str) -> Result<u64, JsError> {
        let game = GameId::from_str(game)
            .ok_or_else(|| JsError::new(&format!("unknown game '{}'", game)))?;
        Ok(self.session.borrow().settings.high_score(game))
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.borrow().settings)?)
    }

    #[wasm_bindgen(js_name = shopJson)]
    pub fn shop_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.session.borrow().shop.items())?)
    }

    #[wasm_bindgen(js_name = scoresJson)]
    pub fn scores_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.borrow().scores)?)
    }

    pub fn snake(&self, seed: u64) -> SnakeGame {
        SnakeGame {
            runner: Runner::new(SnakeEngine::new(seed)).on_terminal(reporter(&self.session)),
        }
    }

    pub fn puzzle(&self, seed: u64) -> PuzzleGame {
        PuzzleGame {
            runner: Runner::new(PuzzleEngine::new(seed)).on_terminal(reporter(&self.session)),
        }
    }

    pub fn scroller(&self, seed: u64) -> ScrollerGame {
        ScrollerGame {
            runner: Runner::new(ScrollerEngine::new(seed)).on_terminal(reporter(&self.session)),
        }
    }

    pub fn platformer(&self, seed: u64) -> PlatformerGame {
        PlatformerGame {
            runner: Runner::new(PlatformerEngine::new(seed))
                .on_terminal(reporter(&self.session)),
        }
    }
}

fn direction(name: &str) -> Result<Direction, JsError> {
    Direction::from_name(name).ok_or_else(|| JsError::new(&format!("unknown direction '{}'", name)))
}

/// Methods every game exposes to the page
macro_rules! game_binding {
    ($name:ident, $engine:ty) => {
        #[wasm_bindgen]
        pub struct $name {
            runner: Runner<$engine>,
        }

        #[wasm_bindgen]
        impl $name {
            pub fn reset(&mut self) {
                self.runner.reset();
            }

            /// Advance by one rendered frame of `dt` seconds; returns ticks run
            pub fn frame(&mut self, dt: f32) -> u32 {
                self.runner.frame(dt)
            }

            pub fn pause(&mut self) {
                self.runner.input_mut().pause = true;
            }

            pub fn score(&self) -> u64 {
                self.runner.engine().score()
            }

            /// "Idle", "Running", "Paused", "Won" or "Lost"
            pub fn phase(&self) -> String {
                format!("{:?}", self.runner.engine().phase())
            }

            #[wasm_bindgen(js_name = stateJson)]
            pub fn state_json(&self) -> Result<String, JsError> {
                Ok(serde_json::to_string(self.runner.state())?)
            }

            /// Final outcome once the run has ended
            #[wasm_bindgen(js_name = outcomeJson)]
            pub fn outcome_json(&self) -> Result<Option<String>, JsError> {
                match self.runner.engine().lifecycle().outcome() {
                    Some(outcome) => Ok(Some(serde_json::to_string(outcome)?)),
                    None => Ok(None),
                }
            }
        }
    };
}

game_binding!(SnakeGame, SnakeEngine);
game_binding!(PuzzleGame, PuzzleEngine);
game_binding!(ScrollerGame, ScrollerEngine);
game_binding!(PlatformerGame, PlatformerEngine);

#[wasm_bindgen]
impl SnakeGame {
    /// Queue a turn for the next step ("up", "ArrowLeft", ...)
    pub fn turn(&mut self, name: &str) -> Result<(), JsError> {
        self.runner.input_mut().turn = Some(direction(name)?);
        Ok(())
    }
}

#[wasm_bindgen]
impl PuzzleGame {
    /// Slide the board on the next frame
    pub fn slide(&mut self, name: &str) -> Result<(), JsError> {
        self.runner.input_mut().direction = Some(direction(name)?);
        Ok(())
    }
}

#[wasm_bindgen]
impl ScrollerGame {
    pub fn jump(&mut self) {
        self.runner.input_mut().jump = true;
    }
}

#[wasm_bindgen]
impl PlatformerGame {
    #[wasm_bindgen(js_name = setLeft)]
    pub fn set_left(&mut self, held: bool) {
        self.runner.input_mut().left = held;
    }

    #[wasm_bindgen(js_name = setRight)]
    pub fn set_right(&mut self, held: bool) {
        self.runner.input_mut().right = held;
    }

    pub fn jump(&mut self) {
        self.runner.input_mut().jump = true;
    }
}
