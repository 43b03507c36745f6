//! Pocket Arcade entry point
//!
//! Natively this runs a scripted headless session through all four games and
//! reports every finished run to the player session. The browser build is the
//! library's `web` module; the page drives the engines through it.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pocket_arcade::Session;
    use pocket_arcade::consts::FRAME_DT;
    use pocket_arcade::session::reporter;
    use pocket_arcade::sim::{
        Cell, Clock, Direction, Engine, PlatformerEngine, PlatformerInput, PuzzleEngine,
        PuzzleInput, Runner, RunPhase, ScrollerEngine, ScrollerInput, SnakeEngine, SnakeInput,
    };

    /// Drive one engine with a scripted pilot until the run ends or
    /// `max_frames` frames have passed
    pub fn play<E: Engine>(
        engine: E,
        session: &Rc<RefCell<Session>>,
        max_frames: u32,
        mut pilot: impl FnMut(&E) -> E::Input,
    ) {
        let game = engine.game();
        let mut runner = Runner::new(engine).on_terminal(reporter(session));

        let dt = match E::CLOCK {
            Clock::Fixed(step) => step,
            Clock::PerFrame => FRAME_DT,
        };
        for _ in 0..max_frames {
            if runner.engine().lifecycle().is_terminal() {
                return;
            }
            *runner.input_mut() = pilot(runner.engine());
            runner.frame(dt);
        }
        log::info!(
            "{} still running after {} frames (score {})",
            game.as_str(),
            max_frames,
            runner.engine().score()
        );
    }

    /// Greedy: step toward the food through any free cell
    pub fn snake_pilot(engine: &SnakeEngine) -> SnakeInput {
        let state = engine.state();
        let config = engine.config();
        let head = state.head();
        let free = |cell: Cell| cell.in_bounds(config.width, config.height) && !state.occupies(cell);

        let turn = Direction::ALL
            .into_iter()
            .filter(|d| !d.is_opposite(state.heading))
            .map(|d| (d, head.step(d)))
            .filter(|&(_, cell)| free(cell))
            .min_by_key(|&(_, cell)| cell.manhattan(state.food))
            .map(|(d, _)| d);

        SnakeInput { turn, pause: false }
    }

    /// Corner strategy: prefer down, then left, right and finally up
    pub fn puzzle_pilot() -> impl FnMut(&PuzzleEngine) -> PuzzleInput {
        const ORDER: [Direction; 4] = [
            Direction::Down,
            Direction::Left,
            Direction::Right,
            Direction::Up,
        ];
        let mut last_moves = u32::MAX;
        let mut attempt = 0usize;

        move |engine: &PuzzleEngine| {
            let moves = engine.state().moves;
            if moves == last_moves {
                attempt += 1;
            } else {
                last_moves = moves;
                attempt = 0;
            }
            PuzzleInput {
                direction: Some(ORDER[attempt % ORDER.len()]),
                pause: false,
            }
        }
    }

    /// Flap whenever the ship sinks below the next gap
    pub fn scroller_pilot(engine: &ScrollerEngine) -> ScrollerInput {
        let state = engine.state();
        let config = engine.config();
        let ship = state.ship_hitbox(config);
        let target = state
            .obstacles
            .iter()
            .find(|o| o.right(config) >= ship.x)
            .map(|o| o.gap_center)
            .unwrap_or(config.play_height / 2.0);

        let jump = engine.phase() == RunPhase::Idle
            || (ship.center().y > target + 20.0 && state.ship_velocity >= 0.0);
        ScrollerInput { jump, pause: false }
    }

    /// Run right, jumping at walls, holes and enemies
    pub fn platformer_pilot(engine: &PlatformerEngine) -> PlatformerInput {
        let state = engine.state();
        let player = state.player.body;
        let tile = state.map.tile_size();

        let probe = player.at(player.x + tile, player.y);
        let wall_ahead = state.map.overlaps_solid(&probe);
        let hole_ahead = state.map.ground_below(&probe, tile).is_none();
        let enemy_ahead = state.enemies.iter().any(|e| {
            !e.dead
                && e.body.x > player.x
                && e.body.x - player.right() < 48.0
                && (e.body.y - player.y).abs() < tile
        });

        PlatformerInput {
            right: true,
            jump: state.player.grounded && (wall_ahead || hole_ahead || enemy_ahead),
            ..Default::default()
        }
    }

    pub fn run(seed: u64) {
        let session = Rc::new(RefCell::new(Session::open(
            pocket_arcade::platform::default_store(),
        )));
        log::info!(
            "Session opened with {} coins (seed {})",
            session.borrow().wallet.balance(),
            seed
        );

        play(SnakeEngine::new(seed), &session, 4000, snake_pilot);
        play(PuzzleEngine::new(seed), &session, 5000, puzzle_pilot());
        play(ScrollerEngine::new(seed), &session, 3600, scroller_pilot);
        play(PlatformerEngine::new(seed), &session, 7200, platformer_pilot);

        let tapped: u64 = (0..25).map(|_| session.borrow_mut().tap()).sum();
        log::info!("Clicker paid {} coins", tapped);

        let session = session.borrow();
        for game in pocket_arcade::GameId::ALL {
            log::info!(
                "{}: best {}, top {:?}",
                game.as_str(),
                session.settings.high_score(game),
                session.scores.top_score(game)
            );
        }
        log::info!("Balance: {} coins", session.wallet.balance());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pocket Arcade (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| pocket_arcade::platform::now_ms() as u64);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start in the library, this is just to satisfy the compiler
}
