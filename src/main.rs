//! Endless Runner entry point
//!
//! Native builds run a headless autopilot session on the fixed-step loop.
//! The browser build is driven by the host page through the library.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use endless_runner::Settings;
    use endless_runner::audio::LogAudio;
    use endless_runner::consts::*;
    use endless_runner::platform;
    use endless_runner::sim::{Catalog, Game, GameEvent, GamePhase, TickInput};

    env_logger::init();
    log::info!("Endless Runner (native) starting...");

    let store = platform::default_store();
    let settings = Settings::load(store.as_ref());

    let mut game = match Game::new(&settings, &Catalog::default(), Box::new(LogAudio::default()), store) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to build track pools: {}", e);
            std::process::exit(1);
        }
    };

    let seed = platform::run_seed();
    game.play_with_seed(seed);
    log::info!("Run started with seed: {}", seed);

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    // Simulated 30 fps frames fed through the fixed-step accumulator
    let frame_dt = 1.0 / 30.0;
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    while elapsed < 60.0 && game.phase() != GamePhase::GameOver {
        accumulator += frame_dt;
        elapsed += frame_dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            game.tick(SIM_DT, &input);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in game.drain_events() {
            match event {
                GameEvent::PlayerTurned(heading) => log::debug!("Turned {:?}", heading),
                GameEvent::GameOver {
                    score,
                    new_high_score,
                } => log::info!("Game over at {} (new high score: {})", score, new_high_score),
                _ => {}
            }
        }
    }

    log::info!(
        "Session finished after {:.1}s: score {}, best {:?}",
        elapsed,
        game.player().score(),
        game.high_score().best
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host page drives `Game` through the library
}
