//! Pipe Runner - headless runner
//!
//! Plays one run on autopilot at a fixed 60 Hz frame rate, persists the best
//! score and prints the run summary as JSON.
//!
//! Usage: `pipe-runner [settings.json] [seed]`

use pipe_runner::sim::GameEvent;
use pipe_runner::{Game, RunSummary, ScoreStore, Settings};

/// Frame time fed to the host
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on a run after this many frames (10 minutes)
const MAX_FRAMES: u32 = 60 * 60 * 10;

fn play<S: ScoreStore>(settings: Settings, store: S, seed: u64) -> Option<RunSummary> {
    let mut game = Game::new(settings, store);
    game.set_idle_mode(true);
    game.start_run(seed);

    for _ in 0..MAX_FRAMES {
        game.update(FRAME_DT);
        for event in game.drain_events() {
            match event {
                GameEvent::CountdownPhase(phase) => log::info!("{}", phase.label()),
                GameEvent::DifficultyChanged(tier) => log::info!("Difficulty: {}", tier.as_str()),
                GameEvent::MessageShown { text, .. } => log::info!("Message: {}", text),
                GameEvent::BestScoreUpdated(best) => log::info!("New best score: {}", best),
                GameEvent::GameOver { .. } => return game.last_summary().cloned(),
                _ => {}
            }
        }
    }
    log::warn!("Run still going after {} frames, stopping", MAX_FRAMES);
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pipe_runner::MemoryStore;
    use pipe_runner::highscores::JsonFileStore;

    env_logger::init();
    log::info!("Pipe Runner (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(std::path::PathBuf::from);
    let settings = Settings::load(settings_path.as_deref());

    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("Game initialized with seed: {}", seed);

    let summary = match JsonFileStore::default_location() {
        Ok(store) => {
            log::info!("Best score file: {}", store.path().display());
            play(settings, store, seed)
        }
        Err(e) => {
            log::warn!("{}, best score will not be kept", e);
            play(settings, MemoryStore::default(), seed)
        }
    };

    match summary.map(|s| serde_json::to_string_pretty(&s)) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => log::error!("Failed to serialize summary: {}", e),
        None => std::process::exit(1),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use pipe_runner::highscores::LocalStorageStore;

    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Pipe Runner starting...");

    let settings = Settings::default();
    if let Some(summary) = play(settings, LocalStorageStore, 1) {
        log::info!("Final score {} (best {})", summary.score, summary.best_score);
    }
}
