//! Pipe Runner - a side-scrolling gate-threading arcade game
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (actor physics, obstacle pool, collisions, run state)
//! - `game`: Run host that owns the clock, timers, best score and message feed
//! - `highscores`: Best-score persistence
//! - `settings`: Data-driven tuning and geometry
//! - `assets` / `audio`: Named handles handed over by the asset loader

pub mod assets;
pub mod audio;
pub mod game;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use game::{Game, RunSummary};
pub use highscores::{BestScore, MemoryStore, ScoreStore, StoreError};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
///
/// Durations are in time-units (milliseconds).
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Each of Ready / Steady / Go is shown for this long
    pub const COUNTDOWN_PHASE_MS: f64 = 1000.0;
    /// Whole simulation freezes this long after an obstacle impact
    pub const IMPACT_FREEZE_MS: f64 = 1000.0;
    /// Time after impact at which the dead actor is checked for rest
    pub const SETTLE_CHECK_MS: f64 = 1500.0;
    /// Hard upper bound on the dying phase after an impact
    pub const DEATH_TIMEOUT_MS: f64 = 3000.0;
    /// Delay between entering Ended and signalling game over
    pub const GAME_OVER_DELAY_MS: f64 = 500.0;
    /// How long an informational message stays on screen
    pub const MESSAGE_DISPLAY_MS: f64 = 3000.0;

    /// Vertical speed (units/s) below which a dead actor counts as at rest
    pub const SETTLE_EPSILON: f32 = 1.0;

    /// Score at which obstacles switch to the Medium profile
    pub const MEDIUM_SCORE: u32 = 5;
    /// Score at which obstacles switch to the Hard profile
    pub const HARD_SCORE: u32 = 10;
}

/// Convert a step duration in seconds to time-units
#[inline]
pub fn secs_to_ms(dt: f32) -> f64 {
    dt as f64 * 1000.0
}
