//! Run state and core simulation types
//!
//! A `RunSession` is one attempt from countdown to game over. Everything that
//! used to be carried between runs implicitly (placement counter, difficulty)
//! lives here and is rebuilt from scratch by `RunSession::new`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Pose};
use super::difficulty::{DifficultyController, DifficultyTier};
use super::obstacles::ObstacleField;
use crate::audio::SoundCue;
use crate::consts::COUNTDOWN_PHASE_MS;
use crate::settings::Settings;

/// Intro countdown phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownPhase {
    Ready,
    Steady,
    Go,
}

impl CountdownPhase {
    pub fn next(self) -> Option<Self> {
        match self {
            CountdownPhase::Ready => Some(CountdownPhase::Steady),
            CountdownPhase::Steady => Some(CountdownPhase::Go),
            CountdownPhase::Go => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CountdownPhase::Ready => "Ready",
            CountdownPhase::Steady => "Steady",
            CountdownPhase::Go => "Go",
        }
    }
}

/// How the actor died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Touched the top or bottom edge
    OutOfBounds,
    /// Hit an obstacle segment
    Collision,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunState {
    /// Input disabled and physics held until the phase chain completes
    Countdown {
        phase: CountdownPhase,
        /// Session time at which `phase` ends
        deadline_ms: f64,
    },
    Playing,
    Dying(DeathCause),
    Ended,
}

impl RunState {
    pub fn is_countdown(&self) -> bool {
        matches!(self, RunState::Countdown { .. })
    }
}

/// Notifications for the presentation layer and the run host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CountdownPhase(CountdownPhase),
    CountdownFinished,
    Sound(SoundCue),
    Pose(Pose),
    Flapped,
    ScoreChanged(u32),
    DifficultyChanged(DifficultyTier),
    PickupSpawned { pair: usize },
    PickupCollected,
    MessageShown { index: usize, text: String },
    MessageHidden { index: usize },
    Died(DeathCause),
    /// Entered Ended with this final score
    RunEnded { score: u32 },
    BestScoreUpdated(u32),
    /// Delayed hand-off to the game-over screen
    GameOver { score: u32, best: u32 },
    Paused,
    Resumed,
}

/// One run's complete simulation state
#[derive(Debug, Clone)]
pub struct RunSession {
    pub id: u64,
    pub seed: u64,
    pub settings: Settings,
    pub(crate) rng: Pcg32,
    pub actor: Actor,
    pub field: ObstacleField,
    pub difficulty: DifficultyController,
    pub score: u32,
    pub state: RunState,
    /// Session time; frozen while paused
    pub elapsed_ms: f64,
    /// Physics held (countdown, impact freeze, after an edge death)
    pub physics_paused: bool,
    pub input_enabled: bool,
    /// Explicit pause request, orthogonal to `state`
    pub paused: bool,
    /// Settle check found the dead actor still moving; end as soon as it rests
    pub settle_watch: bool,
    pub events: Vec<GameEvent>,
}

impl RunSession {
    pub fn new(id: u64, seed: u64, settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let difficulty = DifficultyController::default();
        let mut field = ObstacleField::new(&settings);
        let placements = field.initialize(
            settings.pool_size,
            settings.difficulty.profile(difficulty.tier()),
            &mut rng,
        );

        let mut run = Self {
            id,
            seed,
            actor: Actor::new(&settings),
            settings,
            rng,
            field,
            difficulty,
            score: 0,
            state: RunState::Playing,
            elapsed_ms: 0.0,
            physics_paused: false,
            input_enabled: true,
            paused: false,
            settle_watch: false,
            events: vec![GameEvent::Sound(SoundCue::AmbientPlay)],
        };
        run.events.extend(
            placements
                .iter()
                .filter(|p| p.pickup)
                .map(|p| GameEvent::PickupSpawned { pair: p.pair }),
        );
        run.begin_countdown();
        run
    }

    /// Restart the Ready / Steady / Go chain from its first phase
    pub fn begin_countdown(&mut self) {
        self.state = RunState::Countdown {
            phase: CountdownPhase::Ready,
            deadline_ms: self.elapsed_ms + COUNTDOWN_PHASE_MS,
        };
        self.physics_paused = true;
        self.input_enabled = false;
        self.events.push(GameEvent::CountdownPhase(CountdownPhase::Ready));
    }

    /// Halt physics and input until resumed
    pub fn request_pause(&mut self) {
        if self.paused || self.state == RunState::Ended {
            return;
        }
        self.paused = true;
        log::info!("Run {} paused", self.id);
        self.events.push(GameEvent::Sound(SoundCue::AmbientPause));
        self.events.push(GameEvent::Paused);
    }

    /// Clear the pause flag and replay the whole countdown
    pub fn resume_and_replay_countdown(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        log::info!("Run {} resumed", self.id);
        self.events.push(GameEvent::Resumed);
        self.events.push(GameEvent::Sound(SoundCue::AmbientResume));
        if matches!(self.state, RunState::Playing | RunState::Countdown { .. }) {
            self.begin_countdown();
        }
    }

    pub fn tier(&self) -> DifficultyTier {
        self.difficulty.tier()
    }
}
