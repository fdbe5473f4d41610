//! Run host
//!
//! Owns what outlives a single run: the clock and its one-shot timers, the
//! best score and its store, and the message feed. A new run always gets a
//! fresh `RunSession`; timers left over from an older run are dropped when
//! they fire.

use serde::Serialize;

use crate::consts::*;
use crate::highscores::{BestScore, ScoreStore};
use crate::secs_to_ms;
use crate::settings::Settings;
use crate::sim::{
    DifficultyTier, GameEvent, MessageFeed, RunSession, Scheduler, TickInput, TimerEvent,
    fire_timer, tick,
};

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: u64,
    pub seed: u64,
    pub score: u32,
    pub best_score: u32,
    pub tier: DifficultyTier,
    /// Session time from countdown start to game over (excludes pauses)
    pub elapsed_ms: f64,
}

pub struct Game<S: ScoreStore> {
    settings: Settings,
    store: S,
    best: BestScore,
    timers: Scheduler,
    messages: MessageFeed,
    run: Option<RunSession>,
    next_run_id: u64,
    last_summary: Option<RunSummary>,
    /// Pending input for the next fixed step
    input: TickInput,
    accumulator: f32,
    events: Vec<GameEvent>,
}

impl<S: ScoreStore> Game<S> {
    pub fn new(settings: Settings, store: S) -> Self {
        let best_score = store.load_best().unwrap_or_else(|e| {
            log::warn!("Could not load best score ({}), starting from 0", e);
            0
        });
        Self {
            messages: MessageFeed::new(settings.messages.clone()),
            settings,
            store,
            best: BestScore { best_score },
            timers: Scheduler::new(),
            run: None,
            next_run_id: 1,
            last_summary: None,
            input: TickInput::default(),
            accumulator: 0.0,
            events: Vec::new(),
        }
    }

    /// Start a new run, discarding any previous one. Returns the run id.
    pub fn start_run(&mut self, seed: u64) -> u64 {
        let id = self.next_run_id;
        self.next_run_id += 1;
        if let Some(old) = self.run.take() {
            log::info!("Discarding run {} in {:?}", old.id, old.state);
        }
        self.input.flap = false;
        self.accumulator = 0.0;
        self.run = Some(RunSession::new(id, seed, self.settings.clone()));
        log::info!("Run {} started with seed {} (best {})", id, seed, self.best.best_score);
        self.collect_run_events();
        id
    }

    /// A flap trigger occurred; applied on the next step
    pub fn flap(&mut self) {
        self.input.flap = true;
    }

    /// Toggle the autopilot
    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.input.idle_mode = enabled;
    }

    pub fn request_pause(&mut self) {
        if let Some(run) = &mut self.run {
            run.request_pause();
            self.input.flap = false;
        }
        self.collect_run_events();
    }

    pub fn resume_and_replay_countdown(&mut self) {
        if let Some(run) = &mut self.run {
            run.resume_and_replay_countdown();
        }
        self.collect_run_events();
    }

    /// Feed real frame time; runs as many fixed steps as fit. Returns the step count.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Advance the clock by one fixed step, tick the run, then fire due timers
    pub fn step(&mut self, dt: f32) {
        let due = self.timers.advance(secs_to_ms(dt));

        if let Some(run) = &mut self.run {
            tick(run, &self.input, dt, &mut self.timers);
        }
        // One-shot inputs are consumed by the step
        self.input.flap = false;
        self.collect_run_events();

        for timer in due {
            self.dispatch_timer(timer.run_id, timer.event);
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn run(&self) -> Option<&RunSession> {
        self.run.as_ref()
    }

    pub fn run_mut(&mut self) -> Option<&mut RunSession> {
        self.run.as_mut()
    }

    pub fn best_score(&self) -> u32 {
        self.best.best_score
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    pub fn messages(&self) -> &MessageFeed {
        &self.messages
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Host clock in time-units
    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    fn dispatch_timer(&mut self, run_id: u64, event: TimerEvent) {
        if let TimerEvent::HideMessage(index) = event {
            self.events.push(GameEvent::MessageHidden { index });
            return;
        }

        let Some(run) = self.run.as_mut().filter(|r| r.id == run_id) else {
            log::debug!("Dropping {:?} from stale run {}", event, run_id);
            return;
        };

        if event == TimerEvent::AnnounceGameOver {
            let summary = RunSummary {
                run_id,
                seed: run.seed,
                score: run.score,
                best_score: self.best.best_score,
                tier: run.tier(),
                elapsed_ms: run.elapsed_ms,
            };
            log::info!("Game over: score {} (best {})", summary.score, summary.best_score);
            self.events.push(GameEvent::GameOver {
                score: summary.score,
                best: summary.best_score,
            });
            self.last_summary = Some(summary);
            // Deactivate the run; the game-over screen takes it from here
            self.run = None;
            return;
        }

        fire_timer(run, event, &mut self.timers);
        self.collect_run_events();
    }

    /// Move run events to the outbox, handling the ones the host owns
    fn collect_run_events(&mut self) {
        let Some(run) = &mut self.run else {
            return;
        };
        let run_id = run.id;
        let drained = std::mem::take(&mut run.events);

        for event in drained {
            match &event {
                GameEvent::PickupCollected => {
                    self.events.push(event);
                    if let Some((index, text)) = self.messages.next_message() {
                        let text = text.to_string();
                        self.timers
                            .schedule(MESSAGE_DISPLAY_MS, run_id, TimerEvent::HideMessage(index));
                        self.events.push(GameEvent::MessageShown { index, text });
                    }
                }
                GameEvent::RunEnded { score } => {
                    let score = *score;
                    self.events.push(event);
                    self.record_score(score);
                }
                _ => self.events.push(event),
            }
        }
    }

    /// Persist the best score only when beaten
    fn record_score(&mut self, score: u32) {
        if !self.best.record(score) {
            return;
        }
        if let Err(e) = self.store.save_best(score) {
            log::warn!("Failed to save best score {}: {}", score, e);
        }
        self.events.push(GameEvent::BestScoreUpdated(score));
    }
}
