//! Fixed timestep simulation tick
//!
//! Core run loop that advances a session deterministically. Each tick runs
//! in a fixed order: pause/state gate, countdown, input, actor integration,
//! obstacle advance and recycle, collision and pickup overlap, bounds.

use super::collision::{actor_obstacle_hit, land_on_obstacles};
use super::obstacles::Side;
use super::state::{CountdownPhase, DeathCause, GameEvent, RunSession, RunState};
use super::timer::{Scheduler, TimerEvent};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::secs_to_ms;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// A flap trigger occurred since the last tick
    pub flap: bool,
    /// Idle/demo mode - autopilot flies the actor
    pub idle_mode: bool,
}

/// Advance the run by one fixed timestep
pub fn tick(run: &mut RunSession, input: &TickInput, dt: f32, timers: &mut Scheduler) {
    // Don't tick if paused or finished
    if run.paused || run.state == RunState::Ended {
        return;
    }

    run.elapsed_ms += secs_to_ms(dt);
    advance_countdown(run);

    if input.flap || (input.idle_mode && autopilot_wants_flap(run)) {
        flap(run);
    }

    if run.physics_paused {
        return;
    }

    match run.state {
        RunState::Playing => {
            let prev_bottom = run.actor.bounds().bottom();
            run.actor.apply_gravity(run.settings.gravity, dt);
            run.actor.integrate(dt);
            run.field.advance(dt);
            recycle_pairs(run);

            if let Some(hit) = actor_obstacle_hit(&run.actor, &run.field) {
                log::info!(
                    "Run {} hit {:?} segment of pair {} at score {}",
                    run.id,
                    hit.side,
                    hit.pair,
                    run.score
                );
                if hit.side == Side::Lower {
                    // Dropped onto the segment's top: rest on it, not inside it
                    land_on_obstacles(&mut run.actor, &run.field, prev_bottom);
                }
                impact(run, timers);
                return;
            }

            let body = run.actor.bounds();
            if let Some(pickup) = run.field.pickups_mut().collect(&body) {
                log::debug!("Pickup from pair {} collected", pickup.pair);
                run.events.push(GameEvent::Sound(SoundCue::PickupChime));
                run.events.push(GameEvent::PickupCollected);
            }

            if run.actor.out_of_bounds(run.settings.screen_height) {
                log::info!("Run {} left the screen at score {}", run.id, run.score);
                run.actor.kill();
                run.physics_paused = true;
                run.state = RunState::Dying(DeathCause::OutOfBounds);
                run.events.push(GameEvent::Pose(run.actor.pose));
                run.events.push(GameEvent::Died(DeathCause::OutOfBounds));
                enter_ended(run, timers);
            }
        }

        RunState::Dying(DeathCause::Collision) => {
            // Obstacles are frozen; only the dead actor keeps falling
            let prev_bottom = run.actor.bounds().bottom();
            run.actor.apply_gravity(run.settings.gravity, dt);
            run.actor.integrate(dt);
            run.field.advance(dt);
            land_on_obstacles(&mut run.actor, &run.field, prev_bottom);

            if run.actor.left_visible_range(run.settings.screen_height)
                || (run.settle_watch && is_settled(run))
            {
                enter_ended(run, timers);
            }
        }

        _ => {}
    }
}

/// Apply a timer that belongs to this run
pub fn fire_timer(run: &mut RunSession, event: TimerEvent, timers: &mut Scheduler) {
    if run.state != RunState::Dying(DeathCause::Collision) {
        log::debug!("Run {}: {:?} fired in {:?}, ignored", run.id, event, run.state);
        return;
    }
    match event {
        TimerEvent::ResumeAfterImpact => {
            run.physics_paused = false;
        }
        TimerEvent::SettleCheck => {
            if is_settled(run) {
                enter_ended(run, timers);
            } else {
                run.settle_watch = true;
            }
        }
        TimerEvent::DeathTimeout => {
            log::info!("Run {} never settled, forcing game over", run.id);
            enter_ended(run, timers);
        }
        TimerEvent::AnnounceGameOver | TimerEvent::HideMessage(_) => {}
    }
}

/// Step through Ready / Steady / Go against a single deadline
fn advance_countdown(run: &mut RunSession) {
    let RunState::Countdown { phase, deadline_ms } = run.state else {
        return;
    };
    if run.elapsed_ms < deadline_ms {
        return;
    }
    match phase.next() {
        Some(next) => {
            run.state = RunState::Countdown {
                phase: next,
                deadline_ms: deadline_ms + COUNTDOWN_PHASE_MS,
            };
            run.events.push(GameEvent::CountdownPhase(next));
        }
        None => {
            debug_assert_eq!(phase, CountdownPhase::Go);
            run.state = RunState::Playing;
            run.physics_paused = false;
            run.input_enabled = true;
            run.events.push(GameEvent::CountdownFinished);
            log::info!("Run {} countdown finished", run.id);
        }
    }
}

/// Flap if input is live; ignored otherwise
fn flap(run: &mut RunSession) -> bool {
    if run.paused || !run.input_enabled || run.state != RunState::Playing {
        return false;
    }
    run.actor.flap(run.settings.flap_velocity);
    run.events.push(GameEvent::Flapped);
    true
}

/// Place every off-screen pair again; one point per recycled pair
fn recycle_pairs(run: &mut RunSession) {
    for (upper, lower) in run.field.recycle() {
        let profile = run.settings.difficulty.profile(run.difficulty.tier());
        let placement = run.field.place_pair(upper, lower, profile, &mut run.rng);
        if placement.pickup {
            run.events.push(GameEvent::PickupSpawned { pair: placement.pair });
        }

        run.score += 1;
        run.events.push(GameEvent::ScoreChanged(run.score));

        if let Some(tier) = run.difficulty.update(run.score) {
            log::info!("Run {} difficulty -> {} at score {}", run.id, tier.as_str(), run.score);
            run.events.push(GameEvent::DifficultyChanged(tier));
        }
    }
}

/// Obstacle hit: freeze the world, kill the actor, arm the death timers
fn impact(run: &mut RunSession, timers: &mut Scheduler) {
    run.field.freeze();
    run.actor.kill();
    run.physics_paused = true;
    run.state = RunState::Dying(DeathCause::Collision);

    run.events.push(GameEvent::Sound(SoundCue::Impact));
    run.events.push(GameEvent::Pose(run.actor.pose));
    run.events.push(GameEvent::Died(DeathCause::Collision));

    timers.schedule(IMPACT_FREEZE_MS, run.id, TimerEvent::ResumeAfterImpact);
    timers.schedule(SETTLE_CHECK_MS, run.id, TimerEvent::SettleCheck);
    timers.schedule(DEATH_TIMEOUT_MS, run.id, TimerEvent::DeathTimeout);
}

fn is_settled(run: &RunSession) -> bool {
    !run.physics_paused && run.actor.vel.y.abs() < SETTLE_EPSILON
}

/// Enter Ended once: stop the music, report the score, schedule the hand-off
fn enter_ended(run: &mut RunSession, timers: &mut Scheduler) {
    if run.state == RunState::Ended {
        return;
    }
    run.state = RunState::Ended;
    run.physics_paused = true;
    run.input_enabled = false;
    run.settle_watch = false;
    run.events.push(GameEvent::Sound(SoundCue::AmbientStop));
    run.events.push(GameEvent::RunEnded { score: run.score });
    timers.schedule(GAME_OVER_DELAY_MS, run.id, TimerEvent::AnnounceGameOver);
    log::info!("Run {} ended with score {}", run.id, run.score);
}

/// Demo pilot: hover a little below the next gap's center
fn autopilot_wants_flap(run: &RunSession) -> bool {
    if run.state != RunState::Playing || !run.input_enabled {
        return false;
    }
    let body = run.actor.bounds();
    let Some(next) = run
        .field
        .pairs()
        .iter()
        .filter(|p| p.right() > body.left())
        .min_by(|a, b| a.x.total_cmp(&b.x))
    else {
        return false;
    };

    let target = next.gap_center() + next.gap_height * 0.2;
    let center = body.center().y;
    let vel = run.actor.vel.y;
    if center > target + next.gap_height * 0.5 {
        // Far below: climb harder
        vel > run.settings.flap_velocity * 0.5
    } else {
        center > target && vel >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::actor::Pose;

    fn new_run(seed: u64) -> (RunSession, Scheduler) {
        (RunSession::new(1, seed, Settings::default()), Scheduler::new())
    }

    /// Tick until the countdown is over
    fn skip_countdown(run: &mut RunSession, timers: &mut Scheduler) {
        let input = TickInput::default();
        while run.state.is_countdown() {
            tick(run, &input, SIM_DT, timers);
        }
    }

    #[test]
    fn test_countdown_runs_three_phases() {
        let (mut run, mut timers) = new_run(12345);
        let input = TickInput::default();
        let mut ticks = 0;
        while run.state.is_countdown() {
            tick(&mut run, &input, SIM_DT, &mut timers);
            ticks += 1;
        }
        assert_eq!(run.state, RunState::Playing);
        assert!(!run.physics_paused);
        assert!(run.input_enabled);
        // 3 x 1000ms at 120 Hz, give or take one tick of float rounding
        assert!((359..=361).contains(&ticks), "ticks = {}", ticks);

        let phases: Vec<_> = run
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::CountdownPhase(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![CountdownPhase::Ready, CountdownPhase::Steady, CountdownPhase::Go]
        );
        assert!(run.events.contains(&GameEvent::CountdownFinished));
    }

    #[test]
    fn test_physics_held_during_countdown() {
        let (mut run, mut timers) = new_run(1);
        let start_y = run.actor.pos.y;
        let start_x = run.field.pairs()[0].x;
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        for _ in 0..100 {
            tick(&mut run, &input, SIM_DT, &mut timers);
        }
        assert_eq!(run.actor.pos.y, start_y);
        assert_eq!(run.actor.vel.y, 0.0);
        assert_eq!(run.field.pairs()[0].x, start_x);
        assert!(!run.events.contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_flap_sets_upward_velocity() {
        let (mut run, mut timers) = new_run(2);
        skip_countdown(&mut run, &mut timers);
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut run, &input, SIM_DT, &mut timers);
        // Flap replaces velocity, then one step of gravity applies
        let expected = run.settings.flap_velocity + run.settings.gravity * SIM_DT;
        assert!((run.actor.vel.y - expected).abs() < 1e-3);
        assert!(run.events.contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_flap_ignored_while_paused() {
        let (mut run, mut timers) = new_run(3);
        skip_countdown(&mut run, &mut timers);
        run.request_pause();
        let y = run.actor.pos.y;
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut run, &input, SIM_DT, &mut timers);
        assert_eq!(run.actor.pos.y, y);
        assert!(!run.events.contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_falling_out_of_bounds_ends_run() {
        let (mut run, mut timers) = new_run(4);
        skip_countdown(&mut run, &mut timers);
        let input = TickInput::default();
        for _ in 0..600 {
            tick(&mut run, &input, SIM_DT, &mut timers);
            if run.state == RunState::Ended {
                break;
            }
        }
        assert_eq!(run.state, RunState::Ended);
        assert!(run.events.contains(&GameEvent::Died(DeathCause::OutOfBounds)));
        assert!(run.events.contains(&GameEvent::RunEnded { score: 0 }));
        assert!(run.physics_paused);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_collision_freezes_world() {
        let (mut run, mut timers) = new_run(5);
        skip_countdown(&mut run, &mut timers);

        // Drop pair 0 right onto the actor with its upper segment at head height
        let body = run.actor.bounds();
        let gap_top = run.field.pairs()[0].gap_top;
        run.field.pairs_mut()[0].x = body.left();
        run.actor.pos.y = gap_top - 10.0;
        run.actor.vel.y = 0.0;

        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);

        assert_eq!(run.state, RunState::Dying(DeathCause::Collision));
        assert!(run.field.pairs().iter().all(|p| p.vel_x == 0.0));
        assert!(run.field.pickups().active().is_none_or(|p| p.vel_x == 0.0));
        assert_eq!(run.actor.vel.x, 0.0);
        assert!(!run.actor.alive);
        assert_eq!(run.actor.pose, Pose::Dead);
        assert!(run.physics_paused);
        assert_eq!(timers.len(), 3);
        assert!(run.events.contains(&GameEvent::Sound(SoundCue::Impact)));
    }

    #[test]
    fn test_second_collision_is_ignored() {
        let (mut run, mut timers) = new_run(6);
        skip_countdown(&mut run, &mut timers);
        let gap_top = run.field.pairs()[0].gap_top;
        run.field.pairs_mut()[0].x = run.actor.pos.x;
        run.actor.pos.y = gap_top - 10.0;
        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        fire_timer(&mut run, TimerEvent::ResumeAfterImpact, &mut timers);

        let impacts_before = run
            .events
            .iter()
            .filter(|e| **e == GameEvent::Died(DeathCause::Collision))
            .count();
        for _ in 0..10 {
            tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        }
        let impacts_after = run
            .events
            .iter()
            .filter(|e| **e == GameEvent::Died(DeathCause::Collision))
            .count();
        assert_eq!(impacts_before, 1);
        assert_eq!(impacts_after, 1);
        assert_eq!(timers.len(), 3);
    }

    #[test]
    fn test_dead_actor_lands_on_lower_segment_and_settles() {
        let (mut run, mut timers) = new_run(7);
        skip_countdown(&mut run, &mut timers);
        let gap_top = run.field.pairs()[0].gap_top;
        let lower_top = gap_top + run.field.pairs()[0].gap_height;
        run.field.pairs_mut()[0].x = run.actor.pos.x;
        run.actor.pos.y = gap_top - 10.0;
        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);

        fire_timer(&mut run, TimerEvent::ResumeAfterImpact, &mut timers);
        for _ in 0..240 {
            tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        }
        assert!((run.actor.bounds().bottom() - lower_top).abs() < 1.0);
        assert!(run.actor.vel.y.abs() < SETTLE_EPSILON);

        fire_timer(&mut run, TimerEvent::SettleCheck, &mut timers);
        assert_eq!(run.state, RunState::Ended);
    }

    #[test]
    fn test_dying_on_lower_segment_top_rests_on_it() {
        let (mut run, mut timers) = new_run(13);
        skip_countdown(&mut run, &mut timers);
        let lower_top = run.field.pairs()[0].gap_top + run.field.pairs()[0].gap_height;
        run.field.pairs_mut()[0].x = run.actor.pos.x;
        run.actor.pos.y = lower_top - run.actor.size.y - 1.0;
        run.actor.vel.y = 300.0;

        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        assert_eq!(run.state, RunState::Dying(DeathCause::Collision));
        assert!((run.actor.bounds().bottom() - lower_top).abs() < 1e-3);

        fire_timer(&mut run, TimerEvent::ResumeAfterImpact, &mut timers);
        for _ in 0..60 {
            tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        }
        assert!(
            (run.actor.bounds().bottom() - lower_top).abs() < 1.0,
            "bottom {} lower_top {}",
            run.actor.bounds().bottom(),
            lower_top
        );
        assert!(run.actor.vel.y.abs() < SETTLE_EPSILON);

        fire_timer(&mut run, TimerEvent::SettleCheck, &mut timers);
        assert_eq!(run.state, RunState::Ended);
    }

    #[test]
    fn test_settle_watch_ends_run_once_at_rest() {
        let (mut run, mut timers) = new_run(8);
        skip_countdown(&mut run, &mut timers);
        let gap_top = run.field.pairs()[0].gap_top;
        run.field.pairs_mut()[0].x = run.actor.pos.x;
        run.actor.pos.y = gap_top - 10.0;
        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        fire_timer(&mut run, TimerEvent::ResumeAfterImpact, &mut timers);

        // Still falling when checked: watch stays armed
        run.actor.vel.y = 50.0;
        fire_timer(&mut run, TimerEvent::SettleCheck, &mut timers);
        assert_eq!(run.state, RunState::Dying(DeathCause::Collision));
        assert!(run.settle_watch);

        for _ in 0..600 {
            tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
            if run.state == RunState::Ended {
                break;
            }
        }
        assert_eq!(run.state, RunState::Ended);
    }

    #[test]
    fn test_death_timeout_forces_end() {
        let (mut run, mut timers) = new_run(9);
        skip_countdown(&mut run, &mut timers);
        let gap_top = run.field.pairs()[0].gap_top;
        run.field.pairs_mut()[0].x = run.actor.pos.x;
        run.actor.pos.y = gap_top - 10.0;
        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);

        fire_timer(&mut run, TimerEvent::DeathTimeout, &mut timers);
        assert_eq!(run.state, RunState::Ended);
        // Late timers after the end are no-ops
        fire_timer(&mut run, TimerEvent::ResumeAfterImpact, &mut timers);
        assert!(run.physics_paused);
    }

    #[test]
    fn test_score_per_recycled_pair() {
        let (mut run, mut timers) = new_run(10);
        skip_countdown(&mut run, &mut timers);
        let first_right = run.field.pairs()[0].right();
        // Park the actor in mid air out of harm's way
        let input = TickInput::default();
        let steps = ((first_right / run.settings.scroll_speed) / SIM_DT).ceil() as usize + 1;
        for _ in 0..steps {
            run.actor.pos.y = run.field.pairs()[0].gap_center() - run.actor.size.y * 0.5;
            run.actor.vel.y = 0.0;
            tick(&mut run, &input, SIM_DT, &mut timers);
        }
        assert_eq!(run.state, RunState::Playing);
        assert_eq!(run.score, 1);
        assert!(run.events.contains(&GameEvent::ScoreChanged(1)));
        assert_eq!(run.field.pairs().len(), 4);
    }

    #[test]
    fn test_pickup_collection() {
        let (mut run, mut timers) = new_run(11);
        skip_countdown(&mut run, &mut timers);
        // Re-spawn the pickup right on the actor, clear of every obstacle
        let center = run.actor.bounds().center();
        run.field.pickups_mut().spawn(center.x, center.y, 0);

        tick(&mut run, &TickInput::default(), SIM_DT, &mut timers);
        assert!(run.events.contains(&GameEvent::PickupCollected));
        assert!(run.events.contains(&GameEvent::Sound(SoundCue::PickupChime)));
        assert!(run.field.pickups().active().is_none());
        assert_eq!(run.state, RunState::Playing);
    }

    #[test]
    fn test_determinism() {
        let (mut a, mut ta) = new_run(99999);
        let (mut b, mut tb) = new_run(99999);
        let inputs = [
            TickInput::default(),
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
        ];
        for i in 0..1200 {
            let input = &inputs[i % 2];
            tick(&mut a, input, SIM_DT, &mut ta);
            tick(&mut b, input, SIM_DT, &mut tb);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.state, b.state);
        assert!((a.actor.pos.y - b.actor.pos.y).abs() < 1e-4);
    }
}
