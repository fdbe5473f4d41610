//! One-shot delayed callbacks
//!
//! Timers have no cancellation. Each one carries the id of the run that
//! scheduled it so the host can drop it if that run is gone by the time
//! it fires.

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Unfreeze physics after an obstacle impact
    ResumeAfterImpact,
    /// Check whether the dead actor has come to rest
    SettleCheck,
    /// Force the end of a dying phase that never settled
    DeathTimeout,
    /// Hand the finished run to the game-over screen
    AnnounceGameOver,
    /// Remove an informational message from screen
    HideMessage(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    pub due_ms: f64,
    pub run_id: u64,
    pub event: TimerEvent,
}

/// Pending timers ordered by due time (ties fire in scheduling order)
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire `event` for `run_id` once `delay_ms` has elapsed
    pub fn schedule(&mut self, delay_ms: f64, run_id: u64, event: TimerEvent) {
        let due_ms = self.now_ms + delay_ms;
        let at = self.pending.partition_point(|t| t.due_ms <= due_ms);
        self.pending.insert(at, Scheduled { due_ms, run_id, event });
    }

    /// Advance the clock and return every timer that is now due, in order
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Scheduled> {
        self.now_ms += dt_ms;
        let due = self.pending.partition_point(|t| t.due_ms <= self.now_ms);
        self.pending.drain(..due).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = Scheduler::new();
        timers.schedule(1500.0, 1, TimerEvent::SettleCheck);
        timers.schedule(1000.0, 1, TimerEvent::ResumeAfterImpact);
        timers.schedule(1000.0, 1, TimerEvent::HideMessage(0));

        assert!(timers.advance(999.0).is_empty());
        let fired: Vec<_> = timers.advance(1.0).into_iter().map(|t| t.event).collect();
        assert_eq!(
            fired,
            vec![TimerEvent::ResumeAfterImpact, TimerEvent::HideMessage(0)]
        );
        assert_eq!(timers.len(), 1);

        let fired = timers.advance(500.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, TimerEvent::SettleCheck);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut timers = Scheduler::new();
        timers.advance(250.0);
        timers.schedule(500.0, 3, TimerEvent::AnnounceGameOver);
        assert!(timers.advance(499.0).is_empty());
        let fired = timers.advance(1.0);
        assert_eq!(fired[0].due_ms, 750.0);
        assert_eq!(fired[0].run_id, 3);
    }
}
